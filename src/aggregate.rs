//! Batch aggregation over many messages.
//!
//! Each message is classified and parsed on its own; the only state shared
//! across a run is the [`AggregateStatistics`] accumulator. Accumulators merge
//! associatively, which is what lets [`process_parallel`] fold per-worker
//! partials with rayon and still match the sequential [`process`].

use crate::error::ParseFailure;
use crate::normalize::render_amount;
use crate::pipeline::{parse_message, Outcome};
use crate::types::{minor_to_decimal, MessageShape, RawMessage};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, warn};

/// Counters and sums for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateStatistics {
    /// Messages seen.
    pub processed: usize,

    /// Successfully parsed messages per shape.
    pub counts: BTreeMap<MessageShape, usize>,

    /// Messages that matched no shape detector.
    pub unrecognized: usize,

    /// Messages with a detected shape whose fields could not be extracted
    /// or normalized.
    pub extraction_failures: usize,

    /// Sum of parsed amounts, in minor units.
    pub total_amount_minor: u64,

    /// Sum of parsed amounts per shape.
    pub amount_by_shape: BTreeMap<MessageShape, u64>,

    /// Sum of parsed amounts per SACCOS group.
    pub amount_by_group: BTreeMap<String, u64>,

    /// Every failure, in input order.
    pub failures: Vec<ParseFailure>,
}

impl AggregateStatistics {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one message outcome into the accumulator.
    pub fn record(&mut self, outcome: &Outcome) {
        self.processed += 1;
        match outcome {
            Ok(tx) => {
                let amount = tx.amount_minor();
                *self.counts.entry(tx.shape()).or_insert(0) += 1;
                self.total_amount_minor = self.total_amount_minor.saturating_add(amount);
                add_amount(&mut self.amount_by_shape, tx.shape(), amount);
                add_amount(&mut self.amount_by_group, tx.group_name().to_string(), amount);
            }
            Err(failure) => {
                if failure.is_unrecognized() {
                    self.unrecognized += 1;
                } else {
                    self.extraction_failures += 1;
                }
                self.failures.push(failure.clone());
            }
        }
    }

    /// Combine two accumulators; `self`'s failures come first.
    pub fn merge(mut self, other: AggregateStatistics) -> Self {
        self.processed += other.processed;
        self.unrecognized += other.unrecognized;
        self.extraction_failures += other.extraction_failures;
        self.total_amount_minor = self.total_amount_minor.saturating_add(other.total_amount_minor);
        for (shape, count) in other.counts {
            *self.counts.entry(shape).or_insert(0) += count;
        }
        for (shape, amount) in other.amount_by_shape {
            add_amount(&mut self.amount_by_shape, shape, amount);
        }
        for (group, amount) in other.amount_by_group {
            add_amount(&mut self.amount_by_group, group, amount);
        }
        self.failures.extend(other.failures);
        self
    }

    /// Parsed count for `shape`; for `Unrecognized`, the classification failures.
    pub fn count(&self, shape: MessageShape) -> usize {
        match shape {
            MessageShape::Unrecognized => self.unrecognized,
            _ => self.counts.get(&shape).copied().unwrap_or(0),
        }
    }

    /// Messages that produced a record.
    pub fn parsed(&self) -> usize {
        self.counts.values().sum()
    }

    /// Messages that produced a failure of any kind.
    pub fn failed(&self) -> usize {
        self.unrecognized + self.extraction_failures
    }

    /// Total parsed amount as a two-decimal value.
    pub fn total_amount(&self) -> Decimal {
        minor_to_decimal(self.total_amount_minor)
    }
}

fn add_amount<K: Ord>(sums: &mut BTreeMap<K, u64>, key: K, amount: u64) {
    let sum = sums.entry(key).or_insert(0);
    *sum = sum.saturating_add(amount);
}

impl fmt::Display for AggregateStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processed messages: {}", self.processed)?;
        for shape in MessageShape::PARSED {
            let amount = self.amount_by_shape.get(&shape).copied().unwrap_or(0);
            writeln!(
                f,
                "  {:<22} {:>6}  TZS.{}",
                shape.as_str(),
                self.count(shape),
                render_amount(amount)
            )?;
        }
        writeln!(f, "  {:<22} {:>6}", "unrecognized", self.unrecognized)?;
        writeln!(f, "  {:<22} {:>6}", "extraction_failed", self.extraction_failures)?;
        if !self.amount_by_group.is_empty() {
            writeln!(f, "By group:")?;
            for (group, amount) in &self.amount_by_group {
                writeln!(f, "  {:<30} TZS.{}", group, render_amount(*amount))?;
            }
        }
        write!(f, "Total amount: TZS.{}", render_amount(self.total_amount_minor))
    }
}

/// Statistics together with the per-message outcomes, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub statistics: AggregateStatistics,
    pub outcomes: Vec<Outcome>,
}

/// Run the pipeline over `messages` and return the statistics.
pub fn process(messages: &[RawMessage]) -> AggregateStatistics {
    process_with_records(messages).statistics
}

/// Run the pipeline over `messages`, keeping every outcome.
pub fn process_with_records(messages: &[RawMessage]) -> BatchReport {
    let mut statistics = AggregateStatistics::new();
    let mut outcomes = Vec::with_capacity(messages.len());

    for message in messages {
        let outcome = parse_message(message);
        if let Err(ref failure) = outcome {
            warn!(shape = %failure.shape(), reason = %failure.reason(), "message not parsed");
        }
        statistics.record(&outcome);
        outcomes.push(outcome);
    }

    log_summary(&statistics);
    BatchReport { statistics, outcomes }
}

/// Run the pipeline over `messages` on the rayon thread pool.
///
/// Each worker folds into its own accumulator and the partials are merged,
/// so the result is identical to [`process`].
pub fn process_parallel(messages: &[RawMessage]) -> AggregateStatistics {
    let statistics = messages
        .par_iter()
        .fold(AggregateStatistics::new, |mut acc, message| {
            let outcome = parse_message(message);
            if let Err(ref failure) = outcome {
                warn!(shape = %failure.shape(), reason = %failure.reason(), "message not parsed");
            }
            acc.record(&outcome);
            acc
        })
        .reduce(AggregateStatistics::new, AggregateStatistics::merge);

    log_summary(&statistics);
    statistics
}

fn log_summary(statistics: &AggregateStatistics) {
    info!(
        processed = statistics.processed,
        parsed = statistics.parsed(),
        unrecognized = statistics.unrecognized,
        extraction_failures = statistics.extraction_failures,
        total = %statistics.total_amount(),
        "batch complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn batch() -> Vec<RawMessage> {
        vec![
            RawMessage::new("255755959291(OBED SANGA) has purchased shares worth of TZS.20,000.00 from KIZPART SACCOS group on 27/11/2025 at 10:27", "M-KOBA", 1),
            RawMessage::new("CKR4LDS51MY Confirmed.You successfully paid TZS.1,000.0 for a social of KIZPART SACCOS group on 27/11/2025 at 07:30", "M-KOBA", 2),
            RawMessage::new("Karibu! Your bundle has been activated.", "VODACOM", 3),
            RawMessage::new("CKO9LC170LH Confirmed.A development loan of TZS.350,000.00 has been transfered from UPENDO SACCOS group to 255755959291(OBED SANGA) on 2025-11-27 at 14:05:31. New account balance is TZS.1,250,000.00", "M-KOBA", 4),
            RawMessage::new("255755959291(OBED SANGA) has paid TZS.1,000.00 for a social of KIZPART SACCOS group on 32/11/2025 at 10:27", "M-KOBA", 5),
            RawMessage::new("", "M-KOBA", 6),
        ]
    }

    #[test]
    fn test_counts_and_sums() {
        let stats = process(&batch());
        assert_eq!(stats.processed, 6);
        assert_eq!(stats.count(MessageShape::MemberTransaction), 1);
        assert_eq!(stats.count(MessageShape::PersonalConfirmation), 1);
        assert_eq!(stats.count(MessageShape::LoanDisbursement), 1);
        assert_eq!(stats.count(MessageShape::Unrecognized), 2);
        assert_eq!(stats.extraction_failures, 1);
        assert_eq!(stats.parsed() + stats.failed(), stats.processed);
        assert_eq!(stats.total_amount_minor, 2_000_000 + 100_000 + 35_000_000);
        assert_eq!(stats.amount_by_group.get("KIZPART SACCOS group"), Some(&2_100_000));
        assert_eq!(stats.amount_by_group.get("UPENDO SACCOS group"), Some(&35_000_000));
        assert_eq!(stats.total_amount().to_string(), "371000.00");
    }

    #[test]
    fn test_failures_keep_order_and_body() {
        let stats = process(&batch());
        let timestamps: Vec<i64> = stats
            .failures
            .iter()
            .map(|f| f.message().timestamp_millis)
            .collect();
        assert_eq!(timestamps, vec![3, 5, 6]);
        assert_eq!(stats.failures[1].shape(), MessageShape::MemberTransaction);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let messages: Vec<RawMessage> = batch().into_iter().cycle().take(300).collect();
        assert_eq!(process_parallel(&messages), process(&messages));
    }

    #[test]
    fn test_merge_is_associative() {
        let messages = batch();
        let part = |range: std::ops::Range<usize>| process(&messages[range]);
        let left = part(0..2).merge(part(2..4)).merge(part(4..6));
        let right = part(0..2).merge(part(2..4).merge(part(4..6)));
        assert_eq!(left, right);
        assert_eq!(left, process(&messages));
    }

    #[test]
    fn test_records_are_returned_in_order() {
        let report = process_with_records(&batch());
        assert_eq!(report.outcomes.len(), 6);
        assert!(report.outcomes[0].is_ok());
        assert!(report.outcomes[2].is_err());
        assert_eq!(report.statistics, process(&batch()));
    }

    #[test]
    fn test_empty_batch() {
        let stats = process(&[]);
        assert_eq!(stats, AggregateStatistics::new());
        assert!(stats.to_string().ends_with("Total amount: TZS.0.00"));
    }
}
