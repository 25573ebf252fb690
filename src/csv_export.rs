//! CSV export of per-message outcomes.
//!
//! One row per processed message. Failed messages keep their raw body and
//! failure reason so they can be triaged by hand.

use crate::error::Result;
use crate::pipeline::Outcome;
use crate::types::{minor_to_decimal, ParsedTransaction, RawMessage};
use csv::Writer;
use serde::Serialize;
use std::io::Write;

/// Outcomes ready to be written as CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    /// Outcomes in input order.
    pub outcomes: Vec<Outcome>,
}

/// CSV row structure.
#[derive(Debug, Default, Serialize)]
struct CsvRecord {
    status: &'static str,
    shape: &'static str,
    reference: String,
    phone: String,
    name: String,
    action: String,
    amount: String,
    balance: String,
    group: String,
    date: String,
    time: String,
    details: String,
    reason: String,
    source_address: String,
    source_timestamp: i64,
    body: String,
}

impl CsvExport {
    /// Wrap outcomes for export.
    pub fn new(outcomes: Vec<Outcome>) -> Self {
        Self { outcomes }
    }

    /// Write the outcomes to any destination implementing `Write`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mkoba_sms::{csv_export::CsvExport, parse_message, RawMessage};
    ///
    /// let message = RawMessage::new("not a SACCOS message", "M-KOBA", 0);
    /// let export = CsvExport::new(vec![parse_message(&message)]);
    /// let mut out = Vec::new();
    /// export.write_to(&mut out)?;
    /// assert!(String::from_utf8(out).unwrap().contains("unrecognized"));
    /// # Ok::<(), mkoba_sms::Error>(())
    /// ```
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut csv_writer = Writer::from_writer(writer);

        for outcome in &self.outcomes {
            let record = match outcome {
                Ok(tx) => Self::parsed_record(tx),
                Err(failure) => {
                    let mut record = Self::source_record(failure.message());
                    record.status = failure.status();
                    record.shape = failure.shape().as_str();
                    record.reason = failure.reason();
                    record
                }
            };
            csv_writer.serialize(record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    fn source_record(source: &RawMessage) -> CsvRecord {
        CsvRecord {
            source_address: source.source_address.clone(),
            source_timestamp: source.timestamp_millis,
            body: source.body.clone(),
            ..CsvRecord::default()
        }
    }

    fn parsed_record(tx: &ParsedTransaction) -> CsvRecord {
        let mut record = Self::source_record(tx.source());
        record.status = "parsed";
        record.shape = tx.shape().as_str();
        record.amount = tx.amount().to_string();
        record.group = tx.group_name().to_string();
        record.date = tx.date().format("%Y-%m-%d").to_string();
        record.time = tx.time().format("%H:%M:%S").to_string();

        match tx {
            ParsedTransaction::MemberTransaction(t) => {
                record.phone = t.phone.clone();
                record.name = t.member_name.clone();
                record.action = t.action.as_str().to_string();
                record.details = t.transaction_type.clone().unwrap_or_default();
            }
            ParsedTransaction::LoanDisbursement(t) => {
                record.reference = t.reference.clone();
                record.phone = t.recipient_phone.clone();
                record.name = t.recipient_name.clone();
                record.action = "disbursed".to_string();
                record.balance = minor_to_decimal(t.account_balance_minor).to_string();
                record.details = t.loan_type.clone();
            }
            ParsedTransaction::PersonalConfirmation(t) => {
                record.reference = t.reference.clone();
                record.action = t.action.as_str().to_string();
                record.details = t.details.clone();
            }
        }

        record
    }
}
