//! Message shape detection.
//!
//! Detectors only look at the leading structure of a body; field extraction
//! happens afterwards in the shape's parser. Loan disbursements and personal
//! confirmations both start with `<ref> Confirmed.`, so the loan detector runs
//! first.

use crate::types::MessageShape;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DETECTORS: [(MessageShape, Regex); 3] = [
        (
            MessageShape::MemberTransaction,
            Regex::new(r"^[0-9]+\([^)]+\)\s+has\s+(?:paid|purchased)\b")
                .expect("member transaction detector"),
        ),
        (
            MessageShape::LoanDisbursement,
            Regex::new(r"(?s)^[A-Za-z0-9]+\s+Confirmed\..*?\bloan\s+of\s+.*?has\s+been\s+transferr?ed\b")
                .expect("loan disbursement detector"),
        ),
        (
            MessageShape::PersonalConfirmation,
            Regex::new(r"^[A-Za-z0-9]+\s+Confirmed\.\s*You\s+successfully\b")
                .expect("personal confirmation detector"),
        ),
    ];
}

/// Determine which shape `body` has.
///
/// Empty or whitespace-only bodies are [`MessageShape::Unrecognized`].
///
/// # Examples
///
/// ```
/// use mkoba_sms::{classify, MessageShape};
///
/// let body = "CKO9LC170LH Confirmed.A development loan of TZS.350,000.00 has been transfered";
/// assert_eq!(classify(body), MessageShape::LoanDisbursement);
/// assert_eq!(classify(""), MessageShape::Unrecognized);
/// ```
pub fn classify(body: &str) -> MessageShape {
    let body = body.trim();
    if body.is_empty() {
        return MessageShape::Unrecognized;
    }

    DETECTORS
        .iter()
        .find(|(_, detector)| detector.is_match(body))
        .map(|(shape, _)| *shape)
        .unwrap_or(MessageShape::Unrecognized)
}
