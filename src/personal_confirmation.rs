//! Parser for confirmations of the account holder's own payments.
//!
//! ```text
//! CKR4LDS51MY Confirmed.You successfully paid TZS.1,000.0 for a social of KIZPART SACCOS group on 27/11/2025 at 07:30
//! ```

use crate::error::ParseFailure;
use crate::extract::{amount_fragment, FailureContext, FieldExtractor, GROUP_NAME};
use crate::normalize::{normalize_amount, normalize_date, normalize_time, DateFormat, TimePrecision};
use crate::types::{ConfirmationAction, MessageShape, PersonalConfirmation, RawMessage};
use lazy_static::lazy_static;

lazy_static! {
    static ref PATTERN: FieldExtractor = FieldExtractor::new(
        "personal confirmation",
        &format!(
            concat!(
                r"(?s)^(?P<reference>[A-Za-z0-9]+)\s+Confirmed\.\s*You\s+successfully\s+",
                r"(?P<action>repaid|paid|purchased\s+shares\s+worth\s+of|purchased\s+shares|purchased)\s+{amount}",
                r"(?:\s+(?P<details>.*?))?",
                r"\s+(?:of|from|to)\s+{group}",
                r"\s+on\s+(?P<date>[0-9/-]+)\s+at\s+(?P<time>[0-9:]+)\.?\s*$",
            ),
            amount = amount_fragment("amount"),
            group = GROUP_NAME,
        ),
    )
    .expect("personal confirmation pattern");
}

/// Extract a [`PersonalConfirmation`] from a message classified as one.
pub fn parse(message: &RawMessage) -> Result<PersonalConfirmation, ParseFailure> {
    let ctx = FailureContext::new(message, MessageShape::PersonalConfirmation);
    let fields = ctx.extract(&PATTERN)?;

    let reference = fields.required("reference").map_err(|e| ctx.extraction(e))?.to_string();
    let action = fields
        .required("action")
        .and_then(|a| a.parse::<ConfirmationAction>())
        .map_err(|e| ctx.extraction(e))?;
    let details = fields.get("details").unwrap_or_default().trim().to_string();
    let group_name = fields.required("group").map_err(|e| ctx.extraction(e))?.to_string();

    let (whole, fraction) = fields.amount("amount").map_err(|e| ctx.extraction(e))?;
    let amount_minor = normalize_amount(whole, fraction).map_err(|e| ctx.normalization("amount", e))?;

    let date = normalize_date(
        fields.required("date").map_err(|e| ctx.extraction(e))?,
        DateFormat::DayMonthYear,
    )
    .map_err(|e| ctx.normalization("date", e))?;
    let time = normalize_time(
        fields.required("time").map_err(|e| ctx.extraction(e))?,
        TimePrecision::Minutes,
    )
    .map_err(|e| ctx.normalization("time", e))?;

    Ok(PersonalConfirmation {
        reference,
        action,
        amount_minor,
        details,
        group_name,
        date,
        time,
        source: message.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn parse_body(body: &str) -> Result<PersonalConfirmation, ParseFailure> {
        parse(&RawMessage::new(body, "M-KOBA", 0))
    }

    #[test]
    fn test_paid_social() {
        let tx = parse_body("CKR4LDS51MY Confirmed.You successfully paid TZS.1,000.0 for a social of KIZPART SACCOS group on 27/11/2025 at 07:30").unwrap();
        assert_eq!(tx.reference, "CKR4LDS51MY");
        assert_eq!(tx.action, ConfirmationAction::Paid);
        assert_eq!(tx.amount_minor, 100_000);
        assert_eq!(tx.details, "for a social");
        assert_eq!(tx.group_name, "KIZPART SACCOS group");
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2025, 11, 27).unwrap());
        assert_eq!(tx.time.format("%H:%M").to_string(), "07:30");
    }

    #[test]
    fn test_repaid_loan() {
        let tx = parse_body("CKS1AB23CD Confirmed.You successfully repaid TZS.50,000.00 for a development loan of KIZPART SACCOS group on 01/12/2025 at 16:45").unwrap();
        assert_eq!(tx.action, ConfirmationAction::Repaid);
        assert_eq!(tx.amount_minor, 5_000_000);
        assert_eq!(tx.details, "for a development loan");
    }

    #[test]
    fn test_share_purchase_without_details() {
        let tx = parse_body("CKT9ZZ00QQ Confirmed.You successfully purchased shares worth of TZS.20,000 of KIZPART SACCOS group on 02/12/2025 at 08:00").unwrap();
        assert_eq!(tx.action, ConfirmationAction::PurchasedShares);
        assert_eq!(tx.amount_minor, 2_000_000);
        assert_eq!(tx.details, "");
    }

    #[test]
    fn test_malformed_amount_is_normalization_failure() {
        let result = parse_body("CKR4LDS51MY Confirmed.You successfully paid TZS.1,00,0.00 for a social of KIZPART SACCOS group on 27/11/2025 at 07:30");
        assert!(matches!(result, Err(ParseFailure::Normalization { field: "amount", .. })));
    }

    #[test]
    fn test_missing_group_is_extraction_failure() {
        let result = parse_body("CKR4LDS51MY Confirmed.You successfully paid TZS.1,000.00 on 27/11/2025 at 07:30");
        match result {
            Err(ParseFailure::Extraction { shape, .. }) => {
                assert_eq!(shape, MessageShape::PersonalConfirmation)
            }
            other => panic!("expected extraction failure, got {:?}", other),
        }
    }

    #[test]
    fn test_year_first_date_is_rejected() {
        let result = parse_body("CKR4LDS51MY Confirmed.You successfully paid TZS.1,000.00 for a social of KIZPART SACCOS group on 2025-11-27 at 07:30");
        assert!(matches!(result, Err(ParseFailure::Normalization { field: "date", .. })));
    }

    #[test]
    fn test_trailing_text_is_extraction_failure() {
        let result = parse_body("CKR4LDS51MY Confirmed.You successfully paid TZS.1,000.00 for a social of KIZPART SACCOS group on 27/11/2025 at 07:30 extra trailing 99/99/9999");
        assert!(matches!(result, Err(ParseFailure::Extraction { .. })));

        let tx = parse_body("CKR4LDS51MY Confirmed.You successfully paid TZS.1,000.00 for a social of KIZPART SACCOS group on 27/11/2025 at 07:30.\n").unwrap();
        assert_eq!(tx.time.format("%H:%M").to_string(), "07:30");
    }
}
