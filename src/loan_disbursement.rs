//! Parser for loan disbursement confirmations.
//!
//! ```text
//! CKO9LC170LH Confirmed.A development loan of TZS.350,000.00 has been transfered from KIZPART SACCOS group
//! to 255755959291(OBED SANGA) on 2025-11-27 at 14:05:31. New account balance is TZS.1,250,000.00
//! ```
//!
//! Unlike the other shapes, dates here are `YYYY-MM-DD` and times carry seconds.

use crate::error::ParseFailure;
use crate::extract::{amount_fragment, FailureContext, FieldExtractor, GROUP_NAME};
use crate::normalize::{normalize_amount, normalize_date, normalize_time, DateFormat, TimePrecision};
use crate::types::{LoanDisbursement, MessageShape, RawMessage};
use lazy_static::lazy_static;

lazy_static! {
    static ref PATTERN: FieldExtractor = FieldExtractor::new(
        "loan disbursement",
        &format!(
            concat!(
                r"(?s)^(?P<reference>[A-Za-z0-9]+)\s+Confirmed\.\s*",
                r"(?:[Aa]n?\s+)?(?P<loan_type>.*?)\s*\bloan\s+of\s+{amount}",
                r"\s+has\s+been\s+transferr?ed\s+from\s+{group}",
                r"\s+to\s+(?P<phone>[0-9]+)\s*\((?P<name>[^)]*)\)",
                r"\s+on\s+(?P<date>[0-9/-]+)\s+at\s+(?P<time>[0-9:]+)\.?",
                r"\s*New\s+account\s+balance\s+is\s+{balance}\.?\s*$",
            ),
            amount = amount_fragment("amount"),
            group = GROUP_NAME,
            balance = amount_fragment("balance"),
        ),
    )
    .expect("loan disbursement pattern");
}

/// Extract a [`LoanDisbursement`] from a message classified as one.
pub fn parse(message: &RawMessage) -> Result<LoanDisbursement, ParseFailure> {
    let ctx = FailureContext::new(message, MessageShape::LoanDisbursement);
    let fields = ctx.extract(&PATTERN)?;

    let reference = fields.required("reference").map_err(|e| ctx.extraction(e))?.to_string();
    let loan_type = fields.get("loan_type").unwrap_or_default().trim().to_string();
    let group_name = fields.required("group").map_err(|e| ctx.extraction(e))?.to_string();
    let recipient_phone = ctx.phone(fields.required("phone").map_err(|e| ctx.extraction(e))?)?;
    let recipient_name = fields
        .required("name")
        .map_err(|_| ctx.extraction("empty recipient name"))?
        .to_string();

    let (whole, fraction) = fields.amount("amount").map_err(|e| ctx.extraction(e))?;
    let amount_minor = normalize_amount(whole, fraction).map_err(|e| ctx.normalization("amount", e))?;
    let (whole, fraction) = fields.amount("balance").map_err(|e| ctx.extraction(e))?;
    let account_balance_minor =
        normalize_amount(whole, fraction).map_err(|e| ctx.normalization("balance", e))?;

    let date = normalize_date(
        fields.required("date").map_err(|e| ctx.extraction(e))?,
        DateFormat::YearMonthDay,
    )
    .map_err(|e| ctx.normalization("date", e))?;
    let time = normalize_time(
        fields.required("time").map_err(|e| ctx.extraction(e))?,
        TimePrecision::Seconds,
    )
    .map_err(|e| ctx.normalization("time", e))?;

    Ok(LoanDisbursement {
        reference,
        loan_type,
        amount_minor,
        group_name,
        recipient_phone,
        recipient_name,
        date,
        time,
        account_balance_minor,
        source: message.clone(),
    })
}
