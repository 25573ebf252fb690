//! Parser for group member notifications.
//!
//! ```text
//! 255755959291(OBED SANGA) has purchased shares worth of TZS.20,000.00 from KIZPART SACCOS group on 27/11/2025 at 10:27
//! 255712345678(ASHA JUMA) has paid TZS.5,000.00 for a social of KIZPART SACCOS group on 27/11/2025 at 09:00
//! ```

use crate::error::ParseFailure;
use crate::extract::{amount_fragment, FailureContext, FieldExtractor, GROUP_NAME};
use crate::normalize::{normalize_amount, normalize_date, normalize_time, DateFormat, TimePrecision};
use crate::types::{MemberAction, MemberTransaction, MessageShape, RawMessage};
use lazy_static::lazy_static;

lazy_static! {
    static ref PATTERN: FieldExtractor = FieldExtractor::new(
        "member transaction",
        &format!(
            concat!(
                r"(?s)^(?P<phone>[0-9]+)\((?P<name>[^)]*)\)\s+has\s+",
                r"(?P<action>paid|purchased\s+shares\s+worth\s+of|purchased\s+shares|purchased)\s+{amount}",
                r"(?:\s+for\s+(?:[Aa]n?\s+)?(?P<kind>.+?))?",
                r"\s+(?:of|from|to)\s+{group}",
                r"\s+on\s+(?P<date>[0-9/-]+)\s+at\s+(?P<time>[0-9:]+)\.?\s*$",
            ),
            amount = amount_fragment("amount"),
            group = GROUP_NAME,
        ),
    )
    .expect("member transaction pattern");
}

/// Extract a [`MemberTransaction`] from a message classified as one.
pub fn parse(message: &RawMessage) -> Result<MemberTransaction, ParseFailure> {
    let ctx = FailureContext::new(message, MessageShape::MemberTransaction);
    let fields = ctx.extract(&PATTERN)?;

    let phone = ctx.phone(fields.required("phone").map_err(|e| ctx.extraction(e))?)?;
    let member_name = fields
        .required("name")
        .map_err(|_| ctx.extraction("empty member name"))?
        .to_string();
    let action = fields
        .required("action")
        .and_then(|a| a.parse::<MemberAction>())
        .map_err(|e| ctx.extraction(e))?;
    let group_name = fields.required("group").map_err(|e| ctx.extraction(e))?.to_string();
    let transaction_type = fields
        .get("kind")
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string);

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

    Ok(MemberTransaction {
        phone,
        member_name,
        action,
        amount_minor,
        transaction_type,
        group_name,
        date,
        time,
        source: message.clone(),
    })
}
