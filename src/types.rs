//! Common types shared by the classifier, the parsers and the aggregator.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An SMS as ingested from a backup file or another source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawMessage {
    /// Message text.
    pub body: String,

    /// Sender address (short code or phone number).
    pub source_address: String,

    /// Receive time in milliseconds since the Unix epoch.
    pub timestamp_millis: i64,
}

impl RawMessage {
    /// Create a new raw message.
    pub fn new(body: impl Into<String>, source_address: impl Into<String>, timestamp_millis: i64) -> Self {
        Self {
            body: body.into(),
            source_address: source_address.into(),
            timestamp_millis,
        }
    }
}

/// Structural category of a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MessageShape {
    /// `<phone>(<name>) has paid|purchased ...` group notification.
    MemberTransaction,
    /// `<ref> Confirmed.A ... loan of ... has been transfered ...`.
    LoanDisbursement,
    /// `<ref> Confirmed.You successfully ...`.
    PersonalConfirmation,
    /// Matches none of the above.
    Unrecognized,
}

impl MessageShape {
    /// All shapes a parser exists for, in detector priority order.
    pub const PARSED: [MessageShape; 3] = [
        MessageShape::MemberTransaction,
        MessageShape::LoanDisbursement,
        MessageShape::PersonalConfirmation,
    ];

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageShape::MemberTransaction => "member_transaction",
            MessageShape::LoanDisbursement => "loan_disbursement",
            MessageShape::PersonalConfirmation => "personal_confirmation",
            MessageShape::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for MessageShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a member did in a group notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberAction {
    Paid,
    PurchasedShares,
}

impl FromStr for MemberAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_words(s).as_str() {
            "paid" => Ok(MemberAction::Paid),
            "purchased" | "purchased shares" | "purchased shares worth of" => {
                Ok(MemberAction::PurchasedShares)
            }
            _ => Err(format!("Invalid member action: {}", s)),
        }
    }
}

impl MemberAction {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberAction::Paid => "paid",
            MemberAction::PurchasedShares => "purchased_shares",
        }
    }
}

/// What the account holder did in a personal confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfirmationAction {
    Paid,
    Repaid,
    PurchasedShares,
}

impl FromStr for ConfirmationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_words(s).as_str() {
            "paid" => Ok(ConfirmationAction::Paid),
            "repaid" => Ok(ConfirmationAction::Repaid),
            "purchased" | "purchased shares" | "purchased shares worth of" => {
                Ok(ConfirmationAction::PurchasedShares)
            }
            _ => Err(format!("Invalid confirmation action: {}", s)),
        }
    }
}

impl ConfirmationAction {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfirmationAction::Paid => "paid",
            ConfirmationAction::Repaid => "repaid",
            ConfirmationAction::PurchasedShares => "purchased_shares",
        }
    }
}

fn normalize_words(s: &str) -> String {
    s.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A payment or share purchase made by a group member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberTransaction {
    pub phone: String,
    pub member_name: String,
    pub action: MemberAction,
    /// Amount in TZS cents.
    pub amount_minor: u64,
    /// Purpose label such as `social`, when the message names one.
    pub transaction_type: Option<String>,
    pub group_name: String,
    pub date: NaiveDate,
    /// Minute precision.
    pub time: NaiveTime,
    pub source: RawMessage,
}

/// A loan transferred from a group to a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanDisbursement {
    pub reference: String,
    /// e.g. `development`; empty when the message says just `A loan of`.
    pub loan_type: String,
    pub amount_minor: u64,
    pub group_name: String,
    pub recipient_phone: String,
    pub recipient_name: String,
    pub date: NaiveDate,
    /// Second precision.
    pub time: NaiveTime,
    pub account_balance_minor: u64,
    pub source: RawMessage,
}

/// Confirmation of the account holder's own payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonalConfirmation {
    pub reference: String,
    pub action: ConfirmationAction,
    pub amount_minor: u64,
    /// Free text between the amount and the group, e.g. `for a social`.
    pub details: String,
    pub group_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub source: RawMessage,
}

/// A fully extracted message, one variant per parsed shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParsedTransaction {
    MemberTransaction(MemberTransaction),
    LoanDisbursement(LoanDisbursement),
    PersonalConfirmation(PersonalConfirmation),
}

impl ParsedTransaction {
    /// Shape this record was parsed as.
    pub fn shape(&self) -> MessageShape {
        match self {
            ParsedTransaction::MemberTransaction(_) => MessageShape::MemberTransaction,
            ParsedTransaction::LoanDisbursement(_) => MessageShape::LoanDisbursement,
            ParsedTransaction::PersonalConfirmation(_) => MessageShape::PersonalConfirmation,
        }
    }

    /// Transaction amount in minor units.
    pub fn amount_minor(&self) -> u64 {
        match self {
            ParsedTransaction::MemberTransaction(t) => t.amount_minor,
            ParsedTransaction::LoanDisbursement(t) => t.amount_minor,
            ParsedTransaction::PersonalConfirmation(t) => t.amount_minor,
        }
    }

    /// Transaction amount as a decimal with two fractional digits.
    pub fn amount(&self) -> Decimal {
        minor_to_decimal(self.amount_minor())
    }

    /// SACCOS group the transaction belongs to.
    pub fn group_name(&self) -> &str {
        match self {
            ParsedTransaction::MemberTransaction(t) => &t.group_name,
            ParsedTransaction::LoanDisbursement(t) => &t.group_name,
            ParsedTransaction::PersonalConfirmation(t) => &t.group_name,
        }
    }

    /// Calendar date stated in the message.
    pub fn date(&self) -> NaiveDate {
        match self {
            ParsedTransaction::MemberTransaction(t) => t.date,
            ParsedTransaction::LoanDisbursement(t) => t.date,
            ParsedTransaction::PersonalConfirmation(t) => t.date,
        }
    }

    /// Time of day stated in the message.
    pub fn time(&self) -> NaiveTime {
        match self {
            ParsedTransaction::MemberTransaction(t) => t.time,
            ParsedTransaction::LoanDisbursement(t) => t.time,
            ParsedTransaction::PersonalConfirmation(t) => t.time,
        }
    }

    /// Message the record was derived from.
    pub fn source(&self) -> &RawMessage {
        match self {
            ParsedTransaction::MemberTransaction(t) => &t.source,
            ParsedTransaction::LoanDisbursement(t) => &t.source,
            ParsedTransaction::PersonalConfirmation(t) => &t.source,
        }
    }
}

/// Convert minor units to a two-decimal amount.
pub fn minor_to_decimal(minor: u64) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(minor), 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_action_from_str() {
        assert_eq!("paid".parse::<MemberAction>().unwrap(), MemberAction::Paid);
        assert_eq!(
            "purchased  shares worth of".parse::<MemberAction>().unwrap(),
            MemberAction::PurchasedShares
        );
        assert!("repaid".parse::<MemberAction>().is_err());
    }

    #[test]
    fn test_confirmation_action_from_str() {
        assert_eq!("Repaid".parse::<ConfirmationAction>().unwrap(), ConfirmationAction::Repaid);
        assert_eq!(
            "purchased shares".parse::<ConfirmationAction>().unwrap(),
            ConfirmationAction::PurchasedShares
        );
        assert!("withdrew".parse::<ConfirmationAction>().is_err());
    }

    #[test]
    fn test_minor_to_decimal() {
        assert_eq!(minor_to_decimal(2_000_000).to_string(), "20000.00");
        assert_eq!(minor_to_decimal(5).to_string(), "0.05");
    }

    #[test]
    fn test_shape_display() {
        assert_eq!(MessageShape::LoanDisbursement.to_string(), "loan_disbursement");
    }
}
