//! Classify-then-extract pipeline for a single message.

use crate::classifier::classify;
use crate::error::ParseFailure;
use crate::types::{MessageShape, ParsedTransaction, RawMessage};
use crate::{loan_disbursement, member_transaction, personal_confirmation};
use tracing::debug;

/// Result of processing one message.
pub type Outcome = Result<ParsedTransaction, ParseFailure>;

/// Classify `message` and run the matching parser.
///
/// # Examples
///
/// ```
/// use mkoba_sms::{parse_message, MessageShape, RawMessage};
///
/// let message = RawMessage::new(
///     "CKR4LDS51MY Confirmed.You successfully paid TZS.1,000.0 for a social of KIZPART SACCOS group on 27/11/2025 at 07:30",
///     "M-KOBA",
///     0,
/// );
/// let tx = parse_message(&message)?;
/// assert_eq!(tx.shape(), MessageShape::PersonalConfirmation);
/// assert_eq!(tx.amount_minor(), 100_000);
/// # Ok::<(), mkoba_sms::ParseFailure>(())
/// ```
pub fn parse_message(message: &RawMessage) -> Outcome {
    let shape = classify(&message.body);
    debug!(%shape, address = %message.source_address, "classified message");
    parse_as(shape, message)
}

/// Run the parser for an already known `shape`.
pub fn parse_as(shape: MessageShape, message: &RawMessage) -> Outcome {
    match shape {
        MessageShape::MemberTransaction => {
            member_transaction::parse(message).map(ParsedTransaction::MemberTransaction)
        }
        MessageShape::LoanDisbursement => {
            loan_disbursement::parse(message).map(ParsedTransaction::LoanDisbursement)
        }
        MessageShape::PersonalConfirmation => {
            personal_confirmation::parse(message).map(ParsedTransaction::PersonalConfirmation)
        }
        MessageShape::Unrecognized => Err(ParseFailure::Unrecognized {
            message: message.clone(),
        }),
    }
}
