//! M-Koba SMS Library
//!
//! A library for classifying SACCOS transaction SMS messages and extracting
//! typed records from them.
//!
//! # Supported Message Shapes
//!
//! - **Member transaction**: `<phone>(<name>) has paid|purchased shares ...`
//! - **Loan disbursement**: `<ref> Confirmed.A <type> loan of ... has been transfered ...`
//! - **Personal confirmation**: `<ref> Confirmed.You successfully paid|repaid|purchased ...`
//!
//! # Features
//!
//! - Classify bodies by shape, with loan disbursements detected before
//!   the generic confirmation
//! - Extract all fields of a shape or report why not
//! - Amounts in integer minor units, dates checked against the calendar
//! - Batch statistics, sequential or on the rayon thread pool
//! - Read SMS backup XML, export outcomes as CSV
//!
//! # Examples
//!
//! ## Parsing one message
//!
//! ```
//! use mkoba_sms::{classify, parse_message, MessageShape, ParsedTransaction, RawMessage};
//!
//! let body = "255755959291(OBED SANGA) has purchased shares worth of TZS.20,000.00 from KIZPART SACCOS group on 27/11/2025 at 10:27";
//! assert_eq!(classify(body), MessageShape::MemberTransaction);
//!
//! let message = RawMessage::new(body, "M-KOBA", 1_764_228_420_000);
//! match parse_message(&message)? {
//!     ParsedTransaction::MemberTransaction(tx) => {
//!         assert_eq!(tx.member_name, "OBED SANGA");
//!         assert_eq!(tx.amount_minor, 2_000_000);
//!     }
//!     other => panic!("unexpected {:?}", other),
//! }
//! # Ok::<(), mkoba_sms::ParseFailure>(())
//! ```
//!
//! ## Summarizing a backup
//!
//! ```no_run
//! use std::fs::File;
//! use mkoba_sms::{aggregate, sms_backup::SmsBackup};
//!
//! let mut file = File::open("sms-backup.xml")?;
//! let backup = SmsBackup::from_read(&mut file)?.filter_sender("M-KOBA");
//! let statistics = aggregate::process(&backup.messages);
//! println!("{}", statistics);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod types;
pub mod normalize;
pub mod extract;
pub mod classifier;
pub mod member_transaction;
pub mod loan_disbursement;
pub mod personal_confirmation;
pub mod pipeline;
pub mod aggregate;
pub mod sms_backup;
pub mod csv_export;

use std::path::Path;
use std::str::FromStr;

// Re-export commonly used types
pub use aggregate::{AggregateStatistics, BatchReport};
pub use classifier::classify;
pub use error::{Error, ParseFailure, Result};
pub use pipeline::{parse_message, Outcome};
pub use types::{
    ConfirmationAction, LoanDisbursement, MemberAction, MemberTransaction, MessageShape,
    ParsedTransaction, PersonalConfirmation, RawMessage,
};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// SMS backup XML (`<smses><sms body=".." address=".." date=".."/></smses>`)
    SmsBackupXml,
    /// One message body per line
    PlainText,
}

impl FromStr for InputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "xml" | "sms-backup" | "smsbackup" => Ok(InputFormat::SmsBackupXml),
            "text" | "txt" | "lines" => Ok(InputFormat::PlainText),
            _ => Err(Error::InvalidFormat(s.to_string())),
        }
    }
}

impl InputFormat {
    /// Guess the format from a file's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| Error::InvalidFormat(path.display().to_string()))?
            .parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("xml".parse::<InputFormat>().unwrap(), InputFormat::SmsBackupXml);
        assert_eq!("SMS-Backup".parse::<InputFormat>().unwrap(), InputFormat::SmsBackupXml);
        assert_eq!("txt".parse::<InputFormat>().unwrap(), InputFormat::PlainText);
        assert_eq!("lines".parse::<InputFormat>().unwrap(), InputFormat::PlainText);
        assert!("csv".parse::<InputFormat>().is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            InputFormat::from_path(Path::new("backup/sms-20251127.XML")).unwrap(),
            InputFormat::SmsBackupXml
        );
        assert_eq!(
            InputFormat::from_path(Path::new("samples.txt")).unwrap(),
            InputFormat::PlainText
        );
        assert!(InputFormat::from_path(Path::new("README")).is_err());
        assert!(InputFormat::from_path(Path::new("export.csv")).is_err());
    }
}
