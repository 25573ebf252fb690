//! SMS backup readers.
//!
//! Reads the XML written by SMS backup apps, where each message is an
//! `<sms>` element carrying `address`, `date` (epoch milliseconds) and `body`
//! attributes, plus a plain-text form with one message per line.

use crate::error::{Error, Result};
use crate::types::RawMessage;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{BufRead, BufReader, Read};
use tracing::debug;

/// Messages loaded from a backup, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SmsBackup {
    /// The loaded messages.
    pub messages: Vec<RawMessage>,
}

impl SmsBackup {
    /// Parse an SMS backup XML document from any source implementing `Read`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mkoba_sms::sms_backup::SmsBackup;
    ///
    /// let xml = r#"<smses count="1">
    ///   <sms address="M-KOBA" date="1764228420000" type="1" body="Hello &amp; welcome" />
    /// </smses>"#;
    /// let backup = SmsBackup::from_read(&mut xml.as_bytes())?;
    /// assert_eq!(backup.messages[0].body, "Hello & welcome");
    /// # Ok::<(), mkoba_sms::Error>(())
    /// ```
    pub fn from_read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut xml = Reader::from_reader(BufReader::new(reader));
        let mut buf = Vec::new();
        let mut messages = Vec::new();

        loop {
            match xml.read_event_into(&mut buf)? {
                Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == b"sms" => {
                    messages.push(Self::parse_sms(e)?);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        debug!(count = messages.len(), "loaded SMS backup");
        Ok(SmsBackup { messages })
    }

    /// Read one message per non-blank line, all attributed to `address`.
    pub fn from_text<R: Read>(reader: &mut R, address: &str) -> Result<Self> {
        let mut messages = Vec::new();
        for line in BufReader::new(reader).lines() {
            let line = line?;
            let body = line.trim();
            if body.is_empty() {
                continue;
            }
            messages.push(RawMessage::new(body, address, 0));
        }

        debug!(count = messages.len(), "loaded text messages");
        Ok(SmsBackup { messages })
    }

    /// Keep only messages whose source address equals `sender`, ignoring case.
    pub fn filter_sender(mut self, sender: &str) -> Self {
        self.messages
            .retain(|m| m.source_address.trim().eq_ignore_ascii_case(sender.trim()));
        self
    }

    fn parse_sms(element: &BytesStart<'_>) -> Result<RawMessage> {
        let mut body = None;
        let mut address = None;
        let mut date = None;

        for attr in element.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"body" => body = Some(attr.unescape_value()?.into_owned()),
                b"address" => address = Some(attr.unescape_value()?.into_owned()),
                b"date" => date = Some(attr.unescape_value()?.into_owned()),
                _ => {}
            }
        }

        let body = body.ok_or_else(|| Error::MissingField("sms body".to_string()))?;
        let address = address.ok_or_else(|| Error::MissingField("sms address".to_string()))?;
        let timestamp_millis = match date {
            Some(d) => d
                .trim()
                .parse::<i64>()
                .map_err(|_| Error::ParseError(format!("Invalid sms date: {}", d)))?,
            None => 0,
        };

        Ok(RawMessage::new(body, address, timestamp_millis))
    }
}
