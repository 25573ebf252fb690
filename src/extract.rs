//! Field extraction with named capture groups.
//!
//! A [`FieldExtractor`] owns one compiled pattern. Applying it to a body gives
//! either a complete [`Fields`] map (field name to substring) or nothing;
//! there is no partial match and no matcher state carried between calls.

use crate::error::{Error, ParseFailure, Result};
use crate::types::{MessageShape, RawMessage};
use regex::Regex;
use std::collections::HashMap;

/// `<UPPERCASE WORD(S)> SACCOS group`, captured as `group`.
pub const GROUP_NAME: &str = r"(?P<group>[A-Z][A-Z0-9&'-]*(?:\s+[A-Z][A-Z0-9&'-]*)*\s+SACCOS\s+group)";

/// `TZS.` amount with its whole and fractional parts captured as
/// `<name>_whole` and `<name>_fraction`.
pub fn amount_fragment(name: &str) -> String {
    format!(
        r"TZS\.(?P<{name}_whole>[0-9,]+)(?:\.(?P<{name}_fraction>[0-9]{{1,2}}))?",
        name = name
    )
}

/// A named, precompiled extraction pattern.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    name: &'static str,
    pattern: Regex,
}

impl FieldExtractor {
    /// Compile a pattern.
    pub fn new(name: &'static str, pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| Error::ParseError(format!("{} pattern: {}", name, e)))?;
        Ok(Self { name, pattern })
    }

    /// Pattern name used in failure reasons.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Apply the pattern to `body`; `None` unless the whole pattern matches.
    pub fn extract<'t>(&self, body: &'t str) -> Option<Fields<'t>> {
        let caps = self.pattern.captures(body)?;
        let values = self
            .pattern
            .capture_names()
            .flatten()
            .filter_map(|name| caps.name(name).map(|m| (name.to_string(), m.as_str())))
            .collect();
        Some(Fields { values })
    }
}

/// Substrings captured by one successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fields<'t> {
    values: HashMap<String, &'t str>,
}

impl<'t> Fields<'t> {
    /// Captured text for `name`, if that group took part in the match.
    pub fn get(&self, name: &str) -> Option<&'t str> {
        self.values.get(name).copied()
    }

    /// Captured text for `name`, failing when absent or blank.
    pub fn required(&self, name: &str) -> std::result::Result<&'t str, String> {
        match self.get(name).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(format!("missing required field `{}`", name)),
        }
    }

    /// Whole and optional fractional part of the amount captured by
    /// [`amount_fragment`]`(name)`.
    pub fn amount(&self, name: &str) -> std::result::Result<(&'t str, Option<&'t str>), String> {
        let whole = self.required(&format!("{}_whole", name))?;
        Ok((whole, self.get(&format!("{}_fraction", name))))
    }

    /// Number of captured groups.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Builds [`ParseFailure`]s for one message under one classified shape.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FailureContext<'a> {
    pub message: &'a RawMessage,
    pub shape: MessageShape,
}

impl<'a> FailureContext<'a> {
    pub fn new(message: &'a RawMessage, shape: MessageShape) -> Self {
        Self { message, shape }
    }

    pub fn extraction(&self, reason: impl Into<String>) -> ParseFailure {
        ParseFailure::Extraction {
            message: self.message.clone(),
            shape: self.shape,
            reason: reason.into(),
        }
    }

    pub fn normalization(&self, field: &'static str, err: Error) -> ParseFailure {
        ParseFailure::Normalization {
            message: self.message.clone(),
            shape: self.shape,
            field,
            reason: err.to_string(),
        }
    }

    /// Apply `extractor` to the message body or report a layout mismatch.
    pub fn extract(&self, extractor: &FieldExtractor) -> std::result::Result<Fields<'a>, ParseFailure> {
        extractor.extract(self.message.body.trim()).ok_or_else(|| {
            self.extraction(format!("body does not match the {} layout", extractor.name()))
        })
    }

    /// A trimmed, non-empty phone number of 9 to 15 digits.
    pub fn phone(&self, raw: &str) -> std::result::Result<String, ParseFailure> {
        let raw = raw.trim();
        if !raw.chars().all(|c| c.is_ascii_digit()) || !(9..=15).contains(&raw.len()) {
            return Err(self.extraction(format!("phone `{}` must be 9 to 15 digits", raw)));
        }
        Ok(raw.to_string())
    }
}
