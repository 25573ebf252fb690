//! Amount, date and time normalizers.
//!
//! Amounts are carried as integer minor units (TZS cents) so batch sums never
//! touch floating point. Dates are validated against the month length and the
//! leap-year rule and are never clamped.

use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveTime};
use std::fmt;

/// Currency prefix used by the SACCOS messages.
pub const CURRENCY_PREFIX: &str = "TZS.";

/// Date layouts found in message bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `DD/MM/YYYY`
    DayMonthYear,
    /// `YYYY-MM-DD`
    YearMonthDay,
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateFormat::DayMonthYear => f.write_str("DD/MM/YYYY"),
            DateFormat::YearMonthDay => f.write_str("YYYY-MM-DD"),
        }
    }
}

/// Precision of a time-of-day substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePrecision {
    /// `HH:MM`
    Minutes,
    /// `HH:MM:SS`
    Seconds,
}

/// Convert an amount's whole part (digits with optional `,` thousands
/// separators) and optional fractional part into minor units.
///
/// A missing fraction counts as `.00` and a single fractional digit is
/// right-padded, so `50.0` is `5000`.
///
/// # Examples
///
/// ```
/// use mkoba_sms::normalize::normalize_amount;
///
/// assert_eq!(normalize_amount("1,000", Some("00")).unwrap(), 100_000);
/// assert_eq!(normalize_amount("50", Some("0")).unwrap(), 5_000);
/// assert_eq!(normalize_amount("1000", None).unwrap(), 100_000);
/// ```
pub fn normalize_amount(whole: &str, fraction: Option<&str>) -> Result<u64> {
    let whole = whole.trim();
    if whole.is_empty() {
        return Err(Error::InvalidAmount("empty whole-number part".to_string()));
    }
    if whole.contains(',') && !has_valid_grouping(whole) {
        return Err(Error::InvalidAmount(format!("malformed thousands separators in {}", whole)));
    }

    let digits: String = whole.chars().filter(|c| *c != ',').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::InvalidAmount(whole.to_string()));
    }

    let cents = match fraction.map(str::trim) {
        None | Some("") => "00".to_string(),
        Some(f) if f.len() == 1 && f.chars().all(|c| c.is_ascii_digit()) => format!("{}0", f),
        Some(f) if f.len() == 2 && f.chars().all(|c| c.is_ascii_digit()) => f.to_string(),
        Some(f) => return Err(Error::InvalidAmount(format!("invalid fraction .{}", f))),
    };

    format!("{}{}", digits, cents)
        .parse::<u64>()
        .map_err(|_| Error::InvalidAmount(format!("{} out of range", whole)))
}

/// Parse a whole amount substring such as `TZS.1,000.0` or `350,000.00`.
pub fn parse_amount(raw: &str) -> Result<u64> {
    let raw = raw.trim();
    let raw = raw.strip_prefix(CURRENCY_PREFIX).unwrap_or(raw);
    match raw.split_once('.') {
        Some((whole, fraction)) => normalize_amount(whole, Some(fraction)),
        None => normalize_amount(raw, None),
    }
}

/// `1,234` style grouping: a leading group of 1-3 digits, then groups of 3.
fn has_valid_grouping(whole: &str) -> bool {
    let mut groups = whole.split(',');
    let first_ok = groups
        .next()
        .map(|g| (1..=3).contains(&g.len()))
        .unwrap_or(false);
    first_ok && groups.all(|g| g.len() == 3)
}

/// Render minor units in the canonical `1,000.00` form.
///
/// Feeding the rendering back through [`parse_amount`] yields the same value.
pub fn render_amount(minor: u64) -> String {
    let whole = (minor / 100).to_string();
    let cents = minor % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}.{:02}", grouped, cents)
}

/// Parse a date substring in exactly the given layout.
///
/// Day-of-month is checked against the month: April, June, September and
/// November have 30 days, February 29 in leap years and 28 otherwise, the
/// rest 31.
pub fn normalize_date(raw: &str, format: DateFormat) -> Result<NaiveDate> {
    let raw = raw.trim();
    let invalid = || Error::InvalidDate(format!("{} (expected {})", raw, format));

    let (day, month, year) = match format {
        DateFormat::DayMonthYear => {
            let parts = split_numeric(raw, '/', [2, 2, 4]).ok_or_else(invalid)?;
            (parts[0], parts[1], parts[2])
        }
        DateFormat::YearMonthDay => {
            let parts = split_numeric(raw, '-', [4, 2, 2]).ok_or_else(invalid)?;
            (parts[2], parts[1], parts[0])
        }
    };

    if year == 0 || !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return Err(Error::InvalidDate(format!("{} is not a calendar date", raw)));
    }

    NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| Error::InvalidDate(format!("{} is not a calendar date", raw)))
}

/// Split `raw` on `sep` into exactly three all-digit parts of the given widths.
fn split_numeric(raw: &str, sep: char, widths: [usize; 3]) -> Option<[u32; 3]> {
    let parts: Vec<&str> = raw.split(sep).collect();
    if parts.len() != 3 {
        return None;
    }

    let mut out = [0u32; 3];
    for (i, (part, width)) in parts.iter().zip(widths).enumerate() {
        if part.len() != width || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        out[i] = part.parse().ok()?;
    }
    Some(out)
}

fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}

/// Parse a 24-hour time substring at the given precision.
///
/// Every component is exactly two digits; hours run to 23 and minutes and
/// seconds to 59, so leap seconds are rejected.
pub fn normalize_time(raw: &str, precision: TimePrecision) -> Result<NaiveTime> {
    let raw = raw.trim();
    let invalid = || Error::InvalidTime(raw.to_string());

    let parts: Vec<&str> = raw.split(':').collect();
    let expected = match precision {
        TimePrecision::Minutes => 2,
        TimePrecision::Seconds => 3,
    };
    if parts.len() != expected
        || !parts.iter().all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_digit()))
    {
        return Err(invalid());
    }

    let mut values = [0u32; 3];
    for (value, part) in values.iter_mut().zip(&parts) {
        *value = part.parse().map_err(|_| invalid())?;
    }
    let [hour, minute, second] = values;
    if hour > 23 || minute > 59 || second > 59 {
        return Err(invalid());
    }

    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(invalid)
}
