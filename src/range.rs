//! Date ranges and source ordering.
//!
//! A [`DateRange`] bounds an export to the half-open UTC interval
//! `[from, to)`. Calendar-date input maps to midnight UTC, so a range of
//! `2025-11-01..2025-12-01` covers all of November.
//!
//! [`SortOrder`] names the direction a record source iterates in. It is an
//! explicit parameter rather than an unstated assumption: the range filter
//! needs it to pick the correct early-termination rule.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::TgrabError;

/// Iteration direction of a record source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest records first (channel and chat history pagination).
    NewestFirst,
    /// Oldest records first.
    OldestFirst,
    /// No ordering guarantee; both range bounds are checked on every
    /// record and the scan never short-circuits.
    Unordered,
}

/// A half-open UTC interval `[from, to)`.
///
/// # Examples
///
/// ```
/// use tgrab::range::DateRange;
///
/// # fn main() -> tgrab::Result<()> {
/// let range = DateRange::parse("2025-11-01", "2025-12-01")?;
/// assert_eq!(range.from.to_rfc3339(), "2025-11-01T00:00:00+00:00");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// Inclusive lower bound.
    pub from: DateTime<Utc>,
    /// Exclusive upper bound.
    pub to: DateTime<Utc>,
}

impl DateRange {
    /// Creates a range from two timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`TgrabError::Config`] if `from > to`.
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, TgrabError> {
        if from > to {
            return Err(TgrabError::config(format!(
                "invalid date range: {from} is after {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// Parses two `YYYY-MM-DD` calendar dates into a range of midnights.
    ///
    /// # Errors
    ///
    /// Returns [`TgrabError::InvalidDate`] for malformed input and
    /// [`TgrabError::Config`] for an inverted range.
    pub fn parse(from_str: &str, to_str: &str) -> Result<Self, TgrabError> {
        Self::new(parse_date_start(from_str)?, parse_date_start(to_str)?)
    }

    /// Returns `true` if `ts` falls within `[from, to)`.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.from && ts < self.to
    }
}

/// Parse a `YYYY-MM-DD` date string to midnight UTC.
fn parse_date_start(date_str: &str) -> Result<DateTime<Utc>, TgrabError> {
    let naive = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| TgrabError::invalid_date(date_str))?;

    let naive_dt = naive.and_hms_opt(0, 0, 0).unwrap();
    Ok(naive_dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_range() {
        let range = DateRange::parse("2025-11-01", "2025-12-01").unwrap();
        assert_eq!(
            range.from,
            Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(range.to, Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_invalid_date() {
        let result = DateRange::parse("01-11-2025", "2025-12-01");
        assert!(matches!(result, Err(TgrabError::InvalidDate { .. })));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = DateRange::parse("2025-12-01", "2025-11-01");
        assert!(matches!(result, Err(TgrabError::Config(_))));
    }

    #[test]
    fn test_empty_range_allowed() {
        // from == to is a valid (empty) interval
        let range = DateRange::parse("2025-11-01", "2025-11-01").unwrap();
        assert!(!range.contains(range.from));
    }

    #[test]
    fn test_half_open_bounds() {
        let range = DateRange::parse("2025-11-01", "2025-12-01").unwrap();

        // from is inclusive
        assert!(range.contains(range.from));
        // one second before from is out
        assert!(!range.contains(range.from - chrono::Duration::seconds(1)));
        // one second before to is in
        assert!(range.contains(range.to - chrono::Duration::seconds(1)));
        // to is exclusive
        assert!(!range.contains(range.to));
    }
}
