//! Date-range filtering with direction-aware early termination.
//!
//! [`RangeFilter`] wraps a record stream and yields only records whose
//! timestamp falls within a half-open `[from, to)` interval. Because
//! platform history is time-ordered, the filter stops consuming the
//! upstream as soon as the remaining records cannot be in range:
//!
//! - newest-first: stop at the first record older than `from`
//! - oldest-first: stop at the first record at or past `to`
//! - unordered: no short-circuit, both bounds checked on every record
//!
//! This bounds cost to O(records in or after the range) instead of
//! O(total history). Records without a timestamp are skipped and never
//! terminate the scan.

use crate::error::Result;
use crate::range::{DateRange, SortOrder};
use crate::record::RawRecord;

/// Iterator adapter bounding a record stream to a date range.
///
/// Once the termination rule fires the filter is fused: it returns `None`
/// without pulling the upstream again.
///
/// # Examples
///
/// ```
/// use tgrab::filter::RangeFilter;
/// use tgrab::range::{DateRange, SortOrder};
/// use tgrab::record::RawRecord;
/// use chrono::{TimeZone, Utc};
///
/// # fn main() -> tgrab::Result<()> {
/// let range = DateRange::parse("2025-11-01", "2025-12-01")?;
/// let records = vec![
///     Ok(RawRecord::new(3, "dec").with_date(Utc.with_ymd_and_hms(2025, 12, 2, 0, 0, 0).unwrap())),
///     Ok(RawRecord::new(2, "nov").with_date(Utc.with_ymd_and_hms(2025, 11, 20, 0, 0, 0).unwrap())),
///     Ok(RawRecord::new(1, "oct").with_date(Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap())),
/// ];
///
/// let kept: Vec<_> = RangeFilter::new(records.into_iter(), range, SortOrder::NewestFirst)
///     .collect::<tgrab::Result<Vec<_>>>()?;
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept[0].id, 2);
/// # Ok(())
/// # }
/// ```
pub struct RangeFilter<I> {
    inner: I,
    range: DateRange,
    order: SortOrder,
    done: bool,
}

impl<I> RangeFilter<I>
where
    I: Iterator<Item = Result<RawRecord>>,
{
    /// Wraps `inner` with the given range and iteration direction.
    pub fn new(inner: I, range: DateRange, order: SortOrder) -> Self {
        Self {
            inner,
            range,
            order,
            done: false,
        }
    }
}

impl<I> Iterator for RangeFilter<I>
where
    I: Iterator<Item = Result<RawRecord>>,
{
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let record = match self.inner.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => return Some(Err(e)),
                Some(Ok(rec)) => rec,
            };

            // Undated records cannot be placed in the interval; skip them
            // without touching the termination rule.
            let Some(ts) = record.date else { continue };

            match self.order {
                SortOrder::NewestFirst => {
                    if ts < self.range.from {
                        self.done = true;
                        return None;
                    }
                    if ts >= self.range.to {
                        continue;
                    }
                }
                SortOrder::OldestFirst => {
                    if ts >= self.range.to {
                        self.done = true;
                        return None;
                    }
                    if ts < self.range.from {
                        continue;
                    }
                }
                SortOrder::Unordered => {
                    if !self.range.contains(ts) {
                        continue;
                    }
                }
            }

            return Some(Ok(record));
        }
    }
}
