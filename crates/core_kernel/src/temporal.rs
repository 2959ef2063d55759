//! Inclusive-date temporal types
//!
//! Rate validity and billing periods are expressed in calendar dates with
//! *inclusive* bounds on both ends, matching how the pricing terms are
//! communicated to customers ("valid from 1 Jan through 31 Jan"). An open
//! validity has no end date and represents the currently active terms.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must not be after end {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    #[error("Cannot close validity starting {start} before {cutoff}")]
    ClosePrecedesStart { start: NaiveDate, cutoff: NaiveDate },
}

/// The validity interval of a rate condition.
///
/// Both bounds are inclusive calendar dates; `valid_until = None` marks the
/// customer's currently open (active) condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validity {
    /// First day the condition applies (inclusive)
    pub valid_from: NaiveDate,
    /// Last day the condition applies (inclusive), None while open-ended
    pub valid_until: Option<NaiveDate>,
}

impl Validity {
    /// Creates an open-ended validity starting on the given day.
    pub fn open(valid_from: NaiveDate) -> Self {
        Self {
            valid_from,
            valid_until: None,
        }
    }

    /// Creates a bounded validity covering `[valid_from, valid_until]`.
    pub fn bounded(valid_from: NaiveDate, valid_until: NaiveDate) -> Result<Self, TemporalError> {
        if valid_from > valid_until {
            return Err(TemporalError::InvalidPeriod {
                start: valid_from,
                end: valid_until,
            });
        }
        Ok(Self {
            valid_from,
            valid_until: Some(valid_until),
        })
    }

    /// Returns true while the validity has no end date.
    pub fn is_open(&self) -> bool {
        self.valid_until.is_none()
    }

    /// Returns true if the given day falls within the validity.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.valid_from && self.valid_until.map_or(true, |until| date <= until)
    }

    /// Closes the validity on the day before `successor_from`, the handover
    /// used when a new rate version takes effect.
    pub fn close_before(&mut self, successor_from: NaiveDate) -> Result<(), TemporalError> {
        if successor_from <= self.valid_from {
            return Err(TemporalError::ClosePrecedesStart {
                start: self.valid_from,
                cutoff: successor_from,
            });
        }
        // successor_from is strictly after valid_from, so the predecessor
        // day always exists
        self.valid_until = successor_from.checked_sub_days(Days::new(1));
        Ok(())
    }

    /// Returns true if two validities share at least one day.
    pub fn overlaps(&self, other: &Validity) -> bool {
        let self_until = self.valid_until.unwrap_or(NaiveDate::MAX);
        let other_until = other.valid_until.unwrap_or(NaiveDate::MAX);

        self.valid_from <= other_until && other.valid_from <= self_until
    }
}

/// A billing period selected by the operator, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range covering exactly one day.
    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// First instant of the range, 00:00:00 on the start day.
    ///
    /// Visit timestamps carry a time of day; the operator picks whole days,
    /// so the range is widened to full days when filtering visits.
    pub fn start_of_first_day(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Last instant of the range, 23:59:59 on the end day.
    pub fn end_of_last_day(&self) -> NaiveDateTime {
        self.end
            .and_hms_opt(23, 59, 59)
            .expect("23:59:59 is a valid time of day")
    }

    /// Number of calendar days covered, counting both endpoints.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_open_validity_contains_everything_after_start() {
        let v = Validity::open(d(2025, 1, 1));
        assert!(v.is_open());
        assert!(v.contains(d(2025, 1, 1)));
        assert!(v.contains(d(2030, 6, 15)));
        assert!(!v.contains(d(2024, 12, 31)));
    }

    #[test]
    fn test_bounded_validity_is_inclusive_on_both_ends() {
        let v = Validity::bounded(d(2025, 1, 1), d(2025, 1, 31)).unwrap();
        assert!(v.contains(d(2025, 1, 1)));
        assert!(v.contains(d(2025, 1, 31)));
        assert!(!v.contains(d(2025, 2, 1)));
    }

    #[test]
    fn test_bounded_validity_rejects_inverted_bounds() {
        let result = Validity::bounded(d(2025, 2, 1), d(2025, 1, 1));
        assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_close_before_sets_previous_day() {
        let mut v = Validity::open(d(2025, 1, 1));
        v.close_before(d(2025, 2, 1)).unwrap();
        assert_eq!(v.valid_until, Some(d(2025, 1, 31)));
    }

    #[test]
    fn test_close_before_rejects_non_monotonic_cutoff() {
        let mut v = Validity::open(d(2025, 2, 1));
        let result = v.close_before(d(2025, 2, 1));
        assert!(matches!(result, Err(TemporalError::ClosePrecedesStart { .. })));
    }

    #[test]
    fn test_adjacent_validities_do_not_overlap() {
        let closed = Validity::bounded(d(2025, 1, 1), d(2025, 1, 31)).unwrap();
        let open = Validity::open(d(2025, 2, 1));
        assert!(!closed.overlaps(&open));
        assert!(open.overlaps(&Validity::open(d(2025, 1, 15))));
    }

    #[test]
    fn test_date_range_day_bounds() {
        let range = DateRange::new(d(2025, 1, 1), d(2025, 1, 31)).unwrap();
        assert_eq!(
            range.start_of_first_day(),
            d(2025, 1, 1).and_hms_opt(0, 0, 0).unwrap()
        );
        assert_eq!(
            range.end_of_last_day(),
            d(2025, 1, 31).and_hms_opt(23, 59, 59).unwrap()
        );
        assert_eq!(range.days(), 31);
    }

    #[test]
    fn test_date_range_rejects_inverted_bounds() {
        assert!(DateRange::new(d(2025, 1, 2), d(2025, 1, 1)).is_err());
    }
}
