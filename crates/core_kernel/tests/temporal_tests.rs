//! Unit tests for the temporal module
//!
//! Covers validity intervals, the close-before handover used by rate
//! versioning, and billing date ranges.

use chrono::NaiveDate;
use core_kernel::{DateRange, TemporalError, Validity};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

mod validity {
    use super::*;

    #[test]
    fn test_open_validity_has_no_end() {
        let v = Validity::open(d(2025, 1, 1));
        assert!(v.is_open());
        assert_eq!(v.valid_until, None);
    }

    #[test]
    fn test_contains_on_exact_bounds() {
        let v = Validity::bounded(d(2025, 1, 1), d(2025, 1, 31)).unwrap();
        assert!(v.contains(d(2025, 1, 1)));
        assert!(v.contains(d(2025, 1, 31)));
    }

    #[test]
    fn test_contains_rejects_day_before_start() {
        let v = Validity::open(d(2025, 1, 1));
        assert!(!v.contains(d(2024, 12, 31)));
    }

    #[test]
    fn test_single_day_validity() {
        let v = Validity::bounded(d(2025, 1, 15), d(2025, 1, 15)).unwrap();
        assert!(v.contains(d(2025, 1, 15)));
        assert!(!v.contains(d(2025, 1, 14)));
        assert!(!v.contains(d(2025, 1, 16)));
    }

    #[test]
    fn test_close_before_across_month_boundary() {
        let mut v = Validity::open(d(2025, 1, 1));
        v.close_before(d(2025, 3, 1)).unwrap();
        assert_eq!(v.valid_until, Some(d(2025, 2, 28)));
    }

    #[test]
    fn test_close_before_same_day_is_rejected() {
        let mut v = Validity::open(d(2025, 2, 1));
        assert_eq!(
            v.close_before(d(2025, 2, 1)),
            Err(TemporalError::ClosePrecedesStart {
                start: d(2025, 2, 1),
                cutoff: d(2025, 2, 1),
            })
        );
    }

    #[test]
    fn test_closed_and_successor_partition_time() {
        let mut old = Validity::open(d(2025, 1, 1));
        old.close_before(d(2025, 2, 1)).unwrap();
        let new = Validity::open(d(2025, 2, 1));

        // No gap, no overlap across the handover day
        assert!(old.contains(d(2025, 1, 31)));
        assert!(!old.contains(d(2025, 2, 1)));
        assert!(new.contains(d(2025, 2, 1)));
        assert!(!old.overlaps(&new));
    }
}

mod date_range {
    use super::*;

    #[test]
    fn test_range_is_inclusive() {
        let r = DateRange::new(d(2025, 1, 5), d(2025, 1, 6)).unwrap();
        assert!(r.contains(d(2025, 1, 5)));
        assert!(r.contains(d(2025, 1, 6)));
        assert!(!r.contains(d(2025, 1, 7)));
        assert_eq!(r.days(), 2);
    }

    #[test]
    fn test_single_day_range() {
        let r = DateRange::single_day(d(2025, 1, 5));
        assert_eq!(r.start, r.end);
        assert_eq!(r.days(), 1);
    }

    #[test]
    fn test_widened_bounds_cover_whole_days() {
        let r = DateRange::single_day(d(2025, 1, 5));
        assert_eq!(
            r.start_of_first_day(),
            d(2025, 1, 5).and_hms_opt(0, 0, 0).unwrap()
        );
        assert_eq!(
            r.end_of_last_day(),
            d(2025, 1, 5).and_hms_opt(23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        assert!(matches!(
            DateRange::new(d(2025, 2, 1), d(2025, 1, 1)),
            Err(TemporalError::InvalidPeriod { .. })
        ));
    }
}
