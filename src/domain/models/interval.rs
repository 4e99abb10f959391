use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Half-open interval `[start, end)` on the UTC timeline.
///
/// All tenant-local wall-clock times are converted to UTC before they get
/// here, so comparisons are free of DST ambiguity. The half-open convention
/// means an appointment ending at T and one starting at T do not collide,
/// which is what allows back-to-back bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AppError> {
        if end <= start {
            return Err(AppError::InvalidInterval(
                "end_time must be strictly after start_time".into(),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    fn iv(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> TimeInterval {
        TimeInterval::new(at(start_h, start_m), at(end_h, end_m)).unwrap()
    }

    #[test]
    fn rejects_non_positive_duration() {
        assert!(TimeInterval::new(at(10, 0), at(10, 0)).is_err());
        assert!(TimeInterval::new(at(10, 0), at(9, 0)).is_err());
    }

    #[test]
    fn overlap_is_symmetric() {
        let cases = [
            (iv(9, 0, 10, 0), iv(9, 30, 10, 30)),
            (iv(9, 0, 10, 0), iv(10, 0, 11, 0)),
            (iv(9, 0, 12, 0), iv(10, 0, 11, 0)),
            (iv(9, 0, 9, 30), iv(11, 0, 11, 30)),
        ];
        for (a, b) in cases {
            assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }
    }

    #[test]
    fn back_to_back_does_not_overlap() {
        let a = iv(9, 0, 10, 0);
        let b = iv(10, 0, 11, 0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn containment_detected() {
        let outer = iv(9, 0, 12, 0);
        let inner = iv(10, 0, 11, 0);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn contains_is_half_open() {
        let a = iv(9, 0, 10, 0);
        assert!(a.contains(at(9, 0)));
        assert!(a.contains(at(9, 59)));
        assert!(!a.contains(at(10, 0)));
    }
}
