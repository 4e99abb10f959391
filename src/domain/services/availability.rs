use chrono::Duration;

use crate::domain::models::interval::TimeInterval;

/// Busy intervals for one tenant and date range, held sorted by start so each
/// candidate only has to look at its local neighbourhood instead of the whole
/// set. Built once per availability request from the range-bounded query.
pub struct BusySet {
    sorted: Vec<TimeInterval>,
    max_len: Duration,
}

impl BusySet {
    pub fn new(mut intervals: Vec<TimeInterval>) -> Self {
        intervals.sort_by_key(|iv| iv.start);
        let max_len = intervals
            .iter()
            .map(|iv| iv.duration())
            .max()
            .unwrap_or_else(Duration::zero);
        Self { sorted: intervals, max_len }
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// True iff any busy interval overlaps the candidate. Binary search
    /// narrows the scan to intervals that start before the candidate ends and
    /// late enough that they could still reach into it.
    pub fn blocks(&self, candidate: &TimeInterval) -> bool {
        let hi = self.sorted.partition_point(|iv| iv.start < candidate.end);
        let horizon = candidate.start - self.max_len;
        let lo = self.sorted.partition_point(|iv| iv.start <= horizon);
        self.sorted[lo..hi].iter().any(|iv| iv.overlaps(candidate))
    }
}

/// Streaming availability filter: keeps every candidate no busy interval
/// overlaps, preserving generator order.
pub fn filter_available(
    candidates: impl Iterator<Item = TimeInterval>,
    busy: &BusySet,
) -> Vec<TimeInterval> {
    candidates.filter(|slot| !busy.blocks(slot)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    fn iv(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> TimeInterval {
        TimeInterval::new(at(start_h, start_m), at(end_h, end_m)).unwrap()
    }

    #[test]
    fn empty_busy_set_blocks_nothing() {
        let busy = BusySet::new(vec![]);
        assert!(!busy.blocks(&iv(9, 0, 9, 30)));
    }

    #[test]
    fn overlapping_candidate_is_blocked() {
        let busy = BusySet::new(vec![iv(9, 0, 9, 30)]);
        assert!(busy.blocks(&iv(9, 0, 9, 30)));
        assert!(busy.blocks(&iv(8, 45, 9, 15)));
        assert!(busy.blocks(&iv(9, 15, 9, 45)));
    }

    #[test]
    fn adjacent_candidate_is_free() {
        let busy = BusySet::new(vec![iv(9, 0, 9, 30)]);
        assert!(!busy.blocks(&iv(8, 30, 9, 0)));
        assert!(!busy.blocks(&iv(9, 30, 10, 0)));
    }

    #[test]
    fn long_appointment_is_not_missed_by_narrowed_scan() {
        // Sorted by start, a 3h appointment sits far before a candidate that
        // it still covers. The max-length horizon has to keep it in scope.
        let busy = BusySet::new(vec![iv(8, 0, 11, 0), iv(9, 0, 9, 15), iv(12, 0, 12, 30)]);
        assert!(busy.blocks(&iv(10, 30, 11, 0)));
        assert!(!busy.blocks(&iv(11, 0, 11, 30)));
    }

    #[test]
    fn filter_preserves_candidate_order() {
        let busy = BusySet::new(vec![iv(9, 30, 10, 0)]);
        let candidates = vec![iv(9, 0, 9, 30), iv(9, 30, 10, 0), iv(10, 0, 10, 30)];
        let free = filter_available(candidates.into_iter(), &busy);
        assert_eq!(free, vec![iv(9, 0, 9, 30), iv(10, 0, 10, 30)]);
    }
}
