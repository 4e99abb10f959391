use chrono::{Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::domain::models::interval::TimeInterval;
use crate::domain::models::schedule::{ScheduleConfig, WeekdayHours};
use crate::error::AppError;

/// Upper bound on a single availability query, keeps the candidate sequence
/// finite even for open-ended clients.
pub const MAX_RANGE_DAYS: i64 = 90;

/// Lazy sequence of candidate slots for one tenant over an inclusive date
/// range. Walks day by day through the weekday windows of the schedule
/// config, stepping by the slot duration; a window remainder shorter than one
/// slot is dropped. Restartable: building a second generator from the same
/// inputs yields the identical sequence.
pub struct SlotGenerator {
    tz: Tz,
    hours: WeekdayHours,
    slot_duration: Duration,
    to: NaiveDate,
    current_date: NaiveDate,
    day_windows: Vec<(u32, u32)>,
    window_idx: usize,
    cursor_min: u32,
    done: bool,
}

impl SlotGenerator {
    pub fn new(config: &ScheduleConfig, from: NaiveDate, to: NaiveDate) -> Result<Self, AppError> {
        if config.slot_duration_min <= 0 {
            return Err(AppError::InvalidConfiguration(
                "slot_duration_min must be positive".into(),
            ));
        }
        if from > to {
            return Err(AppError::InvalidConfiguration(
                "from_date must not be after to_date".into(),
            ));
        }
        if (to - from).num_days() > MAX_RANGE_DAYS {
            return Err(AppError::InvalidConfiguration(format!(
                "date range exceeds {} days", MAX_RANGE_DAYS
            )));
        }

        let mut generator = Self {
            tz: config.tz(),
            hours: config.hours(),
            slot_duration: Duration::minutes(config.slot_duration_min as i64),
            to,
            current_date: from,
            day_windows: Vec::new(),
            window_idx: 0,
            cursor_min: 0,
            done: false,
        };
        generator.load_day();
        Ok(generator)
    }

    fn load_day(&mut self) {
        self.day_windows.clear();
        self.window_idx = 0;

        if let Some(windows) = self.hours.for_weekday(self.current_date.weekday()) {
            for window in windows {
                if let (Ok(start), Ok(end)) = (
                    NaiveTime::parse_from_str(&window.start, "%H:%M"),
                    NaiveTime::parse_from_str(&window.end, "%H:%M"),
                ) {
                    let start_min = start.hour() * 60 + start.minute();
                    let mut end_min = end.hour() * 60 + end.minute();
                    if end_min == 1439 {
                        end_min = 1440;
                    }
                    if start_min < end_min {
                        self.day_windows.push((start_min, end_min));
                    }
                }
            }
        }
        self.day_windows.sort_unstable();
        self.cursor_min = self.day_windows.first().map(|w| w.0).unwrap_or(0);
    }

    fn advance_day(&mut self) -> bool {
        if self.current_date >= self.to {
            return false;
        }
        match self.current_date.succ_opt() {
            Some(next) => {
                self.current_date = next;
                self.load_day();
                true
            }
            None => false,
        }
    }
}

impl Iterator for SlotGenerator {
    type Item = TimeInterval;

    fn next(&mut self) -> Option<TimeInterval> {
        if self.done {
            return None;
        }
        let dur_min = self.slot_duration.num_minutes() as u32;

        loop {
            if let Some(&(win_start, win_end)) = self.day_windows.get(self.window_idx) {
                let cursor = self.cursor_min.max(win_start);
                if cursor + dur_min <= win_end {
                    self.cursor_min = cursor + dur_min;

                    let time = NaiveTime::from_hms_opt(cursor / 60, cursor % 60, 0)?;
                    let local = self.current_date.and_time(time);
                    // Local times that DST skips or duplicates are not bookable
                    if let Some(start_tz) = self.tz.from_local_datetime(&local).single() {
                        let start = start_tz.with_timezone(&Utc);
                        return Some(TimeInterval { start, end: start + self.slot_duration });
                    }
                    continue;
                }
                self.window_idx += 1;
                if let Some(&(next_start, _)) = self.day_windows.get(self.window_idx) {
                    self.cursor_min = next_start;
                }
                continue;
            }
            if !self.advance_day() {
                self.done = true;
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::schedule::{TimeWindow, WeekdayHours};

    fn config_with(windows: Vec<TimeWindow>, slot_duration_min: i32, timezone: &str) -> ScheduleConfig {
        let hours = WeekdayHours {
            monday: Some(windows),
            ..Default::default()
        };
        ScheduleConfig::new("t1".into(), timezone.into(), slot_duration_min, &hours).unwrap()
    }

    // 2026-03-02 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn one_hour_window_with_half_hour_slots_yields_two() {
        let config = config_with(
            vec![TimeWindow { start: "09:00".into(), end: "10:00".into() }],
            30,
            "UTC",
        );
        let slots: Vec<_> = SlotGenerator::new(&config, monday(), monday()).unwrap().collect();

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].start.to_rfc3339(), "2026-03-02T09:00:00+00:00");
        assert_eq!(slots[1].start.to_rfc3339(), "2026-03-02T09:30:00+00:00");
        assert_eq!(slots[1].end.to_rfc3339(), "2026-03-02T10:00:00+00:00");
    }

    #[test]
    fn window_remainder_is_dropped() {
        let config = config_with(
            vec![TimeWindow { start: "09:00".into(), end: "10:15".into() }],
            30,
            "UTC",
        );
        let slots: Vec<_> = SlotGenerator::new(&config, monday(), monday()).unwrap().collect();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].end.to_rfc3339(), "2026-03-02T10:00:00+00:00");
    }

    #[test]
    fn closed_weekday_yields_nothing() {
        let config = config_with(
            vec![TimeWindow { start: "09:00".into(), end: "17:00".into() }],
            60,
            "UTC",
        );
        // 2026-03-03 is a Tuesday with no configured window
        let tuesday = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
        let slots: Vec<_> = SlotGenerator::new(&config, tuesday, tuesday).unwrap().collect();
        assert!(slots.is_empty());
    }

    #[test]
    fn generation_is_deterministic_and_restartable() {
        let config = config_with(
            vec![
                TimeWindow { start: "09:00".into(), end: "12:00".into() },
                TimeWindow { start: "13:00".into(), end: "15:00".into() },
            ],
            45,
            "Europe/Berlin",
        );
        let first: Vec<_> = SlotGenerator::new(&config, monday(), monday()).unwrap().collect();
        let second: Vec<_> = SlotGenerator::new(&config, monday(), monday()).unwrap().collect();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn slots_are_emitted_in_tenant_timezone() {
        let config = config_with(
            vec![TimeWindow { start: "09:00".into(), end: "10:00".into() }],
            60,
            "Europe/Berlin",
        );
        let slots: Vec<_> = SlotGenerator::new(&config, monday(), monday()).unwrap().collect();
        // 09:00 CET == 08:00 UTC
        assert_eq!(slots[0].start.to_rfc3339(), "2026-03-02T08:00:00+00:00");
    }

    #[test]
    fn invalid_range_is_rejected() {
        let config = config_with(
            vec![TimeWindow { start: "09:00".into(), end: "10:00".into() }],
            30,
            "UTC",
        );
        let later = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert!(matches!(
            SlotGenerator::new(&config, later, monday()),
            Err(AppError::InvalidConfiguration(_))
        ));
        let far = monday() + Duration::days(MAX_RANGE_DAYS + 1);
        assert!(matches!(
            SlotGenerator::new(&config, monday(), far),
            Err(AppError::InvalidConfiguration(_))
        ));
    }
}
