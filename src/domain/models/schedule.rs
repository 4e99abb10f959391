use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use sqlx::FromRow;

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct WeekdayHours {
    pub monday: Option<Vec<TimeWindow>>,
    pub tuesday: Option<Vec<TimeWindow>>,
    pub wednesday: Option<Vec<TimeWindow>>,
    pub thursday: Option<Vec<TimeWindow>>,
    pub friday: Option<Vec<TimeWindow>>,
    pub saturday: Option<Vec<TimeWindow>>,
    pub sunday: Option<Vec<TimeWindow>>,
}

impl WeekdayHours {
    pub fn for_weekday(&self, weekday: chrono::Weekday) -> Option<&Vec<TimeWindow>> {
        match weekday {
            chrono::Weekday::Mon => self.monday.as_ref(),
            chrono::Weekday::Tue => self.tuesday.as_ref(),
            chrono::Weekday::Wed => self.wednesday.as_ref(),
            chrono::Weekday::Thu => self.thursday.as_ref(),
            chrono::Weekday::Fri => self.friday.as_ref(),
            chrono::Weekday::Sat => self.saturday.as_ref(),
            chrono::Weekday::Sun => self.sunday.as_ref(),
        }
    }
}

/// Per-tenant scheduling configuration. Read-only input to slot generation;
/// one row per tenant, upserted through the schedule endpoint.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ScheduleConfig {
    pub tenant_id: String,
    pub timezone: String,
    pub slot_duration_min: i32,
    pub hours_json: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleConfig {
    pub fn new(tenant_id: String, timezone: String, slot_duration_min: i32, hours: &WeekdayHours) -> Result<Self, AppError> {
        let now = Utc::now();
        let config = Self {
            tenant_id,
            timezone,
            slot_duration_min,
            hours_json: serde_json::to_string(hours)
                .map_err(|_| AppError::InvalidConfiguration("hours are not serializable".into()))?,
            created_at: now,
            updated_at: now,
        };
        config.validate()?;
        Ok(config)
    }

    /// Working hours used when a tenant has not configured a schedule yet:
    /// 09:00-17:00 on weekdays, 10:00-14:00 on weekends, hourly slots, UTC.
    pub fn default_for(tenant_id: &str) -> Self {
        let weekday = vec![TimeWindow { start: "09:00".into(), end: "17:00".into() }];
        let weekend = vec![TimeWindow { start: "10:00".into(), end: "14:00".into() }];
        let hours = WeekdayHours {
            monday: Some(weekday.clone()),
            tuesday: Some(weekday.clone()),
            wednesday: Some(weekday.clone()),
            thursday: Some(weekday.clone()),
            friday: Some(weekday),
            saturday: Some(weekend.clone()),
            sunday: Some(weekend),
        };
        let now = Utc::now();
        Self {
            tenant_id: tenant_id.to_string(),
            timezone: "UTC".to_string(),
            slot_duration_min: 60,
            hours_json: serde_json::to_string(&hours).unwrap_or_else(|_| "{}".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.slot_duration_min <= 0 {
            return Err(AppError::InvalidConfiguration(
                "slot_duration_min must be positive".into(),
            ));
        }
        if self.timezone.parse::<Tz>().is_err() {
            return Err(AppError::InvalidConfiguration(format!(
                "unknown timezone '{}'", self.timezone
            )));
        }
        let hours = self.hours();
        for windows in [
            &hours.monday, &hours.tuesday, &hours.wednesday, &hours.thursday,
            &hours.friday, &hours.saturday, &hours.sunday,
        ].into_iter().flatten() {
            for window in windows {
                let start = NaiveTime::parse_from_str(&window.start, "%H:%M")
                    .map_err(|_| AppError::InvalidConfiguration(format!("bad window start '{}'", window.start)))?;
                let end = NaiveTime::parse_from_str(&window.end, "%H:%M")
                    .map_err(|_| AppError::InvalidConfiguration(format!("bad window end '{}'", window.end)))?;
                if end <= start {
                    return Err(AppError::InvalidConfiguration(format!(
                        "window {}-{} must end after it starts", window.start, window.end
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn hours(&self) -> WeekdayHours {
        serde_json::from_str(&self.hours_json).unwrap_or_default()
    }

    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(chrono_tz::UTC)
    }
}
