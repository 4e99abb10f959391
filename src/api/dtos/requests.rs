use crate::domain::models::schedule::WeekdayHours;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    pub slug: String,
}

#[derive(Deserialize)]
pub struct UpsertScheduleRequest {
    pub timezone: String,
    pub slot_duration_min: i32,
    pub hours: WeekdayHours,
}

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Deserialize)]
pub struct CreateAppointmentRequest {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub service_type: String,
    pub notes: Option<String>,
    pub hold_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct ListAppointmentsQuery {
    pub status: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct UpcomingQuery {
    pub days: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateHoldRequest {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub customer_name: String,
    pub customer_phone: String,
}
