use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::models::interval::TimeInterval;

#[derive(Serialize)]
pub struct TenantCreatedResponse {
    pub tenant_id: String,
}

#[derive(Serialize)]
pub struct SlotsResponse {
    pub from: String,
    pub to: String,
    pub slots: Vec<TimeInterval>,
}

#[derive(Serialize)]
pub struct HoldResponse {
    pub hold_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
