use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::models::interval::TimeInterval;

pub mod status {
    pub const SCHEDULED: &str = "scheduled";
    pub const CANCELLED: &str = "cancelled";
    pub const COMPLETED: &str = "completed";
    pub const RESCHEDULED: &str = "rescheduled";
}

/// A tenant-scoped appointment record. Never physically deleted; all
/// lifecycle transitions happen through the status field, and only
/// `scheduled` records participate in overlap checks.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Appointment {
    pub id: String,
    pub tenant_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub service_type: String,
    pub notes: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub cancellation_reason: Option<String>,
    pub reschedule_of: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewAppointmentParams {
    pub tenant_id: String,
    pub interval: TimeInterval,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub service_type: String,
    pub notes: Option<String>,
}

impl Appointment {
    pub fn new(params: NewAppointmentParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: params.tenant_id,
            customer_name: params.customer_name,
            customer_phone: params.customer_phone,
            customer_email: params.customer_email,
            service_type: params.service_type,
            notes: params.notes,
            start_time: params.interval.start,
            end_time: params.interval.end,
            status: status::SCHEDULED.to_string(),
            cancellation_reason: None,
            reschedule_of: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// New record replacing `original` at a different time. The original keeps
    /// its interval and moves to `rescheduled` in the same transaction that
    /// inserts this one.
    pub fn replacement_of(original: &Appointment, interval: TimeInterval) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: original.tenant_id.clone(),
            customer_name: original.customer_name.clone(),
            customer_phone: original.customer_phone.clone(),
            customer_email: original.customer_email.clone(),
            service_type: original.service_type.clone(),
            notes: original.notes.clone(),
            start_time: interval.start,
            end_time: interval.end,
            status: status::SCHEDULED.to_string(),
            cancellation_reason: None,
            reschedule_of: Some(original.id.clone()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn interval(&self) -> TimeInterval {
        // start < end is enforced before any record is written
        TimeInterval {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == status::SCHEDULED
    }
}
