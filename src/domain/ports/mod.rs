use crate::domain::models::{
    appointment::Appointment, interval::TimeInterval, schedule::ScheduleConfig, tenant::Tenant,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Result of a conditional write against the appointment store. On conflict
/// only the colliding interval comes back, never the other record.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    Created(Appointment),
    Conflict(TimeInterval),
}

#[derive(Debug, Default, Clone)]
pub struct AppointmentFilter {
    pub status: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn create(&self, tenant: &Tenant) -> Result<Tenant, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, AppError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, AppError>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn upsert(&self, config: &ScheduleConfig) -> Result<ScheduleConfig, AppError>;
    async fn find_by_tenant(&self, tenant_id: &str) -> Result<Option<ScheduleConfig>, AppError>;
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Insert the appointment unless an active appointment of the same tenant
    /// overlaps it. Check and insert run in one storage transaction.
    async fn insert_if_vacant(&self, appointment: &Appointment) -> Result<InsertOutcome, AppError>;

    /// Atomic reschedule: insert `replacement` and move `old` to
    /// `rescheduled`, unless an active appointment other than `old` overlaps
    /// the replacement. On conflict nothing is written.
    async fn reschedule_if_vacant(
        &self,
        old: &Appointment,
        replacement: &Appointment,
    ) -> Result<InsertOutcome, AppError>;

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Appointment>, AppError>;

    /// Active (`scheduled`) appointments whose interval intersects
    /// `[start, end)`, ordered by start time. This is the range-bounded query
    /// availability is built on; there is deliberately no way to fetch a
    /// tenant's full history for overlap checking.
    async fn list_active_in_range(
        &self,
        tenant_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AppError>;

    async fn list_by_tenant(
        &self,
        tenant_id: &str,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, AppError>;

    async fn update_status(
        &self,
        tenant_id: &str,
        id: &str,
        status: &str,
        reason: Option<String>,
    ) -> Result<Appointment, AppError>;
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        attachment_name: Option<&str>,
        attachment_data: Option<&[u8]>,
    ) -> Result<(), AppError>;
}
