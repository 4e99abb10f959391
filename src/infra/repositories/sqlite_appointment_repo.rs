use crate::domain::models::appointment::{status, Appointment};
use crate::domain::ports::{AppointmentFilter, AppointmentRepository, InsertOutcome};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteAppointmentRepo {
    pool: SqlitePool,
}

impl SqliteAppointmentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentRepository for SqliteAppointmentRepo {
    async fn insert_if_vacant(&self, appointment: &Appointment) -> Result<InsertOutcome, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let conflicting = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE tenant_id = ? AND status = 'scheduled' AND start_time < ? AND end_time > ? ORDER BY start_time ASC LIMIT 1"
        )
            .bind(&appointment.tenant_id).bind(appointment.end_time).bind(appointment.start_time)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        if let Some(taken) = conflicting {
            return Ok(InsertOutcome::Conflict(taken.interval()));
        }

        let created = sqlx::query_as::<_, Appointment>(
            "INSERT INTO appointments (id, tenant_id, customer_name, customer_phone, customer_email, service_type, notes, start_time, end_time, status, cancellation_reason, reschedule_of, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&appointment.id).bind(&appointment.tenant_id).bind(&appointment.customer_name).bind(&appointment.customer_phone)
            .bind(&appointment.customer_email).bind(&appointment.service_type).bind(&appointment.notes)
            .bind(appointment.start_time).bind(appointment.end_time).bind(&appointment.status)
            .bind(&appointment.cancellation_reason).bind(&appointment.reschedule_of)
            .bind(appointment.created_at).bind(appointment.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(InsertOutcome::Created(created))
    }

    async fn reschedule_if_vacant(&self, old: &Appointment, replacement: &Appointment) -> Result<InsertOutcome, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let conflicting = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE tenant_id = ? AND id != ? AND status = 'scheduled' AND start_time < ? AND end_time > ? ORDER BY start_time ASC LIMIT 1"
        )
            .bind(&replacement.tenant_id).bind(&old.id).bind(replacement.end_time).bind(replacement.start_time)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        if let Some(taken) = conflicting {
            return Ok(InsertOutcome::Conflict(taken.interval()));
        }

        let created = sqlx::query_as::<_, Appointment>(
            "INSERT INTO appointments (id, tenant_id, customer_name, customer_phone, customer_email, service_type, notes, start_time, end_time, status, cancellation_reason, reschedule_of, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&replacement.id).bind(&replacement.tenant_id).bind(&replacement.customer_name).bind(&replacement.customer_phone)
            .bind(&replacement.customer_email).bind(&replacement.service_type).bind(&replacement.notes)
            .bind(replacement.start_time).bind(replacement.end_time).bind(&replacement.status)
            .bind(&replacement.cancellation_reason).bind(&replacement.reschedule_of)
            .bind(replacement.created_at).bind(replacement.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        sqlx::query("UPDATE appointments SET status = ?, updated_at = ? WHERE id = ? AND tenant_id = ?")
            .bind(status::RESCHEDULED).bind(Utc::now()).bind(&old.id).bind(&old.tenant_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(InsertOutcome::Created(created))
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_active_in_range(&self, tenant_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE tenant_id = ? AND status = 'scheduled' AND start_time < ? AND end_time > ? ORDER BY start_time ASC"
        )
            .bind(tenant_id).bind(end).bind(start)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_tenant(&self, tenant_id: &str, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppError> {
        let mut sql = String::from("SELECT * FROM appointments WHERE tenant_id = ?");
        if filter.status.is_some() { sql.push_str(" AND status = ?"); }
        if filter.from.is_some() { sql.push_str(" AND start_time >= ?"); }
        if filter.to.is_some() { sql.push_str(" AND start_time <= ?"); }
        sql.push_str(" ORDER BY start_time ASC LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, Appointment>(&sql).bind(tenant_id);
        if let Some(ref status) = filter.status { query = query.bind(status); }
        if let Some(from) = filter.from { query = query.bind(from); }
        if let Some(to) = filter.to { query = query.bind(to); }
        query = query.bind(filter.limit.unwrap_or(100)).bind(filter.offset.unwrap_or(0));

        query.fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_status(&self, tenant_id: &str, id: &str, status: &str, reason: Option<String>) -> Result<Appointment, AppError> {
        sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET status = ?, cancellation_reason = COALESCE(?, cancellation_reason), updated_at = ?
             WHERE tenant_id = ? AND id = ?
             RETURNING *"
        )
            .bind(status).bind(reason).bind(Utc::now()).bind(tenant_id).bind(id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
