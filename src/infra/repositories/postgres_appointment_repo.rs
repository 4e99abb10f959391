use crate::domain::models::appointment::{status, Appointment};
use crate::domain::ports::{AppointmentFilter, AppointmentRepository, InsertOutcome};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresAppointmentRepo {
    pool: PgPool,
}

impl PostgresAppointmentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentRepository for PostgresAppointmentRepo {
    async fn insert_if_vacant(&self, appointment: &Appointment) -> Result<InsertOutcome, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // FOR UPDATE serializes concurrent bookings against the same rows even
        // across processes; the in-process per-tenant lock covers the empty case.
        let conflicting = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE tenant_id = $1 AND status = 'scheduled' AND start_time < $2 AND end_time > $3 ORDER BY start_time ASC LIMIT 1 FOR UPDATE"
        )
            .bind(&appointment.tenant_id).bind(appointment.end_time).bind(appointment.start_time)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        if let Some(taken) = conflicting {
            return Ok(InsertOutcome::Conflict(taken.interval()));
        }

        let created = sqlx::query_as::<_, Appointment>(
            "INSERT INTO appointments (id, tenant_id, customer_name, customer_phone, customer_email, service_type, notes, start_time, end_time, status, cancellation_reason, reschedule_of, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
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
            "SELECT * FROM appointments WHERE tenant_id = $1 AND id != $2 AND status = 'scheduled' AND start_time < $3 AND end_time > $4 ORDER BY start_time ASC LIMIT 1 FOR UPDATE"
        )
            .bind(&replacement.tenant_id).bind(&old.id).bind(replacement.end_time).bind(replacement.start_time)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        if let Some(taken) = conflicting {
            return Ok(InsertOutcome::Conflict(taken.interval()));
        }

        let created = sqlx::query_as::<_, Appointment>(
            "INSERT INTO appointments (id, tenant_id, customer_name, customer_phone, customer_email, service_type, notes, start_time, end_time, status, cancellation_reason, reschedule_of, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING *"
        )
            .bind(&replacement.id).bind(&replacement.tenant_id).bind(&replacement.customer_name).bind(&replacement.customer_phone)
            .bind(&replacement.customer_email).bind(&replacement.service_type).bind(&replacement.notes)
            .bind(replacement.start_time).bind(replacement.end_time).bind(&replacement.status)
            .bind(&replacement.cancellation_reason).bind(&replacement.reschedule_of)
            .bind(replacement.created_at).bind(replacement.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        sqlx::query("UPDATE appointments SET status = $1, updated_at = $2 WHERE id = $3 AND tenant_id = $4")
            .bind(status::RESCHEDULED).bind(Utc::now()).bind(&old.id).bind(&old.tenant_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(InsertOutcome::Created(created))
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_active_in_range(&self, tenant_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE tenant_id = $1 AND status = 'scheduled' AND start_time < $2 AND end_time > $3 ORDER BY start_time ASC"
        )
            .bind(tenant_id).bind(end).bind(start)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_tenant(&self, tenant_id: &str, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppError> {
        let mut sql = String::from("SELECT * FROM appointments WHERE tenant_id = $1");
        let mut idx = 1;
        if filter.status.is_some() { idx += 1; sql.push_str(&format!(" AND status = ${}", idx)); }
        if filter.from.is_some() { idx += 1; sql.push_str(&format!(" AND start_time >= ${}", idx)); }
        if filter.to.is_some() { idx += 1; sql.push_str(&format!(" AND start_time <= ${}", idx)); }
        sql.push_str(&format!(" ORDER BY start_time ASC LIMIT ${} OFFSET ${}", idx + 1, idx + 2));

        let mut query = sqlx::query_as::<_, Appointment>(&sql).bind(tenant_id);
        if let Some(ref status) = filter.status { query = query.bind(status); }
        if let Some(from) = filter.from { query = query.bind(from); }
        if let Some(to) = filter.to { query = query.bind(to); }
        query = query.bind(filter.limit.unwrap_or(100)).bind(filter.offset.unwrap_or(0));

        query.fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_status(&self, tenant_id: &str, id: &str, status: &str, reason: Option<String>) -> Result<Appointment, AppError> {
        sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET status = $1, cancellation_reason = COALESCE($2, cancellation_reason), updated_at = $3
             WHERE tenant_id = $4 AND id = $5
             RETURNING *"
        )
            .bind(status).bind(reason).bind(Utc::now()).bind(tenant_id).bind(id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
