use crate::domain::{models::schedule::ScheduleConfig, ports::ScheduleRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresScheduleRepo {
    pool: PgPool,
}

impl PostgresScheduleRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleRepository for PostgresScheduleRepo {
    async fn upsert(&self, config: &ScheduleConfig) -> Result<ScheduleConfig, AppError> {
        sqlx::query_as::<_, ScheduleConfig>(
            "INSERT INTO schedule_configs (tenant_id, timezone, slot_duration_min, hours_json, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (tenant_id) DO UPDATE SET
                timezone = excluded.timezone,
                slot_duration_min = excluded.slot_duration_min,
                hours_json = excluded.hours_json,
                updated_at = excluded.updated_at
             RETURNING *"
        )
            .bind(&config.tenant_id).bind(&config.timezone).bind(config.slot_duration_min)
            .bind(&config.hours_json).bind(config.created_at).bind(config.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_tenant(&self, tenant_id: &str) -> Result<Option<ScheduleConfig>, AppError> {
        sqlx::query_as::<_, ScheduleConfig>("SELECT * FROM schedule_configs WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
}
