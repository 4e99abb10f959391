use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::UpsertScheduleRequest;
use crate::api::extractors::tenant::TenantId;
use crate::domain::models::schedule::ScheduleConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Tenants without a stored schedule answer with the built-in default hours.
pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
) -> Result<impl IntoResponse, AppError> {
    let config = state
        .schedule_repo
        .find_by_tenant(&tenant_id)
        .await?
        .unwrap_or_else(|| ScheduleConfig::default_for(&tenant_id));

    Ok(Json(config))
}

pub async fn upsert_schedule(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
    Json(payload): Json<UpsertScheduleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let config = ScheduleConfig::new(
        tenant_id.clone(),
        payload.timezone,
        payload.slot_duration_min,
        &payload.hours,
    )?;

    let saved = state.schedule_repo.upsert(&config).await?;
    info!("Schedule updated for tenant {}", tenant_id);

    Ok(Json(saved))
}
