use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::{requests::CreateHoldRequest, responses::HoldResponse};
use crate::api::extractors::tenant::TenantId;
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_hold(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
    Json(payload): Json<CreateHoldRequest>,
) -> Result<impl IntoResponse, AppError> {
    let hold = state
        .appointments
        .place_hold(
            &tenant_id,
            payload.start_time,
            payload.end_time,
            payload.customer_name,
            payload.customer_phone,
        )
        .await?;

    info!("Hold placed: {} for tenant {}", hold.id, tenant_id);

    Ok((
        StatusCode::CREATED,
        Json(HoldResponse {
            hold_id: hold.id,
            start_time: hold.interval.start,
            end_time: hold.interval.end,
            expires_at: hold.expires_at,
        }),
    ))
}

/// Releasing an unknown or already-expired hold still answers 204.
pub async fn release_hold(
    State(state): State<Arc<AppState>>,
    TenantId(_tenant_id): TenantId,
    Path((_, hold_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.appointments.release_hold(&hold_id);
    Ok(StatusCode::NO_CONTENT)
}
