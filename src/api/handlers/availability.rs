use axum::{extract::{Query, State}, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::dtos::{requests::SlotsQuery, responses::SlotsResponse};
use crate::api::extractors::tenant::TenantId;
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_available_slots(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
    Query(query): Query<SlotsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let slots = state
        .appointments
        .available_slots(&tenant_id, query.from, query.to)
        .await?;

    Ok(Json(SlotsResponse {
        from: query.from.to_string(),
        to: query.to.to_string(),
        slots,
    }))
}
