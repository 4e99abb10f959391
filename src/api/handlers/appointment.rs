use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::dtos::requests::{
    CancelAppointmentRequest, CreateAppointmentRequest, ListAppointmentsQuery,
    RescheduleAppointmentRequest, UpcomingQuery,
};
use crate::api::extractors::tenant::TenantId;
use crate::domain::ports::AppointmentFilter;
use crate::domain::services::booking::NewBookingRequest;
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
    Json(payload): Json<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.customer_name.trim().is_empty() {
        return Err(AppError::Validation("customer_name must not be empty".into()));
    }
    if payload.customer_phone.trim().is_empty() {
        return Err(AppError::Validation("customer_phone must not be empty".into()));
    }

    let created = state
        .appointments
        .create(
            &tenant_id,
            NewBookingRequest {
                start_time: payload.start_time,
                end_time: payload.end_time,
                customer_name: payload.customer_name,
                customer_phone: payload.customer_phone,
                customer_email: payload.customer_email,
                service_type: payload.service_type,
                notes: payload.notes,
                hold_id: payload.hold_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
    Query(query): Query<ListAppointmentsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = AppointmentFilter {
        status: query.status,
        from: query.from,
        to: query.to,
        limit: query.limit,
        offset: query.offset,
    };
    let appointments = state.appointments.list(&tenant_id, &filter).await?;
    Ok(Json(appointments))
}

pub async fn upcoming_appointments(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
    Query(query): Query<UpcomingQuery>,
) -> Result<impl IntoResponse, AppError> {
    let days = query.days.unwrap_or(7);
    if days <= 0 {
        return Err(AppError::Validation("days must be positive".into()));
    }
    let appointments = state.appointments.upcoming(&tenant_id, days).await?;
    Ok(Json(appointments))
}

pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
    Path((_, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = state.appointments.find(&tenant_id, &id).await?;
    Ok(Json(appointment))
}

pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
    Path((_, id)): Path<(String, String)>,
    payload: Option<Json<CancelAppointmentRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let reason = payload.and_then(|Json(p)| p.reason);
    let cancelled = state.appointments.cancel(&tenant_id, &id, reason).await?;
    Ok(Json(cancelled))
}

pub async fn reschedule_appointment(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
    Path((_, id)): Path<(String, String)>,
    Json(payload): Json<RescheduleAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let replacement = state
        .appointments
        .reschedule(&tenant_id, &id, payload.start_time, payload.end_time)
        .await?;
    Ok(Json(replacement))
}

pub async fn complete_appointment(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
    Path((_, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let completed = state.appointments.complete(&tenant_id, &id).await?;
    Ok(Json(completed))
}
