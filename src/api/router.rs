use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{appointment, availability, health, hold, schedule, tenant};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Tenants
        .route("/api/v1/tenants", post(tenant::create_tenant))
        .route("/api/v1/tenants/by-slug/{slug}", get(tenant::get_tenant_by_slug))

        // Schedule config
        .route("/api/v1/{tenant_id}/schedule", get(schedule::get_schedule).put(schedule::upsert_schedule))

        // Availability
        .route("/api/v1/{tenant_id}/available-slots", get(availability::get_available_slots))

        // Slot holds
        .route("/api/v1/{tenant_id}/holds", post(hold::create_hold))
        .route("/api/v1/{tenant_id}/holds/{hold_id}", delete(hold::release_hold))

        // Appointments
        .route("/api/v1/{tenant_id}/appointments", post(appointment::create_appointment).get(appointment::list_appointments))
        .route("/api/v1/{tenant_id}/appointments/upcoming", get(appointment::upcoming_appointments))
        .route("/api/v1/{tenant_id}/appointments/{id}", get(appointment::get_appointment))
        .route("/api/v1/{tenant_id}/appointments/{id}/cancel", put(appointment::cancel_appointment))
        .route("/api/v1/{tenant_id}/appointments/{id}/reschedule", put(appointment::reschedule_appointment))
        .route("/api/v1/{tenant_id}/appointments/{id}/complete", put(appointment::complete_appointment))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        tenant_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
