use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Slot conflict: requested time collides with an appointment between {start} and {end}")]
    SlotConflict { start: DateTime<Utc>, end: DateTime<Utc> },
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),
    #[error("Invalid schedule configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Upstream service unavailable: {0}")]
    Upstream(String),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::SlotConflict { start, end } => {
                // Only the colliding boundaries go out, never the other
                // appointment's identity or customer data.
                return (
                    StatusCode::CONFLICT,
                    Json(json!({
                        "error": "slot_conflict",
                        "conflict_start": start.to_rfc3339(),
                        "conflict_end": end.to_rfc3339(),
                    })),
                ).into_response();
            }
            AppError::InvalidInterval(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidConfiguration(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Upstream(msg) => {
                error!("Upstream failure: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Upstream service unavailable".to_string())
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
