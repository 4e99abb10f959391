#![allow(dead_code)]

use appointment_backend::{
    api::router::create_router,
    config::Config,
    domain::ports::NotificationService,
    domain::services::booking::AppointmentService,
    domain::services::holds::HoldStore,
    error::AppError,
    infra::factory::load_templates,
    infra::repositories::{
        sqlite_appointment_repo::SqliteAppointmentRepo,
        sqlite_schedule_repo::SqliteScheduleRepo,
        sqlite_tenant_repo::SqliteTenantRepo,
    },
    infra::schedule_cache::CachedScheduleRepo,
    state::AppState,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub struct MockNotifier;

#[async_trait]
impl NotificationService for MockNotifier {
    async fn send(
        &self,
        _recipient: &str,
        _subject: &str,
        _html_body: &str,
        _attachment_name: Option<&str>,
        _attachment_data: Option<&[u8]>,
    ) -> Result<(), AppError> {
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_hold_ttl(600).await
    }

    pub async fn with_hold_ttl(hold_ttl_secs: i64) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            schedule_cache_ttl_secs: 300,
            hold_ttl_secs,
            booking_horizon_days: 365,
        };

        let holds = Arc::new(HoldStore::new(config.hold_ttl_secs));
        let schedule_repo = Arc::new(CachedScheduleRepo::new(
            Arc::new(SqliteScheduleRepo::new(pool.clone())),
            config.schedule_cache_ttl_secs,
        ));
        let appointments = Arc::new(AppointmentService::new(
            Arc::new(SqliteAppointmentRepo::new(pool.clone())),
            schedule_repo.clone(),
            holds.clone(),
            Arc::new(MockNotifier),
            load_templates(),
            config.booking_horizon_days,
        ));

        let state = Arc::new(AppState {
            config,
            tenant_repo: Arc::new(SqliteTenantRepo::new(pool.clone())),
            schedule_repo,
            appointments,
            holds,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn post(&self, uri: &str, payload: &Value) -> Response {
        self.send_json("POST", uri, payload).await
    }

    pub async fn put(&self, uri: &str, payload: &Value) -> Response {
        self.send_json("PUT", uri, payload).await
    }

    pub async fn put_empty(&self, uri: &str) -> Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn delete(&self, uri: &str) -> Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn send_json(&self, method: &str, uri: &str, payload: &Value) -> Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn create_tenant(&self, slug: &str) -> String {
        let res = self
            .post(
                "/api/v1/tenants",
                &serde_json::json!({ "name": "Test Tenant", "slug": slug }),
            )
            .await;
        assert!(res.status().is_success(), "tenant creation failed in test helper");
        parse_body(res).await["tenant_id"].as_str().unwrap().to_string()
    }

    /// Stores a schedule with the same single window on all seven days, so
    /// tests can pick any future date without caring about weekdays.
    pub async fn put_uniform_schedule(
        &self,
        tenant_id: &str,
        timezone: &str,
        slot_duration_min: i32,
        window_start: &str,
        window_end: &str,
    ) {
        let window = serde_json::json!([{ "start": window_start, "end": window_end }]);
        let payload = serde_json::json!({
            "timezone": timezone,
            "slot_duration_min": slot_duration_min,
            "hours": {
                "monday": window, "tuesday": window, "wednesday": window,
                "thursday": window, "friday": window, "saturday": window,
                "sunday": window
            }
        });
        let res = self
            .put(&format!("/api/v1/{}/schedule", tenant_id), &payload)
            .await;
        assert!(res.status().is_success(), "schedule upsert failed in test helper");
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}

pub async fn parse_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
