use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;
use tera::Tera;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::services::booking::AppointmentService;
use crate::domain::services::holds::HoldStore;
use crate::infra::email::http_email_service::HttpEmailService;
use crate::infra::schedule_cache::CachedScheduleRepo;
use crate::infra::repositories::{
    postgres_appointment_repo::PostgresAppointmentRepo,
    postgres_schedule_repo::PostgresScheduleRepo,
    postgres_tenant_repo::PostgresTenantRepo,
    sqlite_appointment_repo::SqliteAppointmentRepo,
    sqlite_schedule_repo::SqliteScheduleRepo,
    sqlite_tenant_repo::SqliteTenantRepo,
};

pub fn load_templates() -> Arc<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_template("confirmation.html", include_str!("../templates/confirmation.html"))
        .expect("Failed to load confirmation template");
    tera.add_raw_template("cancellation.html", include_str!("../templates/cancellation.html"))
        .expect("Failed to load cancellation template");
    tera.add_raw_template("reschedule.html", include_str!("../templates/reschedule.html"))
        .expect("Failed to load reschedule template");
    Arc::new(tera)
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;
    let notifier = Arc::new(HttpEmailService::new(
        config.mail_service_url.clone(),
        config.mail_service_token.clone(),
    ));

    let templates = load_templates();
    let holds = Arc::new(HoldStore::new(config.hold_ttl_secs));

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let tenant_repo = Arc::new(PostgresTenantRepo::new(pool.clone()));
        let schedule_repo = Arc::new(CachedScheduleRepo::new(
            Arc::new(PostgresScheduleRepo::new(pool.clone())),
            config.schedule_cache_ttl_secs,
        ));
        let appointment_repo = Arc::new(PostgresAppointmentRepo::new(pool.clone()));
        let appointments = Arc::new(AppointmentService::new(
            appointment_repo,
            schedule_repo.clone(),
            holds.clone(),
            notifier,
            templates,
            config.booking_horizon_days,
        ));

        AppState {
            config: config.clone(),
            tenant_repo,
            schedule_repo,
            appointments,
            holds,
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        let tenant_repo = Arc::new(SqliteTenantRepo::new(pool.clone()));
        let schedule_repo = Arc::new(CachedScheduleRepo::new(
            Arc::new(SqliteScheduleRepo::new(pool.clone())),
            config.schedule_cache_ttl_secs,
        ));
        let appointment_repo = Arc::new(SqliteAppointmentRepo::new(pool.clone()));
        let appointments = Arc::new(AppointmentService::new(
            appointment_repo,
            schedule_repo.clone(),
            holds.clone(),
            notifier,
            templates,
            config.booking_horizon_days,
        ));

        AppState {
            config: config.clone(),
            tenant_repo,
            schedule_repo,
            appointments,
            holds,
        }
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
