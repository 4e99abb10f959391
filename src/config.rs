use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub mail_service_url: String,
    pub mail_service_token: String,
    pub schedule_cache_ttl_secs: u64,
    pub hold_ttl_secs: i64,
    pub booking_horizon_days: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            mail_service_url: env::var("MAIL_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/send".to_string()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            schedule_cache_ttl_secs: env::var("SCHEDULE_CACHE_TTL_SECS").unwrap_or_else(|_| "300".to_string()).parse().expect("SCHEDULE_CACHE_TTL_SECS must be a number"),
            hold_ttl_secs: env::var("HOLD_TTL_SECS").unwrap_or_else(|_| "600".to_string()).parse().expect("HOLD_TTL_SECS must be a number"),
            booking_horizon_days: env::var("BOOKING_HORIZON_DAYS").unwrap_or_else(|_| "365".to_string()).parse().expect("BOOKING_HORIZON_DAYS must be a number"),
        }
    }
}
