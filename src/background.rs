use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tokio::time::sleep;
use tracing::{debug, info};
use crate::state::AppState;

/// Sweeps expired slot holds that were placed but never released or
/// converted into an appointment.
pub async fn start_hold_reaper(state: Arc<AppState>) {
    info!("Starting slot hold reaper...");

    loop {
        let swept = state.holds.sweep_expired(Utc::now());
        if swept > 0 {
            info!("Reaped {} expired slot holds", swept);
        } else {
            debug!("No expired slot holds to reap");
        }
        sleep(Duration::from_secs(30)).await;
    }
}
