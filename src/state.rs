use std::sync::Arc;
use crate::config::Config;
use crate::domain::ports::{ScheduleRepository, TenantRepository};
use crate::domain::services::booking::AppointmentService;
use crate::domain::services::holds::HoldStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub tenant_repo: Arc<dyn TenantRepository>,
    pub schedule_repo: Arc<dyn ScheduleRepository>,
    pub appointments: Arc<AppointmentService>,
    pub holds: Arc<HoldStore>,
}
