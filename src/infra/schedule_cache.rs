use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::domain::models::schedule::ScheduleConfig;
use crate::domain::ports::ScheduleRepository;
use crate::error::AppError;

/// Read-through cache in front of a schedule repository. Availability hits
/// the schedule config on every request; configs change rarely, so entries
/// live for a fixed TTL and writes invalidate eagerly.
pub struct CachedScheduleRepo {
    inner: Arc<dyn ScheduleRepository>,
    entries: DashMap<String, (Option<ScheduleConfig>, Instant)>,
    ttl: Duration,
}

impl CachedScheduleRepo {
    pub fn new(inner: Arc<dyn ScheduleRepository>, ttl_secs: u64) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
            ttl: Duration::from_secs(ttl_secs),
        }
    }
}

#[async_trait]
impl ScheduleRepository for CachedScheduleRepo {
    async fn upsert(&self, config: &ScheduleConfig) -> Result<ScheduleConfig, AppError> {
        let saved = self.inner.upsert(config).await?;
        self.entries.remove(&saved.tenant_id);
        Ok(saved)
    }

    async fn find_by_tenant(&self, tenant_id: &str) -> Result<Option<ScheduleConfig>, AppError> {
        if let Some(entry) = self.entries.get(tenant_id) {
            let (cached, stored_at) = entry.value();
            if stored_at.elapsed() < self.ttl {
                debug!("Schedule cache hit for tenant {}", tenant_id);
                return Ok(cached.clone());
            }
        }

        let fresh = self.inner.find_by_tenant(tenant_id).await?;
        self.entries
            .insert(tenant_id.to_string(), (fresh.clone(), Instant::now()));
        Ok(fresh)
    }
}
