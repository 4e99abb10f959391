use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::models::interval::TimeInterval;

/// Advisory hold on a slot while a caller confirms with the customer, e.g.
/// mid phone call. Holds are process-local and expire after a fixed TTL; a
/// background reaper sweeps leftovers that were never released.
#[derive(Debug, Clone, Serialize)]
pub struct SlotHold {
    pub id: String,
    pub tenant_id: String,
    pub interval: TimeInterval,
    pub customer_name: String,
    pub customer_phone: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub struct HoldStore {
    holds: DashMap<String, SlotHold>,
    ttl: Duration,
}

impl HoldStore {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            holds: DashMap::new(),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub fn place(
        &self,
        tenant_id: &str,
        interval: TimeInterval,
        customer_name: String,
        customer_phone: String,
    ) -> SlotHold {
        let now = Utc::now();
        let hold = SlotHold {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            interval,
            customer_name,
            customer_phone,
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.holds.insert(hold.id.clone(), hold.clone());
        hold
    }

    /// Idempotent: releasing an unknown or expired hold is not an error.
    pub fn release(&self, hold_id: &str) -> bool {
        self.holds.remove(hold_id).is_some()
    }

    pub fn get(&self, hold_id: &str, now: DateTime<Utc>) -> Option<SlotHold> {
        self.holds
            .get(hold_id)
            .filter(|h| h.expires_at > now)
            .map(|h| h.clone())
    }

    /// Earliest active hold of this tenant overlapping `interval`, skipping
    /// `exempt` (the caller's own hold when converting it into a booking).
    pub fn blocking_interval(
        &self,
        tenant_id: &str,
        interval: &TimeInterval,
        exempt: Option<&str>,
        now: DateTime<Utc>,
    ) -> Option<TimeInterval> {
        self.holds
            .iter()
            .filter(|h| h.tenant_id == tenant_id && h.expires_at > now)
            .filter(|h| exempt != Some(h.id.as_str()))
            .filter(|h| h.interval.overlaps(interval))
            .map(|h| h.interval)
            .min_by_key(|iv| iv.start)
    }

    pub fn active_for_tenant(&self, tenant_id: &str, now: DateTime<Utc>) -> Vec<TimeInterval> {
        self.holds
            .iter()
            .filter(|h| h.tenant_id == tenant_id && h.expires_at > now)
            .map(|h| h.interval)
            .collect()
    }

    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.holds.len();
        self.holds.retain(|_, h| h.expires_at > now);
        before - self.holds.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn iv(start_h: u32, end_h: u32) -> TimeInterval {
        TimeInterval::new(
            Utc.with_ymd_and_hms(2026, 3, 2, start_h, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 2, end_h, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn active_hold_blocks_overlap_but_not_other_tenants() {
        let store = HoldStore::new(600);
        let hold = store.place("t1", iv(9, 10), "Ada".into(), "+111".into());

        let now = Utc::now();
        assert!(store.blocking_interval("t1", &iv(9, 10), None, now).is_some());
        assert!(store.blocking_interval("t2", &iv(9, 10), None, now).is_none());
        assert!(store
            .blocking_interval("t1", &iv(9, 10), Some(&hold.id), now)
            .is_none());
    }

    #[test]
    fn release_is_idempotent() {
        let store = HoldStore::new(600);
        let hold = store.place("t1", iv(9, 10), "Ada".into(), "+111".into());
        assert!(store.release(&hold.id));
        assert!(!store.release(&hold.id));
    }

    #[test]
    fn expired_holds_are_invisible_and_swept() {
        let store = HoldStore::new(0);
        let hold = store.place("t1", iv(9, 10), "Ada".into(), "+111".into());

        let later = Utc::now() + Duration::seconds(1);
        assert!(store.get(&hold.id, later).is_none());
        assert!(store.blocking_interval("t1", &iv(9, 10), None, later).is_none());
        assert_eq!(store.sweep_expired(later), 1);
        assert_eq!(store.sweep_expired(later), 0);
    }
}
