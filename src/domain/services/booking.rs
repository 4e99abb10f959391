use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use dashmap::DashMap;
use tera::Tera;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::models::appointment::{status, Appointment, NewAppointmentParams};
use crate::domain::models::interval::TimeInterval;
use crate::domain::models::schedule::ScheduleConfig;
use crate::domain::ports::{
    AppointmentFilter, AppointmentRepository, InsertOutcome, NotificationService,
    ScheduleRepository,
};
use crate::domain::services::availability::{filter_available, BusySet};
use crate::domain::services::calendar::generate_ics;
use crate::domain::services::holds::{HoldStore, SlotHold};
use crate::domain::services::slots::SlotGenerator;
use crate::error::AppError;

pub struct NewBookingRequest {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub service_type: String,
    pub notes: Option<String>,
    pub hold_id: Option<String>,
}

/// Owns every mutation of the tenant appointment set. Booking attempts run
/// Proposed -> Validated -> Committed | Rejected: validation is fully local
/// and happens before any I/O, and the commit is guarded per tenant by an
/// async lock around the repository's transactional check-and-insert, so two
/// concurrent bookings for overlapping intervals can never both commit.
pub struct AppointmentService {
    appointments: Arc<dyn AppointmentRepository>,
    schedules: Arc<dyn ScheduleRepository>,
    holds: Arc<HoldStore>,
    notifier: Arc<dyn NotificationService>,
    templates: Arc<Tera>,
    tenant_locks: DashMap<String, Arc<Mutex<()>>>,
    booking_horizon: Duration,
}

impl AppointmentService {
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        schedules: Arc<dyn ScheduleRepository>,
        holds: Arc<HoldStore>,
        notifier: Arc<dyn NotificationService>,
        templates: Arc<Tera>,
        booking_horizon_days: i64,
    ) -> Self {
        Self {
            appointments,
            schedules,
            holds,
            notifier,
            templates,
            tenant_locks: DashMap::new(),
            booking_horizon: Duration::days(booking_horizon_days),
        }
    }

    fn lock_for(&self, tenant_id: &str) -> Arc<Mutex<()>> {
        self.tenant_locks
            .entry(tenant_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn schedule_for(&self, tenant_id: &str) -> Result<ScheduleConfig, AppError> {
        Ok(self
            .schedules
            .find_by_tenant(tenant_id)
            .await?
            .unwrap_or_else(|| ScheduleConfig::default_for(tenant_id)))
    }

    /// Proposed -> Validated. Local checks only, no storage involved.
    fn validate_interval(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TimeInterval, AppError> {
        let interval = TimeInterval::new(start, end)?;
        let now = Utc::now();
        if interval.start < now {
            return Err(AppError::InvalidInterval(
                "start_time must not be in the past".into(),
            ));
        }
        if interval.start > now + self.booking_horizon {
            return Err(AppError::InvalidInterval(format!(
                "start_time is beyond the booking horizon of {} days",
                self.booking_horizon.num_days()
            )));
        }
        Ok(interval)
    }

    pub async fn available_slots(
        &self,
        tenant_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TimeInterval>, AppError> {
        let config = self.schedule_for(tenant_id).await?;
        let generator = SlotGenerator::new(&config, from, to)?;

        let (range_start, range_end) = local_day_bounds(config.tz(), from, to)?;
        let existing = self
            .appointments
            .list_active_in_range(tenant_id, range_start, range_end)
            .await?;

        let now = Utc::now();
        let mut busy: Vec<TimeInterval> = existing.iter().map(|a| a.interval()).collect();
        busy.extend(self.holds.active_for_tenant(tenant_id, now));
        let busy = BusySet::new(busy);

        Ok(filter_available(
            generator.filter(|slot| slot.start >= now),
            &busy,
        ))
    }

    pub async fn create(
        &self,
        tenant_id: &str,
        request: NewBookingRequest,
    ) -> Result<Appointment, AppError> {
        let interval = self.validate_interval(request.start_time, request.end_time)?;

        let lock = self.lock_for(tenant_id);
        let _guard = lock.lock().await;

        let now = Utc::now();
        let exempt_hold = match request.hold_id.as_deref() {
            Some(hold_id) => {
                let hold = self
                    .holds
                    .get(hold_id, now)
                    .ok_or_else(|| AppError::NotFound("Hold not found or expired".into()))?;
                if hold.tenant_id != tenant_id {
                    return Err(AppError::Validation("Hold belongs to a different tenant".into()));
                }
                Some(hold.id)
            }
            None => None,
        };

        if let Some(held) =
            self.holds
                .blocking_interval(tenant_id, &interval, exempt_hold.as_deref(), now)
        {
            return Err(AppError::SlotConflict { start: held.start, end: held.end });
        }

        let appointment = Appointment::new(NewAppointmentParams {
            tenant_id: tenant_id.to_string(),
            interval,
            customer_name: request.customer_name,
            customer_phone: request.customer_phone,
            customer_email: request.customer_email,
            service_type: request.service_type,
            notes: request.notes,
        });

        match self.appointments.insert_if_vacant(&appointment).await? {
            InsertOutcome::Created(created) => {
                if let Some(hold_id) = exempt_hold {
                    self.holds.release(&hold_id);
                }
                info!("Appointment committed: {} for tenant {}", created.id, tenant_id);
                self.notify(&created, "confirmation.html", "Your appointment is confirmed", None)
                    .await;
                Ok(created)
            }
            InsertOutcome::Conflict(taken) => {
                Err(AppError::SlotConflict { start: taken.start, end: taken.end })
            }
        }
    }

    /// Idempotent: cancelling an already-cancelled appointment returns the
    /// record unchanged.
    pub async fn cancel(
        &self,
        tenant_id: &str,
        id: &str,
        reason: Option<String>,
    ) -> Result<Appointment, AppError> {
        let lock = self.lock_for(tenant_id);
        let _guard = lock.lock().await;

        let existing = self
            .appointments
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Appointment not found".into()))?;

        match existing.status.as_str() {
            status::CANCELLED => return Ok(existing),
            status::SCHEDULED => {}
            other => {
                return Err(AppError::Validation(format!(
                    "cannot cancel a {} appointment", other
                )))
            }
        }

        let cancelled = self
            .appointments
            .update_status(tenant_id, id, status::CANCELLED, reason)
            .await?;
        info!("Appointment cancelled: {}", cancelled.id);

        let reason = cancelled.cancellation_reason.clone();
        self.notify(&cancelled, "cancellation.html", "Your appointment was cancelled", reason)
            .await;
        Ok(cancelled)
    }

    pub async fn complete(&self, tenant_id: &str, id: &str) -> Result<Appointment, AppError> {
        let lock = self.lock_for(tenant_id);
        let _guard = lock.lock().await;

        let existing = self
            .appointments
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Appointment not found".into()))?;

        if existing.status != status::SCHEDULED {
            return Err(AppError::Validation(format!(
                "cannot complete a {} appointment", existing.status
            )));
        }

        let completed = self
            .appointments
            .update_status(tenant_id, id, status::COMPLETED, None)
            .await?;
        info!("Appointment completed: {}", completed.id);
        Ok(completed)
    }

    /// Atomic cancel-old + create-new. The repository writes both records in
    /// one transaction, so a conflict on the new interval leaves the original
    /// appointment untouched.
    pub async fn reschedule(
        &self,
        tenant_id: &str,
        id: &str,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
    ) -> Result<Appointment, AppError> {
        let interval = self.validate_interval(new_start, new_end)?;

        let lock = self.lock_for(tenant_id);
        let _guard = lock.lock().await;

        let existing = self
            .appointments
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Appointment not found".into()))?;

        if existing.status != status::SCHEDULED {
            return Err(AppError::Validation(format!(
                "cannot reschedule a {} appointment", existing.status
            )));
        }

        let now = Utc::now();
        if let Some(held) = self.holds.blocking_interval(tenant_id, &interval, None, now) {
            return Err(AppError::SlotConflict { start: held.start, end: held.end });
        }

        let replacement = Appointment::replacement_of(&existing, interval);
        match self
            .appointments
            .reschedule_if_vacant(&existing, &replacement)
            .await?
        {
            InsertOutcome::Created(created) => {
                info!(
                    "Appointment rescheduled: {} -> {} for tenant {}",
                    existing.id, created.id, tenant_id
                );
                self.notify(&created, "reschedule.html", "Your appointment was rescheduled", None)
                    .await;
                Ok(created)
            }
            InsertOutcome::Conflict(taken) => {
                Err(AppError::SlotConflict { start: taken.start, end: taken.end })
            }
        }
    }

    pub async fn find(&self, tenant_id: &str, id: &str) -> Result<Appointment, AppError> {
        self.appointments
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Appointment not found".into()))
    }

    pub async fn list(
        &self,
        tenant_id: &str,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, AppError> {
        self.appointments.list_by_tenant(tenant_id, filter).await
    }

    pub async fn upcoming(
        &self,
        tenant_id: &str,
        days_ahead: i64,
    ) -> Result<Vec<Appointment>, AppError> {
        let now = Utc::now();
        let filter = AppointmentFilter {
            status: Some(status::SCHEDULED.to_string()),
            from: Some(now),
            to: Some(now + Duration::days(days_ahead)),
            ..Default::default()
        };
        self.appointments.list_by_tenant(tenant_id, &filter).await
    }

    pub async fn place_hold(
        &self,
        tenant_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        customer_name: String,
        customer_phone: String,
    ) -> Result<SlotHold, AppError> {
        let interval = self.validate_interval(start, end)?;

        let lock = self.lock_for(tenant_id);
        let _guard = lock.lock().await;

        let now = Utc::now();
        if let Some(held) = self.holds.blocking_interval(tenant_id, &interval, None, now) {
            return Err(AppError::SlotConflict { start: held.start, end: held.end });
        }

        let existing = self
            .appointments
            .list_active_in_range(tenant_id, interval.start, interval.end)
            .await?;
        if let Some(taken) = existing.first() {
            return Err(AppError::SlotConflict {
                start: taken.start_time,
                end: taken.end_time,
            });
        }

        Ok(self.holds.place(tenant_id, interval, customer_name, customer_phone))
    }

    pub fn release_hold(&self, hold_id: &str) -> bool {
        self.holds.release(hold_id)
    }

    /// Fire-and-forget notification. A delivery failure must never undo a
    /// committed appointment, so errors are logged and swallowed.
    async fn notify(
        &self,
        appointment: &Appointment,
        template: &'static str,
        subject: &'static str,
        reason: Option<String>,
    ) {
        let Some(recipient) = appointment.customer_email.clone() else {
            return;
        };

        let tz = match self.schedule_for(&appointment.tenant_id).await {
            Ok(config) => config.tz(),
            Err(_) => chrono_tz::UTC,
        };

        let mut context = tera::Context::new();
        context.insert("customer_name", &appointment.customer_name);
        context.insert("service_type", &appointment.service_type);
        context.insert(
            "start_local",
            &appointment.start_time.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string(),
        );
        context.insert(
            "end_local",
            &appointment.end_time.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string(),
        );
        context.insert("timezone", &tz.name());
        context.insert("reason", &reason);

        let ics = if template == "confirmation.html" {
            Some(generate_ics(appointment))
        } else {
            None
        };

        let notifier = self.notifier.clone();
        let templates = self.templates.clone();
        let appointment_id = appointment.id.clone();
        tokio::spawn(async move {
            let html = match templates.render(template, &context) {
                Ok(html) => html,
                Err(e) => {
                    warn!("Failed to render {} for {}: {:?}", template, appointment_id, e);
                    return;
                }
            };
            let attachment = ics.as_ref().map(|s| s.as_bytes());
            if let Err(e) = notifier
                .send(
                    &recipient,
                    subject,
                    &html,
                    ics.as_ref().map(|_| "appointment.ics"),
                    attachment,
                )
                .await
            {
                warn!("Notification delivery failed for {}: {}", appointment_id, e);
            }
        });
    }
}

/// UTC bounds of the tenant-local days `[from 00:00:00, to 23:59:59]`.
pub fn local_day_bounds(
    tz: Tz,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let start_naive = from
        .and_hms_opt(0, 0, 0)
        .ok_or(AppError::Validation("invalid from date".into()))?;
    let end_naive = to
        .and_hms_opt(23, 59, 59)
        .ok_or(AppError::Validation("invalid to date".into()))?;

    // earliest/latest cover midnight DST transitions
    let start = tz
        .from_local_datetime(&start_naive)
        .earliest()
        .ok_or(AppError::Validation("from date has no valid local midnight".into()))?;
    let end = tz
        .from_local_datetime(&end_naive)
        .latest()
        .ok_or(AppError::Validation("to date has no valid local end".into()))?;

    Ok((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}
