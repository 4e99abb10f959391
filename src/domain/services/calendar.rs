use crate::domain::models::appointment::Appointment;
use icalendar::{Calendar, Component, Event as IcalEvent, EventLike};

/// Generates an iCalendar (.ics) string for a confirmed appointment
pub fn generate_ics(appointment: &Appointment) -> String {
    let mut calendar = Calendar::new();

    let ical_event = IcalEvent::new()
        .summary(&appointment.service_type)
        .description(appointment.notes.as_deref().unwrap_or(""))
        .starts(appointment.start_time)
        .ends(appointment.end_time)
        .uid(&appointment.id)
        .done();

    calendar.push(ical_event);
    calendar.to_string()
}
