//! Appointment lists as the screens show them.
//!
//! The backend returns raw appointment lists; these helpers do the
//! per-viewer filtering, day bucketing and totals that the staff agenda and
//! the client's "my appointments" tab need.

use chrono::{FixedOffset, NaiveDate};

use crate::models::{Appointment, AppointmentStatus, Profile, Role, ServiceRef};

/// Count and revenue of the appointments that still count for the day.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AgendaSummary {
    pub count: usize,
    pub revenue: f64,
}

/// One day of a professional's (or the whole shop's) schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct DayAgenda {
    pub date: NaiveDate,
    /// Sorted by start time
    pub appointments: Vec<Appointment>,
    /// Excludes cancelled appointments
    pub summary: AgendaSummary,
}

/// Value of an appointment: the backend total when present, otherwise the
/// sum over populated services.
pub fn appointment_value(appointment: &Appointment) -> f64 {
    if let Some(total) = appointment.total {
        return total;
    }
    appointment
        .services
        .iter()
        .map(|line| match &line.service {
            ServiceRef::Populated(service) => service.price * f64::from(line.quantity),
            ServiceRef::Id(_) => 0.0,
        })
        .sum()
}

fn visible_to(appointment: &Appointment, viewer: &Profile) -> bool {
    match viewer.role {
        Role::Admin => true,
        Role::Staff => appointment.professional.id() == viewer.id,
        Role::Client => appointment.client.id() == viewer.id,
    }
}

/// Appointments on `date` (shop local time) that `viewer` may see.
///
/// Admins see the whole shop, barbers their own chair.
pub fn day_agenda(
    appointments: &[Appointment],
    viewer: &Profile,
    date: NaiveDate,
    offset: FixedOffset,
) -> DayAgenda {
    let mut day: Vec<Appointment> = appointments
        .iter()
        .filter(|a| visible_to(a, viewer))
        .filter(|a| a.scheduled_at.with_timezone(&offset).date_naive() == date)
        .cloned()
        .collect();
    day.sort_by_key(|a| a.scheduled_at);

    let summary = day
        .iter()
        .filter(|a| a.status != AppointmentStatus::Cancelled)
        .fold(AgendaSummary::default(), |acc, a| AgendaSummary {
            count: acc.count + 1,
            revenue: acc.revenue + appointment_value(a),
        });

    DayAgenda {
        date,
        appointments: day,
        summary,
    }
}

/// A client's appointments without the cancelled ones, oldest first.
pub fn upcoming_for_client(appointments: Vec<Appointment>) -> Vec<Appointment> {
    let mut kept: Vec<Appointment> = appointments
        .into_iter()
        .filter(|a| a.status != AppointmentStatus::Cancelled)
        .collect();
    kept.sort_by_key(|a| a.scheduled_at);
    kept
}
