//! Booking wizard.
//!
//! Collects the client's choices (services, professional, day, start time)
//! and turns them into the `POST /agendamentos` payload. Day and time are
//! picked in the shop's local time and sent as UTC.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, SecondsFormat, TimeZone, Utc};

use crate::error::{BarberLinkError, Result};
use crate::models::{NewAppointment, ServiceLine, Slot};

/// Shop time zone offset when none is configured (UTC−03:00).
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;

const INCOMPLETE: &str = "Informações incompletas.";

/// Build a fixed offset from minutes east of UTC.
pub fn offset_from_minutes(minutes: i32) -> Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            BarberLinkError::ConfigurationError(format!("Invalid UTC offset: {} minutes", minutes))
        })
}

/// Parse a `YYYY-MM-DD` date typed or picked by the user.
pub fn parse_date_input(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| BarberLinkError::validation("Data inválida. Use AAAA-MM-DD."))
}

/// Parse an `HH:MM` start time.
pub fn parse_slot(input: &str) -> Result<Slot> {
    Slot::parse(input).ok_or_else(|| BarberLinkError::validation("Horário inválido. Use HH:MM."))
}

/// Check that `date` is bookable.
///
/// Past dates are accepted; only dates outside the backend's searchable
/// window are refused.
pub fn validate_booking_date(date: NaiveDate) -> Result<NaiveDate> {
    if (2000..2100).contains(&date.year()) {
        Ok(date)
    } else {
        Err(BarberLinkError::validation("Data fora do período permitido."))
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2025-12-25T18:00:00.000Z`.
pub fn format_scheduled_at(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// In-progress booking.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingWizard {
    client_id: String,
    offset: FixedOffset,
    services: Vec<String>,
    professional_id: Option<String>,
    date: Option<NaiveDate>,
    slot: Option<Slot>,
}

impl BookingWizard {
    pub fn new(client_id: impl Into<String>, offset: FixedOffset) -> Self {
        Self {
            client_id: client_id.into(),
            offset,
            services: Vec::new(),
            professional_id: None,
            date: None,
            slot: None,
        }
    }

    /// Wizard in the default shop time zone.
    pub fn with_default_offset(client_id: impl Into<String>) -> Self {
        let offset = FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60)
            .unwrap_or_else(|| Utc.fix());
        Self::new(client_id, offset)
    }

    /// Add or remove a service. Returns `true` if it is now selected.
    ///
    /// Selection order is kept. Availability depends on the total duration,
    /// so any picked slot is cleared.
    pub fn toggle_service(&mut self, service_id: impl Into<String>) -> bool {
        let service_id = service_id.into();
        self.slot = None;
        if let Some(pos) = self.services.iter().position(|id| *id == service_id) {
            self.services.remove(pos);
            false
        } else {
            self.services.push(service_id);
            true
        }
    }

    pub fn select_professional(&mut self, professional_id: impl Into<String>) {
        let professional_id = professional_id.into();
        if self.professional_id.as_deref() != Some(professional_id.as_str()) {
            self.slot = None;
        }
        self.professional_id = Some(professional_id);
    }

    /// Pick the day; a different day clears the picked slot.
    pub fn select_date(&mut self, date: NaiveDate) -> Result<()> {
        let date = validate_booking_date(date)?;
        if self.date != Some(date) {
            self.slot = None;
        }
        self.date = Some(date);
        Ok(())
    }

    /// Pick a start time on the selected day.
    pub fn select_slot(&mut self, slot: Slot) -> Result<()> {
        if self.date.is_none() {
            return Err(BarberLinkError::validation("Selecione uma data primeiro."));
        }
        self.slot = Some(slot);
        Ok(())
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn selected_services(&self) -> &[String] {
        &self.services
    }

    pub fn professional(&self) -> Option<&str> {
        self.professional_id.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn slot(&self) -> Option<Slot> {
        self.slot
    }

    /// Everything needed to query availability has been picked.
    pub fn can_query_slots(&self) -> bool {
        !self.services.is_empty() && self.professional_id.is_some() && self.date.is_some()
    }

    pub fn is_complete(&self) -> bool {
        !self.client_id.is_empty() && self.can_query_slots() && self.slot.is_some()
    }

    /// Selected day and time, converted to UTC.
    pub fn scheduled_at(&self) -> Result<DateTime<Utc>> {
        let (date, slot) = match (self.date, self.slot) {
            (Some(date), Some(slot)) => (date, slot),
            _ => return Err(BarberLinkError::validation(INCOMPLETE)),
        };
        self.offset
            .from_local_datetime(&date.and_time(slot.time()))
            .single()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| BarberLinkError::validation(INCOMPLETE))
    }

    /// Build the request body.
    pub fn assemble(&self) -> Result<NewAppointment> {
        if !self.is_complete() {
            return Err(BarberLinkError::validation(INCOMPLETE));
        }
        let professional_id = self
            .professional_id
            .clone()
            .ok_or_else(|| BarberLinkError::validation(INCOMPLETE))?;

        Ok(NewAppointment {
            client_id: self.client_id.clone(),
            professional_id,
            scheduled_at: format_scheduled_at(self.scheduled_at()?),
            services: self
                .services
                .iter()
                .map(|id| ServiceLine {
                    service_id: id.clone(),
                    quantity: 1,
                })
                .collect(),
        })
    }

    /// Start over, keeping the client and time zone.
    pub fn reset(&mut self) {
        self.services.clear();
        self.professional_id = None;
        self.date = None;
        self.slot = None;
    }
}
