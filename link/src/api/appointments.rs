use chrono::NaiveDate;
use log::{debug, info};
use serde::Serialize;

use urlencoding::encode;
use crate::client::BarberLinkClient;
use crate::error::{BarberLinkError, Result};
use crate::models::{Appointment, AppointmentStatus, AvailabilityResponse, NewAppointment, Slot};

/// Date window that covers every appointment a client can have.
const ALL_TIME_START: &str = "2000-01-01";
const ALL_TIME_END: &str = "2100-01-01";

#[derive(Serialize)]
struct StatusUpdate {
    status: AppointmentStatus,
}

impl BarberLinkClient {
    pub async fn create_appointment(&self, appointment: &NewAppointment) -> Result<Appointment> {
        if appointment.services.is_empty() {
            return Err(BarberLinkError::validation("Informações incompletas."));
        }
        info!(
            "[BOOKING] Creating appointment at {} with professional={}",
            appointment.scheduled_at, appointment.professional_id
        );
        self.post_json("agendamentos", appointment).await
    }

    /// Every appointment; the backend scopes the list by the caller's role.
    pub async fn list_appointments(&self) -> Result<Vec<Appointment>> {
        self.get_json("agendamentos", &[]).await
    }

    /// All appointments of one client, with populated references.
    pub async fn client_appointments(&self, client_id: &str) -> Result<Vec<Appointment>> {
        self.get_json(
            "agendamentos/filtrados",
            &[
                ("clienteId", client_id.to_string()),
                ("dataInicio", ALL_TIME_START.to_string()),
                ("dataFim", ALL_TIME_END.to_string()),
            ],
        )
        .await
    }

    pub async fn update_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<()> {
        debug!("[BOOKING] Appointment {} -> {}", id, status);
        self.put_unit(
            &format!("agendamentos/{}", encode(id)),
            &StatusUpdate { status },
        )
        .await
    }

    pub async fn cancel_appointment(&self, id: &str) -> Result<()> {
        self.update_appointment_status(id, AppointmentStatus::Cancelled)
            .await
    }

    /// Free start times for a professional on `date`, given the services
    /// to be booked.
    pub async fn available_slots(
        &self,
        professional_id: &str,
        date: NaiveDate,
        service_ids: &[String],
    ) -> Result<Vec<Slot>> {
        let response: AvailabilityResponse = self
            .get_json(
                "agendamentos/disponibilidade",
                &[
                    ("barbeiroId", professional_id.to_string()),
                    ("data", date.format("%Y-%m-%d").to_string()),
                    ("servicos", service_ids.join(",")),
                ],
            )
            .await?;
        let mut slots = response.into_slots();
        slots.sort();
        slots.dedup();
        Ok(slots)
    }
}
