use serde::{Deserialize, Serialize};

/// Service line of a booking request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLine {
    #[serde(rename = "servico")]
    pub service_id: String,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
}

/// `POST /agendamentos` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    #[serde(rename = "cliente")]
    pub client_id: String,

    #[serde(rename = "usuario")]
    pub professional_id: String,

    /// ISO-8601 UTC with millisecond precision, e.g. `2025-12-25T18:00:00.000Z`
    #[serde(rename = "dataAgendamento")]
    pub scheduled_at: String,

    #[serde(rename = "servicos")]
    pub services: Vec<ServiceLine>,
}
