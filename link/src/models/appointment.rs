use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::appointment_status::AppointmentStatus;
use super::service::Service;

/// Minimal user record embedded in populated appointments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// A user reference: bare id or populated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Id(String),
    Populated(UserSummary),
}

impl UserRef {
    pub fn id(&self) -> &str {
        match self {
            UserRef::Id(id) => id,
            UserRef::Populated(user) => &user.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            UserRef::Id(_) => None,
            UserRef::Populated(user) => Some(&user.name),
        }
    }
}

/// A service reference: bare id or populated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceRef {
    Id(String),
    Populated(Service),
}

impl ServiceRef {
    pub fn id(&self) -> &str {
        match self {
            ServiceRef::Id(id) => id,
            ServiceRef::Populated(service) => &service.id,
        }
    }
}

/// One line of an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookedService {
    #[serde(rename = "servico")]
    pub service: ServiceRef,
    #[serde(rename = "quantidade", default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Appointment as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    #[serde(rename = "cliente")]
    pub client: UserRef,

    /// Barber or admin performing the service
    #[serde(rename = "usuario")]
    pub professional: UserRef,

    #[serde(rename = "servicos", default)]
    pub services: Vec<BookedService>,

    #[serde(rename = "dataAgendamento")]
    pub scheduled_at: DateTime<Utc>,

    /// Computed by the backend
    #[serde(default)]
    pub total: Option<f64>,

    #[serde(default)]
    pub status: AppointmentStatus,
}
