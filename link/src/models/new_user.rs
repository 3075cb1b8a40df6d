use serde::{Deserialize, Serialize};

use super::role::Role;

/// Initial password handed out for accounts created from the admin panel.
pub const DEFAULT_INITIAL_PASSWORD: &str = "mudar123";

/// `POST /usuarios` body, used by staff to pre-provision barbers and clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
    #[serde(rename = "telefone", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    /// Empty until the person signs in for the first time
    #[serde(default)]
    pub firebase_uid: String,
}

impl NewUser {
    /// Barber pre-registered by an admin; linked on first sign-in.
    pub fn staff(name: impl Into<String>, email: impl Into<String>, phone: Option<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: DEFAULT_INITIAL_PASSWORD.to_string(),
            phone,
            role: Role::Staff,
            firebase_uid: String::new(),
        }
    }

    /// Client created on someone's behalf at the front desk.
    pub fn client(name: impl Into<String>, email: impl Into<String>, phone: Option<String>) -> Self {
        Self {
            role: Role::Client,
            ..Self::staff(name, email, phone)
        }
    }
}
