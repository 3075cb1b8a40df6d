use serde::{Deserialize, Serialize};
use std::fmt;

/// Application role of a profile.
///
/// The backend speaks Portuguese on the wire (`admin`, `barbeiro`, `cliente`);
/// the English spellings some records carry are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "barbeiro", alias = "staff", alias = "barber")]
    Staff,
    #[serde(rename = "cliente", alias = "client")]
    Client,
}

impl Role {
    /// Admins and barbers share the admin panel.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Staff)
    }

    /// Wire value of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "barbeiro",
            Role::Client => "cliente",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
