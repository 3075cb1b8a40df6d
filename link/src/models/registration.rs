use serde::{Deserialize, Serialize};

use super::role::Role;
use crate::error::{BarberLinkError, Result};

/// Self-registration form, as typed by a new client.
#[derive(Clone, Default, PartialEq)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub cpf: String,
    /// Free text, `DD-MM-AAAA` by convention
    pub birth_date: String,
    pub address: String,
    pub password: String,
}

impl RegistrationForm {
    /// Check required fields and build the backend request.
    ///
    /// Only presence is enforced; the backend owns structural validation.
    pub fn validate(&self) -> Result<RegistrationRequest> {
        let required = [
            ("nome", &self.name),
            ("e-mail", &self.email),
            ("CPF", &self.cpf),
            ("data de nascimento", &self.birth_date),
            ("endereço", &self.address),
            ("senha", &self.password),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(label, _)| *label)
            .collect();
        if !missing.is_empty() {
            return Err(BarberLinkError::ValidationError(format!(
                "Preencha os campos obrigatórios: {}.",
                missing.join(", ")
            )));
        }

        Ok(RegistrationRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            cpf: self.cpf.trim().to_string(),
            birth_date: self.birth_date.trim().to_string(),
            address: self.address.trim().to_string(),
            role: Role::Client,
        })
    }
}

/// `POST /clientes` body.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
    #[serde(rename = "CPF")]
    pub cpf: String,
    #[serde(rename = "dataNascimento")]
    pub birth_date: String,
    #[serde(rename = "endereco")]
    pub address: String,
    pub role: Role,
}

// Passwords must never reach the logs.
impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("cpf", &self.cpf)
            .field("birth_date", &self.birth_date)
            .field("address", &self.address)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl std::fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("cpf", &self.cpf)
            .field("birth_date", &self.birth_date)
            .field("address", &self.address)
            .field("role", &self.role)
            .finish()
    }
}
