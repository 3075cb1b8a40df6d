//! Error types for barber-link.
//!
//! Every fallible operation in the crate returns [`BarberLinkError`]. The
//! technical variants carry enough context for logs; [`BarberLinkError::user_message`]
//! maps them to the short localized strings shown in alerts.

use thiserror::Error;

/// Result type for barber-link operations
pub type Result<T> = std::result::Result<T, BarberLinkError>;

/// Errors surfaced by the client core.
#[derive(Debug, Error)]
pub enum BarberLinkError {
    /// Email/password rejected by the identity provider
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Transport failure (DNS, connect, timeout, reset)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Backend or provider has no matching record; the message is shown as-is
    #[error("Not found: {0}")]
    NotFound(String),

    /// Expired or invalid token on an API call
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Missing or malformed form input, checked client-side
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Identity provider error code without a dedicated variant
    #[error("Identity provider error ({code}): {message}")]
    IdentityError { code: String, message: String },

    /// Non-success HTTP status from the backend
    #[error("Server error ({status_code}): {message}")]
    ServerError { status_code: u16, message: String },

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Local token/profile storage failure
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Unexpected payload shape
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Work discarded because its owner went away
    #[error("Operation cancelled")]
    Cancelled,
}

impl BarberLinkError {
    /// Build a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Short pt-BR message suitable for an alert dialog.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials => "Email ou senha inválidos.".to_string(),
            Self::NetworkError(_) => {
                "Sem conexão com o servidor. Tente novamente.".to_string()
            },
            Self::NotFound(msg) if !msg.is_empty() => msg.clone(),
            Self::NotFound(_) => "Registro não encontrado.".to_string(),
            Self::Unauthorized(_) => "Sua sessão expirou. Faça login novamente.".to_string(),
            // Validation messages are already written for the user
            Self::ValidationError(msg) => msg.clone(),
            Self::IdentityError { code, .. } => identity_code_message(code).to_string(),
            Self::ServerError { .. } => "Erro no servidor. Tente novamente mais tarde.".to_string(),
            Self::ConfigurationError(_) | Self::StorageError(_) | Self::SerializationError(_) => {
                "Erro interno do aplicativo.".to_string()
            },
            Self::Cancelled => "Operação cancelada.".to_string(),
        }
    }

    /// `true` for failures that may succeed if retried later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NetworkError(_) => true,
            Self::ServerError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

/// Localized text for identity provider codes that reach the UI as-is.
fn identity_code_message(code: &str) -> &'static str {
    match code {
        "EMAIL_EXISTS" => "Este e-mail já está cadastrado.",
        "WEAK_PASSWORD" => "A senha deve ter pelo menos 6 caracteres.",
        "USER_DISABLED" => "Esta conta foi desativada.",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Muitas tentativas. Tente novamente mais tarde.",
        "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" => {
            "Sua sessão expirou. Faça login novamente."
        },
        _ => "Não foi possível autenticar. Tente novamente.",
    }
}

impl From<reqwest::Error> for BarberLinkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BarberLinkError::SerializationError(err.to_string())
        } else if err.is_timeout() {
            BarberLinkError::NetworkError(format!("Request timed out: {}", err))
        } else {
            BarberLinkError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BarberLinkError {
    fn from(err: serde_json::Error) -> Self {
        BarberLinkError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for BarberLinkError {
    fn from(err: std::io::Error) -> Self {
        BarberLinkError::StorageError(err.to_string())
    }
}

impl From<toml::de::Error> for BarberLinkError {
    fn from(err: toml::de::Error) -> Self {
        BarberLinkError::ConfigurationError(format!("TOML parse error: {}", err))
    }
}

impl From<toml::ser::Error> for BarberLinkError {
    fn from(err: toml::ser::Error) -> Self {
        BarberLinkError::SerializationError(format!("TOML serialize error: {}", err))
    }
}
