//! Remote Identity Client.
//!
//! The identity provider owns accounts and issues short-lived ID tokens.
//! Everything else in the crate talks to it through [`IdentityProvider`],
//! which keeps the session controller testable with an in-process fake.
//!
//! Account changes are published on a `tokio::sync::watch` channel: a new
//! subscriber sees the current account first, then every change after it.
//! `Some(user)` is also re-sent after a background token refresh so
//! listeners can pick up the new token.

pub mod firebase;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::{BarberLinkError, Result};
use crate::models::IdentityUser;

pub use firebase::FirebaseIdentityClient;

/// Stream of account changes; `None` means signed out.
pub type IdentityEvents = watch::Receiver<Option<IdentityUser>>;

/// Email/password identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Authenticate and publish the account on success.
    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityUser>;

    /// Drop local credentials and publish `None`.
    async fn sign_out(&self) -> Result<()>;

    /// Create an account and sign into it.
    async fn create_account(&self, email: &str, password: &str) -> Result<IdentityUser>;

    /// Ask the provider to email a password reset link.
    async fn send_password_reset(&self, email: &str) -> Result<()>;

    /// ID token for the current account, refreshed when close to expiry or
    /// when `force_refresh` is set.
    async fn id_token(&self, force_refresh: bool) -> Result<String>;

    /// Account currently signed in, if any.
    fn current_user(&self) -> Option<IdentityUser>;

    /// Subscribe to account changes.
    fn subscribe(&self) -> IdentityEvents;
}

/// Provider call an error code came from; the same code means different
/// things depending on the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityOperation {
    SignIn,
    SignUp,
    PasswordReset,
    RefreshToken,
}

/// Map a provider error code to a crate error.
///
/// Codes may carry a detail suffix (`WEAK_PASSWORD : Password should be at
/// least 6 characters`); only the part before ` : ` is matched.
pub fn map_identity_error(operation: IdentityOperation, raw: &str) -> BarberLinkError {
    let code = raw.split(" : ").next().unwrap_or(raw).trim();

    match (operation, code) {
        (
            IdentityOperation::SignIn,
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS",
        ) => BarberLinkError::InvalidCredentials,
        (IdentityOperation::PasswordReset, "EMAIL_NOT_FOUND") => {
            BarberLinkError::NotFound("Este e-mail não está cadastrado.".to_string())
        },
        (_, "INVALID_EMAIL") => BarberLinkError::ValidationError("E-mail inválido.".to_string()),
        _ => BarberLinkError::IdentityError {
            code: code.to_string(),
            message: raw.to_string(),
        },
    }
}
