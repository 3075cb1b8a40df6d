//! Authorization header attachment for backend requests.
//!
//! The backend accepts the identity provider's ID token as a bearer token.
//! [`AuthProvider`] is resolved from the [`TokenStore`] right before each
//! request so a token written by the session controller is picked up
//! without rebuilding the client.

use crate::token_store::TokenStore;

/// Credentials attached to an outgoing request.
///
/// # Examples
///
/// ```rust
/// use barber_link::AuthProvider;
///
/// let auth = AuthProvider::bearer("eyJhbGc...".to_string());
/// assert!(auth.is_authenticated());
///
/// let anonymous = AuthProvider::none();
/// assert!(!anonymous.is_authenticated());
/// ```
#[derive(Clone, PartialEq)]
pub enum AuthProvider {
    /// `Authorization: Bearer <id token>`
    Bearer(String),

    /// No header (registration, public endpoints)
    None,
}

impl AuthProvider {
    pub fn bearer(token: String) -> Self {
        Self::Bearer(token)
    }

    pub fn none() -> Self {
        Self::None
    }

    /// Read the current token from `store`.
    ///
    /// A store that cannot be read degrades to an anonymous request; the
    /// backend answers 401 and the interceptor takes over from there.
    pub fn from_store(store: &dyn TokenStore) -> Self {
        match store.token() {
            Ok(Some(token)) if !token.is_empty() => Self::Bearer(token),
            Ok(_) => Self::None,
            Err(e) => {
                log::warn!("[AUTH] Token store unreadable, sending request without token: {}", e);
                Self::None
            },
        }
    }

    /// Attach the Authorization header, if any.
    pub fn apply_to_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::Bearer(token) => request.bearer_auth(token),
            Self::None => request,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }
}

// Tokens must never reach the logs.
impl std::fmt::Debug for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer(_) => write!(f, "AuthProvider::Bearer(<redacted>)"),
            Self::None => write!(f, "AuthProvider::None"),
        }
    }
}
