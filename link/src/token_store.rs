//! Persisted Token Store.
//!
//! Holds the identity token mirrored from the provider, plus an optional
//! cached copy of the signed-in profile so a shell can paint something while
//! the fresh profile loads. The session controller is the only writer during
//! normal operation; the REST client reads the token on every request.
//!
//! Implementations use interior mutability (`&self` everywhere) so a single
//! `Arc<dyn TokenStore>` can be shared between the controller and the client.

pub mod file;

use std::sync::RwLock;

use crate::error::{BarberLinkError, Result};
use crate::models::Profile;

pub use file::FileTokenStore;

/// Storage backend for the session token.
///
/// # Security Note
///
/// Tokens are bearer credentials. File-backed implementations must restrict
/// permissions (0600 on Unix) and nothing here may log token values.
pub trait TokenStore: Send + Sync {
    /// Current token, `None` when signed out.
    fn token(&self) -> Result<Option<String>>;

    /// Replace the stored token.
    fn set_token(&self, token: &str) -> Result<()>;

    /// Last profile cached alongside the token.
    fn cached_profile(&self) -> Result<Option<Profile>>;

    /// Cache `profile` alongside the token.
    fn set_cached_profile(&self, profile: &Profile) -> Result<()>;

    /// Remove the token and the cached profile.
    fn clear(&self) -> Result<()>;

    /// `true` when a token is stored.
    fn has_token(&self) -> Result<bool> {
        Ok(self.token()?.is_some())
    }
}

#[derive(Debug, Default, Clone)]
struct StoredSession {
    token: Option<String>,
    profile: Option<Profile>,
}

/// In-memory token store for tests and ephemeral shells.
///
/// Does NOT persist across restarts.
///
/// # Example
///
/// ```rust
/// use barber_link::{MemoryTokenStore, TokenStore};
///
/// let store = MemoryTokenStore::new();
/// store.set_token("eyJhbGc...").unwrap();
/// assert_eq!(store.token().unwrap().as_deref(), Some("eyJhbGc..."));
/// store.clear().unwrap();
/// assert!(!store.has_token().unwrap());
/// ```
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: RwLock<StoredSession>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> BarberLinkError {
    BarberLinkError::StorageError("token store lock poisoned".to_string())
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Result<Option<String>> {
        Ok(self.inner.read().map_err(|_| poisoned())?.token.clone())
    }

    fn set_token(&self, token: &str) -> Result<()> {
        self.inner.write().map_err(|_| poisoned())?.token = Some(token.to_string());
        Ok(())
    }

    fn cached_profile(&self) -> Result<Option<Profile>> {
        Ok(self.inner.read().map_err(|_| poisoned())?.profile.clone())
    }

    fn set_cached_profile(&self, profile: &Profile) -> Result<()> {
        self.inner.write().map_err(|_| poisoned())?.profile = Some(profile.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.write().map_err(|_| poisoned())? = StoredSession::default();
        Ok(())
    }
}
