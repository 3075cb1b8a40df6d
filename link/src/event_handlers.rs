//! Session lifecycle event handlers.
//!
//! Callback hooks fired by the [`SessionController`](crate::SessionController):
//!
//! - [`on_signed_in`](EventHandlers::on_signed_in): profile resolved after sign-in or refresh
//! - [`on_signed_out`](EventHandlers::on_signed_out): session cleared by the provider
//! - [`on_profile_error`](EventHandlers::on_profile_error): profile fetch failed
//! - [`on_unauthorized`](EventHandlers::on_unauthorized): backend rejected the token (401)
//!
//! Callbacks run on the controller's listener task and must not block.
//!
//! # Example
//!
//! ```rust
//! use barber_link::EventHandlers;
//!
//! let handlers = EventHandlers::new()
//!     .on_signed_in(|profile| println!("Olá, {}", profile.first_name()))
//!     .on_profile_error(|err| eprintln!("profile fetch failed: {}", err))
//!     .on_unauthorized(|| println!("session expired"));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::BarberLinkError;
use crate::models::Profile;

/// Type alias for the on_signed_in callback.
pub type OnSignedInCallback = Arc<dyn Fn(&Profile) + Send + Sync>;

/// Type alias for the on_signed_out callback.
pub type OnSignedOutCallback = Arc<dyn Fn() + Send + Sync>;

/// Type alias for the on_profile_error callback.
pub type OnProfileErrorCallback = Arc<dyn Fn(&BarberLinkError) + Send + Sync>;

/// Type alias for the on_unauthorized callback.
pub type OnUnauthorizedCallback = Arc<dyn Fn() + Send + Sync>;

/// Session lifecycle event handlers. All optional.
#[derive(Clone, Default)]
pub struct EventHandlers {
    pub(crate) on_signed_in: Option<OnSignedInCallback>,
    pub(crate) on_signed_out: Option<OnSignedOutCallback>,
    pub(crate) on_profile_error: Option<OnProfileErrorCallback>,
    pub(crate) on_unauthorized: Option<OnUnauthorizedCallback>,
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlers")
            .field("on_signed_in", &self.on_signed_in.is_some())
            .field("on_signed_out", &self.on_signed_out.is_some())
            .field("on_profile_error", &self.on_profile_error.is_some())
            .field("on_unauthorized", &self.on_unauthorized.is_some())
            .finish()
    }
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked whenever a profile is resolved.
    pub fn on_signed_in(mut self, f: impl Fn(&Profile) + Send + Sync + 'static) -> Self {
        self.on_signed_in = Some(Arc::new(f));
        self
    }

    /// Register a callback invoked when a live session is cleared.
    pub fn on_signed_out(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_signed_out = Some(Arc::new(f));
        self
    }

    /// Register a callback invoked when the profile could not be fetched.
    ///
    /// The session keeps its token; any previously loaded profile is kept
    /// and marked stale.
    pub fn on_profile_error(
        mut self,
        f: impl Fn(&BarberLinkError) + Send + Sync + 'static,
    ) -> Self {
        self.on_profile_error = Some(Arc::new(f));
        self
    }

    /// Register a callback invoked when the backend answers 401.
    pub fn on_unauthorized(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(f));
        self
    }

    /// Returns `true` if any handler is registered.
    pub fn has_any(&self) -> bool {
        self.on_signed_in.is_some()
            || self.on_signed_out.is_some()
            || self.on_profile_error.is_some()
            || self.on_unauthorized.is_some()
    }

    // ---------------------------------------------------------------
    // Internal dispatch helpers
    // ---------------------------------------------------------------

    pub(crate) fn emit_signed_in(&self, profile: &Profile) {
        if let Some(cb) = &self.on_signed_in {
            cb(profile);
        }
    }

    pub(crate) fn emit_signed_out(&self) {
        if let Some(cb) = &self.on_signed_out {
            cb();
        }
    }

    pub(crate) fn emit_profile_error(&self, error: &BarberLinkError) {
        if let Some(cb) = &self.on_profile_error {
            cb(error);
        }
    }

    pub(crate) fn emit_unauthorized(&self) {
        if let Some(cb) = &self.on_unauthorized {
            cb();
        }
    }
}
