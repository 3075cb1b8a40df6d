//! Profile Fetcher and client self-registration.
//!
//! These are the two backend calls the session controller depends on.
//! [`BarberLinkClient`](crate::BarberLinkClient) implements both; tests
//! substitute in-process fakes.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Profile, RegistrationRequest};

/// Loads the application profile for an identity provider account.
#[async_trait]
pub trait ProfileFetcher: Send + Sync + 'static {
    /// Fetch the profile linked to `external_id` (the provider uid).
    ///
    /// Errors: `ValidationError` for an empty id, `NotFound` when no profile
    /// is linked, `Unauthorized` for a rejected token, `NetworkError` on
    /// transport failure. Never retried.
    async fn fetch_profile(&self, external_id: &str) -> Result<Profile>;
}

/// Creates client accounts from the public sign-up form.
#[async_trait]
pub trait ClientRegistrar: Send + Sync + 'static {
    async fn register_client(&self, request: &RegistrationRequest) -> Result<()>;
}
