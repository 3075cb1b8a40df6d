//! # barber-link
//!
//! Headless client core for the Inova barbershop booking app.
//!
//! The crate owns everything the app screens need besides drawing:
//!
//! - [`SessionController`]: the single writer of the authenticated [`Session`],
//!   kept in sync with the identity provider. Screens read it through a
//!   [`SessionView`].
//! - [`RouteGuard`]: redirects between the login, admin and client areas
//!   based on session state.
//! - [`BarberLinkClient`]: the REST client for users, services, appointments
//!   and reports, with 401 interception.
//! - [`BookingWizard`], [`agenda`] and [`ProfileScreen`]: per-screen state.
//! - [`ScreenScope`]: cancels in-flight fetches when a screen goes away.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use barber_link::{LinkConfig, SessionController, TokenStore};
//!
//! # async fn example() -> barber_link::Result<()> {
//! let config = LinkConfig::load(&barber_link::config::default_config_path())?;
//! let store: Arc<dyn TokenStore> = Arc::new(config.token_store()?);
//! let client = Arc::new(config.client(store.clone())?);
//! let identity = config.identity_client()?;
//! identity.start_auto_refresh();
//!
//! let controller = SessionController::builder()
//!     .identity(Arc::new(identity))
//!     .profiles(client.clone())
//!     .registrar(client.clone())
//!     .token_store(store)
//!     .start()?;
//! client.set_unauthorized_handler(controller.unauthorized_handler());
//!
//! controller.sign_in("cliente@teste.com", "senha123").await?;
//! let session = controller.session().wait_until(|s| !s.is_loading()).await?;
//! println!("signed in: {}", session.is_authenticated());
//! # Ok(())
//! # }
//! ```

pub mod agenda;
mod api;
pub mod auth;
pub mod booking;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod event_handlers;
pub mod identity;
pub mod logging;
pub mod models;
pub mod profile;
pub mod router;
pub mod scope;
pub mod session;
pub mod timeouts;
pub mod token_store;
pub mod viewmodels;

pub use auth::AuthProvider;
pub use booking::BookingWizard;
pub use client::{BarberLinkClient, BarberLinkClientBuilder, UnauthorizedHandler, DEFAULT_BASE_URL};
pub use config::LinkConfig;
pub use controller::{SessionController, SessionControllerBuilder};
pub use error::{BarberLinkError, Result};
pub use event_handlers::EventHandlers;
pub use identity::{FirebaseIdentityClient, IdentityEvents, IdentityProvider};
pub use models::{
    Appointment, AppointmentStatus, AvailabilityResponse, BookedService, IdentityUser,
    ImageUpload, MonthlyReport, NewAppointment, NewUser, Profile, ProfilePatch,
    RegistrationForm, RegistrationRequest, Role, Service, ServiceDraft, ServiceLine,
    ServiceRanking, ServiceRef, Slot, UserRef, UserSummary,
};
pub use profile::{ClientRegistrar, ProfileFetcher};
pub use router::{decide, AuthState, GuardDecision, Route, RouteArea, RouteGuard};
pub use scope::{ScopeGuard, ScopedTask, ScreenScope};
pub use session::{Session, SessionView, UserState};
pub use timeouts::LinkTimeouts;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use viewmodels::ProfileScreen;
