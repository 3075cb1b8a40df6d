//! Session Controller.
//!
//! Owns the in-memory [`Session`] and keeps it in step with the identity
//! provider. A single listener task consumes the provider's account events
//! in order:
//!
//! - `Some(user)`: fetch an ID token, persist it, publish it, then load the
//!   profile for `user.uid`.
//! - `None`: clear the token store and reset the session.
//!
//! The public operations only talk to the provider; the resulting event is
//! what updates the session. The exceptions are [`SessionController::set_profile`]
//! (optimistic local edit) and [`SessionController::expire_session`] (the
//! 401 path, which must take effect before the next request).

use std::sync::{Arc, Weak};

use log::{debug, info, warn};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::error::{BarberLinkError, Result};
use crate::event_handlers::EventHandlers;
use crate::identity::IdentityProvider;
use crate::models::{IdentityUser, Profile, ProfilePatch, RegistrationForm};
use crate::profile::{ClientRegistrar, ProfileFetcher};
use crate::session::{Session, SessionView, SessionWriter};
use crate::token_store::{MemoryTokenStore, TokenStore};

struct ControllerInner {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileFetcher>,
    token_store: Arc<dyn TokenStore>,
    registrar: Option<Arc<dyn ClientRegistrar>>,
    handlers: EventHandlers,
    writer: SessionWriter,
    sign_in_lock: Mutex<()>,
}

/// Keeps the session in sync with the identity provider.
///
/// Dropping the controller stops its listener task.
///
/// # Examples
///
/// ```rust,no_run
/// use barber_link::{
///     BarberLinkClient, FirebaseIdentityClient, MemoryTokenStore, SessionController,
/// };
/// use std::sync::Arc;
///
/// # async fn example() -> barber_link::Result<()> {
/// let store = Arc::new(MemoryTokenStore::new());
/// let client = BarberLinkClient::builder().token_store(store.clone()).build()?;
/// let identity = FirebaseIdentityClient::builder().api_key("AIza...").build()?;
///
/// let controller = SessionController::builder()
///     .identity(Arc::new(identity))
///     .profiles(Arc::new(client.clone()))
///     .registrar(Arc::new(client.clone()))
///     .token_store(store)
///     .start()?;
/// client.set_unauthorized_handler(controller.unauthorized_handler());
///
/// controller.sign_in("cliente@teste.com", "senha123").await?;
/// let session = controller
///     .session()
///     .wait_until(|s| !s.is_loading() && s.is_authenticated())
///     .await?;
/// println!("Olá, {}", session.user().map(|p| p.first_name()).unwrap_or(""));
/// # Ok(())
/// # }
/// ```
pub struct SessionController {
    inner: Arc<ControllerInner>,
    listener: JoinHandle<()>,
}

impl SessionController {
    pub fn builder() -> SessionControllerBuilder {
        SessionControllerBuilder::default()
    }

    /// Read-only view of the session.
    pub fn session(&self) -> SessionView {
        self.inner.writer.view()
    }

    /// Current session snapshot.
    pub fn current(&self) -> Session {
        self.inner.writer.snapshot()
    }

    /// Sign in with email and password.
    ///
    /// Does not touch the session directly; the provider's account event
    /// drives the update. Concurrent calls run one at a time.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(BarberLinkError::validation("Preencha todos os campos."));
        }

        let _guard = self.inner.sign_in_lock.lock().await;
        info!("[SESSION] Sign-in requested for {}", email);
        match self.inner.identity.sign_in(email, password).await {
            Ok(user) => {
                debug!("[SESSION] Provider accepted sign-in, uid={}", user.uid);
                Ok(())
            },
            Err(e) => {
                warn!("[SESSION] Sign-in failed for {}: {}", email, e);
                Err(e)
            },
        }
    }

    /// Sign out of the provider; the resulting event clears the session.
    pub async fn sign_out(&self) -> Result<()> {
        info!("[SESSION] Sign-out requested");
        self.inner.identity.sign_out().await
    }

    /// Register a new client account, then sign into it.
    pub async fn sign_up(&self, form: &RegistrationForm) -> Result<()> {
        let request = form.validate()?;
        let registrar = self.inner.registrar.as_ref().ok_or_else(|| {
            BarberLinkError::ConfigurationError("no client registrar configured".into())
        })?;

        registrar.register_client(&request).await?;
        info!("[SESSION] Registered {}, signing in", request.email);
        self.sign_in(&request.email, &request.password).await
    }

    /// Ask the provider to send a password reset email.
    pub async fn send_password_reset(&self, email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(BarberLinkError::validation("Informe seu e-mail."));
        }
        self.inner.identity.send_password_reset(email).await
    }

    /// Merge `patch` into the loaded profile without a backend round trip.
    ///
    /// Keeps the resolved/stale tag. Applying the same patch twice is the
    /// same as applying it once.
    pub fn set_profile(&self, patch: &ProfilePatch) -> Result<()> {
        let token_store = &self.inner.token_store;
        let applied = self.inner.writer.modify(|session| match session.profile_mut() {
            Some(profile) => {
                patch.apply_to(profile);
                if let Err(e) = token_store.set_cached_profile(profile) {
                    warn!("[SESSION] Could not cache edited profile: {}", e);
                }
                true
            },
            None => false,
        });

        if applied {
            Ok(())
        } else {
            Err(BarberLinkError::validation("Nenhum perfil carregado."))
        }
    }

    /// Fetch the profile again for the current account.
    pub async fn refresh_profile(&self) -> Result<Profile> {
        let user = self
            .inner
            .identity
            .current_user()
            .ok_or_else(|| BarberLinkError::Unauthorized("No signed-in user".into()))?;
        let generation = self.inner.writer.generation();
        self.inner.load_profile(generation, &user.uid).await
    }

    /// Forced sign-out after the backend rejected the token.
    ///
    /// The token store and the session are cleared before this returns;
    /// the provider sign-out runs in the background.
    pub fn expire_session(&self) {
        self.inner.expire_session();
    }

    /// Callback for [`BarberLinkClient::set_unauthorized_handler`](crate::BarberLinkClient::set_unauthorized_handler).
    ///
    /// Holds a weak reference; it does nothing once the controller is dropped.
    pub fn unauthorized_handler(&self) -> Arc<dyn Fn() + Send + Sync> {
        let weak: Weak<ControllerInner> = Arc::downgrade(&self.inner);
        Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.expire_session();
            }
        })
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("generation", &self.inner.writer.generation())
            .field("handlers", &self.inner.handlers)
            .finish()
    }
}

impl ControllerInner {
    async fn run_listener(self: Arc<Self>) {
        let mut events = self.identity.subscribe();
        loop {
            let event = events.borrow_and_update().clone();
            match event {
                Some(user) => self.on_identity(user).await,
                None => self.on_signed_out(),
            }
            if events.changed().await.is_err() {
                debug!("[SESSION] Identity provider closed its event stream");
                return;
            }
        }
    }

    async fn on_identity(&self, user: IdentityUser) {
        let generation = self.writer.bump();
        debug!("[SESSION] Identity event uid={} generation={}", user.uid, generation);

        let token = match self.identity.id_token(false).await {
            Ok(token) => token,
            Err(e) => {
                warn!("[SESSION] Could not obtain ID token for uid={}: {}", user.uid, e);
                self.writer.commit(generation, |session| session.set_loading(false));
                return;
            },
        };

        let token_store = &self.token_store;
        let published = self.writer.commit(generation, |session| {
            if let Err(e) = token_store.set_token(&token) {
                warn!("[SESSION] Could not persist token: {}", e);
            }
            session.forget_other_user(&user.uid);
            session.set_token(token.clone());
        });
        if !published {
            debug!("[SESSION] Dropping token for superseded generation {}", generation);
            return;
        }

        // Errors are already reflected in the session
        let _ = self.load_profile(generation, &user.uid).await;
    }

    async fn load_profile(&self, generation: u64, external_id: &str) -> Result<Profile> {
        match self.profiles.fetch_profile(external_id).await {
            Ok(profile) => {
                let token_store = &self.token_store;
                let mut resolved = false;
                self.writer.commit(generation, |session| {
                    // A profile is only shown alongside a token
                    if session.token().is_none() {
                        return;
                    }
                    if let Err(e) = token_store.set_cached_profile(&profile) {
                        warn!("[SESSION] Could not cache profile: {}", e);
                    }
                    session.resolve(profile.clone());
                    resolved = true;
                });
                if resolved {
                    info!("[SESSION] Profile loaded for {} ({})", profile.email, profile.role);
                    self.handlers.emit_signed_in(&profile);
                    Ok(profile)
                } else {
                    Err(BarberLinkError::Cancelled)
                }
            },
            Err(e) => {
                warn!("[SESSION] Profile fetch failed for uid={}: {}", external_id, e);
                let message = e.to_string();
                if self
                    .writer
                    .commit(generation, |session| session.mark_stale(message))
                {
                    self.handlers.emit_profile_error(&e);
                }
                Err(e)
            },
        }
    }

    fn on_signed_out(&self) {
        let token_store = &self.token_store;
        let previous = self.writer.reset(|| {
            if let Err(e) = token_store.clear() {
                warn!("[SESSION] Could not clear token store: {}", e);
            }
        });
        if previous.is_live() {
            info!("[SESSION] Signed out");
            self.handlers.emit_signed_out();
        }
    }

    fn expire_session(&self) {
        let token_store = &self.token_store;
        let previous = self.writer.reset(|| {
            if let Err(e) = token_store.clear() {
                warn!("[SESSION] Could not clear token store: {}", e);
            }
        });
        warn!("[SESSION] Session expired by backend");
        self.handlers.emit_unauthorized();
        if previous.is_live() {
            self.handlers.emit_signed_out();
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let identity = self.identity.clone();
                handle.spawn(async move {
                    if let Err(e) = identity.sign_out().await {
                        warn!("[SESSION] Provider sign-out after expiry failed: {}", e);
                    }
                });
            },
            Err(_) => warn!("[SESSION] No runtime available, provider sign-out skipped"),
        }
    }
}

/// Builder for [`SessionController`].
#[derive(Default)]
pub struct SessionControllerBuilder {
    identity: Option<Arc<dyn IdentityProvider>>,
    profiles: Option<Arc<dyn ProfileFetcher>>,
    token_store: Option<Arc<dyn TokenStore>>,
    registrar: Option<Arc<dyn ClientRegistrar>>,
    handlers: EventHandlers,
}

impl SessionControllerBuilder {
    /// Identity provider (required).
    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Profile source (required).
    pub fn profiles(mut self, profiles: Arc<dyn ProfileFetcher>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    /// Where the token is mirrored. Defaults to a [`MemoryTokenStore`].
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Backend for [`SessionController::sign_up`].
    pub fn registrar(mut self, registrar: Arc<dyn ClientRegistrar>) -> Self {
        self.registrar = Some(registrar);
        self
    }

    pub fn event_handlers(mut self, handlers: EventHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// Build the controller and spawn its listener.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> Result<SessionController> {
        let identity = self.identity.ok_or_else(|| {
            BarberLinkError::ConfigurationError("identity provider is required".into())
        })?;
        let profiles = self.profiles.ok_or_else(|| {
            BarberLinkError::ConfigurationError("profile fetcher is required".into())
        })?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            BarberLinkError::ConfigurationError(
                "SessionController must be started inside a tokio runtime".into(),
            )
        })?;

        let inner = Arc::new(ControllerInner {
            identity,
            profiles,
            token_store: self
                .token_store
                .unwrap_or_else(|| Arc::new(MemoryTokenStore::new())),
            registrar: self.registrar,
            handlers: self.handlers,
            writer: SessionWriter::new(),
            sign_in_lock: Mutex::new(()),
        });

        let listener = runtime.spawn(inner.clone().run_listener());
        debug!("[SESSION] Controller started");

        Ok(SessionController { inner, listener })
    }
}
