//! Firebase Identity Toolkit client over plain REST.
//!
//! Endpoints used:
//! - `POST {identity_url}/accounts:signInWithPassword?key=..`
//! - `POST {identity_url}/accounts:signUp?key=..`
//! - `POST {identity_url}/accounts:sendOobCode?key=..` (`PASSWORD_RESET`)
//! - `POST {token_url}/token?key=..` (`grant_type=refresh_token`)
//!
//! The signed-in account lives in memory only. Persisting the ID token is the
//! session controller's job (through the token store).

use std::sync::{Arc, Mutex as StdMutex, RwLock, Weak};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tokio::task::AbortHandle;
use tokio::time::Instant;

use super::{map_identity_error, IdentityEvents, IdentityOperation, IdentityProvider};
use crate::error::{BarberLinkError, Result};
use crate::models::IdentityUser;
use crate::timeouts::LinkTimeouts;

pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

/// Lower bound between two scheduled refreshes.
const MIN_REFRESH_DELAY: Duration = Duration::from_secs(1);

/// Token lifetime assumed when the provider sends something unparseable.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

// ── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn parse_expires_in(raw: &str) -> Duration {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TOKEN_LIFETIME)
}

/// Refresh failures that mean the account is gone, not that the network
/// hiccuped.
fn is_session_revoked(err: &BarberLinkError) -> bool {
    match err {
        BarberLinkError::IdentityError { code, .. } => matches!(
            code.as_str(),
            "TOKEN_EXPIRED"
                | "INVALID_REFRESH_TOKEN"
                | "USER_NOT_FOUND"
                | "USER_DISABLED"
                | "INVALID_GRANT_TYPE"
        ),
        _ => false,
    }
}

async fn decode_response<R: DeserializeOwned>(
    operation: IdentityOperation,
    response: reqwest::Response,
) -> Result<R> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<R>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => Err(map_identity_error(operation, &envelope.error.message)),
        Err(_) => Err(BarberLinkError::ServerError {
            status_code: status.as_u16(),
            message: body,
        }),
    }
}

// ── Client ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
struct ProviderSession {
    user: IdentityUser,
    id_token: String,
    refresh_token: String,
    expires_at: Instant,
}

struct Inner {
    http: reqwest::Client,
    api_key: String,
    identity_url: String,
    token_url: String,
    timeouts: LinkTimeouts,
    session: RwLock<Option<ProviderSession>>,
    events: watch::Sender<Option<IdentityUser>>,
    refresh_lock: Mutex<()>,
    refresh_task: StdMutex<Option<AbortHandle>>,
}

/// [`IdentityProvider`] backed by the Firebase REST API.
///
/// # Examples
///
/// ```rust,no_run
/// use barber_link::{FirebaseIdentityClient, IdentityProvider};
///
/// # async fn example() -> barber_link::Result<()> {
/// let identity = FirebaseIdentityClient::builder()
///     .api_key("AIza...")
///     .build()?;
/// identity.start_auto_refresh();
///
/// let user = identity.sign_in("cliente@teste.com", "senha123").await?;
/// let token = identity.id_token(false).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FirebaseIdentityClient {
    inner: Arc<Inner>,
}

impl FirebaseIdentityClient {
    pub fn builder() -> FirebaseIdentityClientBuilder {
        FirebaseIdentityClientBuilder::new()
    }

    /// Spawn the background refresh task.
    ///
    /// The token is refreshed `token_refresh_margin` before it expires and
    /// `Some(user)` is published again on success. A rejected refresh token
    /// signs the account out (`None`); transport failures are retried after
    /// `refresh_retry_delay`. Calling this again replaces the running task.
    /// Must be called from within a tokio runtime.
    pub fn start_auto_refresh(&self) {
        let weak = Arc::downgrade(&self.inner);
        let events = self.inner.events.subscribe();
        let handle = tokio::spawn(auto_refresh_loop(weak, events));

        let mut slot = self
            .inner
            .refresh_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = slot.replace(handle.abort_handle()) {
            previous.abort();
        }
    }
}

impl Inner {
    fn snapshot(&self) -> Option<ProviderSession> {
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn replace_session(&self, session: Option<ProviderSession>) {
        *self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = session;
    }

    fn is_fresh(&self, session: &ProviderSession) -> bool {
        session.expires_at.saturating_duration_since(Instant::now())
            > self.timeouts.token_refresh_margin
    }

    /// Time until the next scheduled refresh, `None` when signed out.
    fn next_refresh_delay(&self) -> Option<Duration> {
        self.snapshot().map(|session| {
            let due = session
                .expires_at
                .checked_sub(self.timeouts.token_refresh_margin)
                .unwrap_or(session.expires_at);
            due.saturating_duration_since(Instant::now()).max(MIN_REFRESH_DELAY)
        })
    }

    async fn post_account<B: Serialize, R: DeserializeOwned>(
        &self,
        operation: IdentityOperation,
        action: &str,
        body: &B,
    ) -> Result<R> {
        let url = format!("{}/accounts:{}", self.identity_url, action);
        debug!("[IDENTITY] POST accounts:{}", action);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await?;
        decode_response(operation, response).await
    }

    async fn password_flow(
        &self,
        operation: IdentityOperation,
        action: &str,
        email: &str,
        password: &str,
    ) -> Result<IdentityUser> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let response: PasswordResponse = self.post_account(operation, action, &body).await?;

        let user = IdentityUser::new(
            response.local_id,
            response.email.or_else(|| Some(email.to_string())),
        );
        self.replace_session(Some(ProviderSession {
            user: user.clone(),
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires_at: Instant::now() + parse_expires_in(&response.expires_in),
        }));
        self.events.send_replace(Some(user.clone()));
        Ok(user)
    }

    /// Exchange the refresh token for a new ID token.
    ///
    /// Callers hold `refresh_lock`. Returns `Cancelled` when the account
    /// changed while the request was in flight.
    async fn refresh(&self) -> Result<ProviderSession> {
        let current = self
            .snapshot()
            .ok_or_else(|| BarberLinkError::Unauthorized("No signed-in user".to_string()))?;

        let url = format!("{}/token", self.token_url);
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", current.refresh_token.as_str()),
            ])
            .send()
            .await?;
        let body: RefreshResponse =
            decode_response(IdentityOperation::RefreshToken, response).await?;

        let refreshed = ProviderSession {
            user: current.user.clone(),
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_at: Instant::now() + parse_expires_in(&body.expires_in),
        };

        let mut guard = self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match guard.as_ref() {
            Some(session) if session.user.uid == current.user.uid => {
                *guard = Some(refreshed.clone());
                Ok(refreshed)
            },
            _ => Err(BarberLinkError::Cancelled),
        }
    }

    /// One scheduled refresh; returns a retry delay on transient failure.
    async fn scheduled_refresh(&self) -> Option<Duration> {
        let _guard = self.refresh_lock.lock().await;
        match self.refresh().await {
            Ok(session) => {
                debug!("[IDENTITY] Token refreshed for uid={}", session.user.uid);
                self.events.send_replace(Some(session.user));
                None
            },
            Err(BarberLinkError::Cancelled) => None,
            Err(e) if is_session_revoked(&e) => {
                warn!("[IDENTITY] Refresh token rejected, signing out: {}", e);
                self.replace_session(None);
                self.events.send_replace(None);
                None
            },
            Err(e) => {
                warn!(
                    "[IDENTITY] Token refresh failed, retrying in {:?}: {}",
                    self.timeouts.refresh_retry_delay, e
                );
                Some(self.timeouts.refresh_retry_delay)
            },
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self
            .refresh_task
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
        {
            handle.abort();
        }
    }
}

async fn auto_refresh_loop(weak: Weak<Inner>, mut events: watch::Receiver<Option<IdentityUser>>) {
    loop {
        let delay = match weak.upgrade() {
            Some(inner) => inner.next_refresh_delay(),
            None => return,
        };

        let Some(delay) = delay else {
            // Signed out: wait for the next account change
            if events.changed().await.is_err() {
                return;
            }
            continue;
        };

        tokio::select! {
            _ = tokio::time::sleep(delay) => {},
            changed = events.changed() => {
                if changed.is_err() {
                    return;
                }
                // New sign-in or sign-out: reschedule
                continue;
            },
        }

        let retry = match weak.upgrade() {
            Some(inner) => inner.scheduled_refresh().await,
            None => return,
        };
        // Our own publish must not wake the loop early
        let _ = events.borrow_and_update();

        if let Some(retry) = retry {
            tokio::time::sleep(retry).await;
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityUser> {
        let user = self
            .inner
            .password_flow(IdentityOperation::SignIn, "signInWithPassword", email, password)
            .await?;
        info!("[IDENTITY] Signed in uid={}", user.uid);
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        let _guard = self.inner.refresh_lock.lock().await;
        self.inner.replace_session(None);
        self.inner.events.send_replace(None);
        info!("[IDENTITY] Signed out");
        Ok(())
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<IdentityUser> {
        let user = self
            .inner
            .password_flow(IdentityOperation::SignUp, "signUp", email, password)
            .await?;
        info!("[IDENTITY] Created account uid={}", user.uid);
        Ok(user)
    }

    async fn send_password_reset(&self, email: &str) -> Result<()> {
        let body = OobCodeRequest {
            request_type: "PASSWORD_RESET",
            email,
        };
        let _: serde_json::Value = self
            .inner
            .post_account(IdentityOperation::PasswordReset, "sendOobCode", &body)
            .await?;
        Ok(())
    }

    async fn id_token(&self, force_refresh: bool) -> Result<String> {
        if !force_refresh {
            match self.inner.snapshot() {
                Some(session) if self.inner.is_fresh(&session) => return Ok(session.id_token),
                Some(_) => {},
                None => {
                    return Err(BarberLinkError::Unauthorized("No signed-in user".to_string()))
                },
            }
        }

        let _guard = self.inner.refresh_lock.lock().await;
        if !force_refresh {
            // Another caller may have refreshed while we waited
            if let Some(session) = self.inner.snapshot() {
                if self.inner.is_fresh(&session) {
                    return Ok(session.id_token);
                }
            }
        }
        Ok(self.inner.refresh().await?.id_token)
    }

    fn current_user(&self) -> Option<IdentityUser> {
        self.inner.snapshot().map(|session| session.user)
    }

    fn subscribe(&self) -> IdentityEvents {
        self.inner.events.subscribe()
    }
}

impl std::fmt::Debug for FirebaseIdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseIdentityClient")
            .field("identity_url", &self.inner.identity_url)
            .field("token_url", &self.inner.token_url)
            .field("signed_in", &self.inner.snapshot().is_some())
            .finish()
    }
}

// ── Builder ─────────────────────────────────────────────────────────────────

/// Builder for [`FirebaseIdentityClient`].
#[derive(Debug, Clone)]
pub struct FirebaseIdentityClientBuilder {
    api_key: Option<String>,
    identity_url: String,
    token_url: String,
    timeouts: LinkTimeouts,
}

impl FirebaseIdentityClientBuilder {
    fn new() -> Self {
        Self {
            api_key: None,
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            timeouts: LinkTimeouts::default(),
        }
    }

    /// Web API key of the Firebase project (required).
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the Identity Toolkit base URL.
    pub fn identity_url(mut self, url: impl Into<String>) -> Self {
        self.identity_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the secure token base URL.
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeouts(mut self, timeouts: LinkTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn build(self) -> Result<FirebaseIdentityClient> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| BarberLinkError::ConfigurationError("api_key is required".into()))?;

        let http = reqwest::Client::builder()
            .connect_timeout(self.timeouts.connection_timeout)
            .timeout(self.timeouts.request_timeout)
            .build()
            .map_err(|e| {
                BarberLinkError::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?;

        let (events, _) = watch::channel(None);

        Ok(FirebaseIdentityClient {
            inner: Arc::new(Inner {
                http,
                api_key,
                identity_url: self.identity_url,
                token_url: self.token_url,
                timeouts: self.timeouts,
                session: RwLock::new(None),
                events,
                refresh_lock: Mutex::new(()),
                refresh_task: StdMutex::new(None),
            }),
        })
    }
}
