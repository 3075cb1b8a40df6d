#![allow(dead_code)]
//! Shared fakes for the integration tests.
//!
//! - [`FakeIdentity`]: in-process identity provider that records calls
//! - [`FakeProfiles`]: profile fetcher backed by a map
//! - [`FakeServer`]: local axum server standing in for the backend and the
//!   identity REST API

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use barber_link::{
    BarberLinkError, IdentityEvents, IdentityProvider, IdentityUser, Profile, ProfileFetcher,
    Result, Role,
};
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

pub fn profile(uid: &str, name: &str, email: &str, role: Role) -> Profile {
    Profile {
        id: format!("db-{}", uid),
        name: name.to_string(),
        email: email.to_string(),
        role,
        phone: None,
        avatar_url: None,
        external_id: Some(uid.to_string()),
    }
}

pub fn token_for(uid: &str) -> String {
    format!("id-token-{}", uid)
}

// ── Identity ────────────────────────────────────────────────────────────────

struct Account {
    password: String,
    user: IdentityUser,
}

/// Identity provider with a fixed set of accounts.
///
/// Tokens are `id-token-<uid>`.
pub struct FakeIdentity {
    events: watch::Sender<Option<IdentityUser>>,
    accounts: Mutex<HashMap<String, Account>>,
    sign_in_calls: Mutex<Vec<(String, String)>>,
    sign_out_calls: AtomicUsize,
    sign_out_delay: Mutex<Duration>,
    token_unavailable: AtomicBool,
}

impl FakeIdentity {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: watch::channel(None).0,
            accounts: Mutex::new(HashMap::new()),
            sign_in_calls: Mutex::new(Vec::new()),
            sign_out_calls: AtomicUsize::new(0),
            sign_out_delay: Mutex::new(Duration::ZERO),
            token_unavailable: AtomicBool::new(false),
        })
    }

    pub fn with_account(self: Arc<Self>, email: &str, password: &str, uid: &str) -> Arc<Self> {
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user: IdentityUser::new(uid, Some(email.to_string())),
            },
        );
        self
    }

    pub fn sign_in_calls(&self) -> Vec<(String, String)> {
        self.sign_in_calls.lock().unwrap().clone()
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    pub fn set_sign_out_delay(&self, delay: Duration) {
        *self.sign_out_delay.lock().unwrap() = delay;
    }

    pub fn set_token_unavailable(&self, unavailable: bool) {
        self.token_unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityUser> {
        self.sign_in_calls
            .lock()
            .unwrap()
            .push((email.to_string(), password.to_string()));

        let user = {
            let accounts = self.accounts.lock().unwrap();
            match accounts.get(email) {
                Some(account) if account.password == password => account.user.clone(),
                _ => return Err(BarberLinkError::InvalidCredentials),
            }
        };
        self.events.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.sign_out_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.events.send_replace(None);
        Ok(())
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<IdentityUser> {
        let user = IdentityUser::new(format!("uid-{}", email), Some(email.to_string()));
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user: user.clone(),
            },
        );
        self.events.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn send_password_reset(&self, email: &str) -> Result<()> {
        if self.accounts.lock().unwrap().contains_key(email) {
            Ok(())
        } else {
            Err(BarberLinkError::NotFound("Este e-mail não está cadastrado.".into()))
        }
    }

    async fn id_token(&self, _force_refresh: bool) -> Result<String> {
        if self.token_unavailable.load(Ordering::SeqCst) {
            return Err(BarberLinkError::NetworkError("token endpoint down".into()));
        }
        self.events
            .borrow()
            .as_ref()
            .map(|user| token_for(&user.uid))
            .ok_or_else(|| BarberLinkError::Unauthorized("signed out".into()))
    }

    fn current_user(&self) -> Option<IdentityUser> {
        self.events.borrow().clone()
    }

    fn subscribe(&self) -> IdentityEvents {
        self.events.subscribe()
    }
}

// ── Profiles ────────────────────────────────────────────────────────────────

/// Profile fetcher keyed by external id.
#[derive(Default)]
pub struct FakeProfiles {
    profiles: Mutex<HashMap<String, Profile>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeProfiles {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_profile(self: Arc<Self>, profile: Profile) -> Arc<Self> {
        self.insert(profile);
        self
    }

    pub fn insert(&self, profile: Profile) {
        let uid = profile.external_id.clone().unwrap_or_default();
        self.profiles.lock().unwrap().insert(uid, profile);
    }

    /// Make every fetch fail with a network error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileFetcher for FakeProfiles {
    async fn fetch_profile(&self, external_id: &str) -> Result<Profile> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(BarberLinkError::NetworkError("connection reset".into()));
        }
        self.profiles
            .lock()
            .unwrap()
            .get(external_id)
            .cloned()
            .ok_or_else(|| BarberLinkError::NotFound(String::new()))
    }
}

// ── HTTP server ─────────────────────────────────────────────────────────────

/// Request as seen by [`FakeServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path and query, e.g. `/api/usuarios?role=barbeiro`
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }

    pub fn path_only(&self) -> &str {
        self.path.split('?').next().unwrap_or(&self.path)
    }
}

type Responder = Arc<dyn Fn(&RecordedRequest) -> (u16, Value) + Send + Sync>;

#[derive(Clone)]
struct ServerState {
    responder: Responder,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Local HTTP server answering every request through one closure.
pub struct FakeServer {
    pub addr: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl FakeServer {
    pub async fn start(
        responder: impl Fn(&RecordedRequest) -> (u16, Value) + Send + Sync + 'static,
    ) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = ServerState {
            responder: Arc::new(responder),
            requests: requests.clone(),
        };
        let app = Router::new().fallback(handle_any).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            requests,
            handle,
        }
    }

    /// Base URL for [`barber_link::BarberLinkClient`].
    pub fn api_url(&self) -> String {
        format!("{}/api", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("no request received")
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_any(
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let request = RecordedRequest {
        method: method.to_string(),
        path: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string()),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let (status, payload) = (state.responder)(&request);
    state.requests.lock().unwrap().push(request);

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if payload.is_null() {
        status.into_response()
    } else {
        (status, Json(payload)).into_response()
    }
}

/// Poll `check` until it holds or [`TEST_TIMEOUT`] passes.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + TEST_TIMEOUT;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
