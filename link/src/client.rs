//! Main barber-link REST client with builder pattern.
//!
//! Wraps the barbershop backend. Every request carries the identity token
//! currently in the [`TokenStore`]; a 401 response runs the registered
//! unauthorized handler (the session controller's expiry hook) before the
//! error is returned. Nothing is retried.

use std::sync::{Arc, RwLock};
use std::time::Instant;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::AuthProvider;
use crate::error::{BarberLinkError, Result};
use crate::models::envelope::Envelope;
use crate::timeouts::LinkTimeouts;
use crate::token_store::{MemoryTokenStore, TokenStore};

/// Backend used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Callback run on every 401 response.
pub type UnauthorizedHandler = Arc<dyn Fn() + Send + Sync>;

/// REST client for the barbershop backend.
///
/// Cheap to clone; clones share the HTTP pool, token store and
/// unauthorized handler.
///
/// # Examples
///
/// ```rust,no_run
/// use barber_link::{BarberLinkClient, LinkTimeouts, MemoryTokenStore};
/// use std::sync::Arc;
///
/// # async fn example() -> barber_link::Result<()> {
/// let client = BarberLinkClient::builder()
///     .base_url("http://localhost:5000/api")
///     .timeouts(LinkTimeouts::fast())
///     .token_store(Arc::new(MemoryTokenStore::new()))
///     .build()?;
///
/// let services = client.list_services(false).await?;
/// println!("{} services", services.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BarberLinkClient {
    base_url: String,
    http_client: reqwest::Client,
    token_store: Arc<dyn TokenStore>,
    unauthorized: Arc<RwLock<Option<UnauthorizedHandler>>>,
    timeouts: LinkTimeouts,
}

impl BarberLinkClient {
    /// Create a new builder for configuring the client
    pub fn builder() -> BarberLinkClientBuilder {
        BarberLinkClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeouts(&self) -> &LinkTimeouts {
        &self.timeouts
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.token_store
    }

    /// Install the global 401 interceptor, replacing any previous one.
    ///
    /// Usually wired to [`SessionController::unauthorized_handler`](crate::SessionController::unauthorized_handler).
    pub fn set_unauthorized_handler(&self, handler: UnauthorizedHandler) {
        *self
            .unauthorized
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(handler);
    }

    /// Remove the 401 interceptor.
    pub fn clear_unauthorized_handler(&self) {
        *self
            .unauthorized
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    fn notify_unauthorized(&self) {
        let handler = self
            .unauthorized
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        if let Some(handler) = handler {
            handler();
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attach auth, send, and turn non-success statuses into errors.
    pub(crate) async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        build: impl FnOnce(reqwest::RequestBuilder) -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        let url = self.url(path);
        let auth = AuthProvider::from_store(self.token_store.as_ref());
        let request = auth.apply_to_request(build(self.http_client.request(method.clone(), &url)));

        debug!(
            "[LINK_HTTP] {} {} authenticated={}",
            method,
            path,
            auth.is_authenticated()
        );
        let start = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        debug!(
            "[LINK_HTTP] Response received: status={} duration_ms={}",
            status,
            start.elapsed().as_millis()
        );

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);

        match status {
            reqwest::StatusCode::UNAUTHORIZED => {
                warn!("[LINK_HTTP] 401 on {} {}, expiring session", method, path);
                self.notify_unauthorized();
                Err(BarberLinkError::Unauthorized(message))
            },
            reqwest::StatusCode::NOT_FOUND => Err(BarberLinkError::NotFound(message)),
            _ => {
                warn!(
                    "[LINK_HTTP] Server error: status={} message=\"{}\"",
                    status, message
                );
                Err(BarberLinkError::ServerError {
                    status_code: status.as_u16(),
                    message,
                })
            },
        }
    }

    async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R> {
        let bytes = response.bytes().await?;
        let envelope: Envelope<R> = serde_json::from_slice(&bytes)?;
        Ok(envelope.into_inner())
    }

    pub(crate) async fn get_json<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<R> {
        let response = self
            .send(reqwest::Method::GET, path, |req| req.query(query))
            .await?;
        Self::decode(response).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let response = self
            .send(reqwest::Method::POST, path, |req| req.json(body))
            .await?;
        Self::decode(response).await
    }

    /// POST whose response body is ignored.
    pub(crate) async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.send(reqwest::Method::POST, path, |req| req.json(body))
            .await
            .map(|_| ())
    }

    pub(crate) async fn put_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let response = self
            .send(reqwest::Method::PUT, path, |req| req.json(body))
            .await?;
        Self::decode(response).await
    }

    pub(crate) async fn put_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.send(reqwest::Method::PUT, path, |req| req.json(body))
            .await
            .map(|_| ())
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.send(reqwest::Method::DELETE, path, |req| req)
            .await
            .map(|_| ())
    }

    pub(crate) async fn send_multipart<R: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<R> {
        let response = self.send(method, path, |req| req.multipart(form)).await?;
        Self::decode(response).await
    }
}

/// Pull a human-readable message out of a backend error body.
///
/// The backend answers `{"message": ".."}` or `{"error": ".."}`; anything
/// else is passed through verbatim.
fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("message")
            .or_else(|| value.get("error"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.trim().to_string(),
    }
}

impl std::fmt::Debug for BarberLinkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarberLinkClient")
            .field("base_url", &self.base_url)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

/// Builder for configuring [`BarberLinkClient`] instances.
pub struct BarberLinkClientBuilder {
    base_url: String,
    timeouts: LinkTimeouts,
    token_store: Option<Arc<dyn TokenStore>>,
    unauthorized: Option<UnauthorizedHandler>,
}

impl BarberLinkClientBuilder {
    fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeouts: LinkTimeouts::default(),
            token_store: None,
            unauthorized: None,
        }
    }

    /// Set the backend base URL, including the `/api` prefix.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeouts(mut self, timeouts: LinkTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Token source for the Authorization header.
    ///
    /// Defaults to an empty [`MemoryTokenStore`].
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Install the 401 interceptor up front.
    pub fn on_unauthorized(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.unauthorized = Some(Arc::new(f));
        self
    }

    /// Build the client
    pub fn build(self) -> Result<BarberLinkClient> {
        let base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(BarberLinkError::ConfigurationError(
                "base_url is required".into(),
            ));
        }
        reqwest::Url::parse(&base_url).map_err(|e| {
            BarberLinkError::ConfigurationError(format!("Invalid base_url '{}': {}", base_url, e))
        })?;

        let http_client = reqwest::Client::builder()
            .timeout(self.timeouts.request_timeout)
            .connect_timeout(self.timeouts.connection_timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| BarberLinkError::ConfigurationError(e.to_string()))?;

        Ok(BarberLinkClient {
            base_url,
            http_client,
            token_store: self
                .token_store
                .unwrap_or_else(|| Arc::new(MemoryTokenStore::new())),
            unauthorized: Arc::new(RwLock::new(self.unauthorized)),
            timeouts: self.timeouts,
        })
    }
}
