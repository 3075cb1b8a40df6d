//! Timeout configuration for barber-link.
//!
//! Centralizes the durations used by the REST client and the identity
//! client's token refresh loop.

use std::time::Duration;

/// Timeout configuration for client operations.
///
/// # Examples
///
/// ```rust
/// use barber_link::LinkTimeouts;
/// use std::time::Duration;
///
/// // Defaults
/// let timeouts = LinkTimeouts::default();
///
/// // Slow mobile network
/// let timeouts = LinkTimeouts::builder()
///     .request_timeout(Duration::from_secs(60))
///     .build();
///
/// // Local development and tests
/// let timeouts = LinkTimeouts::fast();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LinkTimeouts {
    /// Timeout for establishing connections (TCP + TLS handshake).
    /// Default: 10 seconds
    pub connection_timeout: Duration,

    /// Timeout for a whole request, response body included.
    /// Default: 30 seconds
    pub request_timeout: Duration,

    /// How long before expiry an identity token is considered stale and
    /// refreshed.
    /// Default: 5 minutes
    pub token_refresh_margin: Duration,

    /// Delay before retrying a token refresh that failed on the network.
    /// Default: 30 seconds
    pub refresh_retry_delay: Duration,
}

impl Default for LinkTimeouts {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            token_refresh_margin: Duration::from_secs(300),
            refresh_retry_delay: Duration::from_secs(30),
        }
    }
}

impl LinkTimeouts {
    /// Create a new builder for custom timeout configuration.
    pub fn builder() -> LinkTimeoutsBuilder {
        LinkTimeoutsBuilder::new()
    }

    /// Short timeouts for a backend on localhost.
    pub fn fast() -> Self {
        Self {
            connection_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(5),
            token_refresh_margin: Duration::from_secs(60),
            refresh_retry_delay: Duration::from_secs(2),
        }
    }
}

/// Builder for [`LinkTimeouts`].
#[derive(Debug, Clone)]
pub struct LinkTimeoutsBuilder {
    timeouts: LinkTimeouts,
}

impl LinkTimeoutsBuilder {
    fn new() -> Self {
        Self {
            timeouts: LinkTimeouts::default(),
        }
    }

    /// Set the connection timeout (TCP + TLS handshake).
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connection_timeout = timeout;
        self
    }

    /// Set the connection timeout in seconds.
    pub fn connection_timeout_secs(self, secs: u64) -> Self {
        self.connection_timeout(Duration::from_secs(secs))
    }

    /// Set the per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.request_timeout = timeout;
        self
    }

    /// Set the per-request timeout in seconds.
    pub fn request_timeout_secs(self, secs: u64) -> Self {
        self.request_timeout(Duration::from_secs(secs))
    }

    /// Set the margin before token expiry that triggers a refresh.
    pub fn token_refresh_margin(mut self, margin: Duration) -> Self {
        self.timeouts.token_refresh_margin = margin;
        self
    }

    /// Set the token refresh margin in seconds.
    pub fn token_refresh_margin_secs(self, secs: u64) -> Self {
        self.token_refresh_margin(Duration::from_secs(secs))
    }

    /// Set the delay between failed refresh attempts.
    pub fn refresh_retry_delay(mut self, delay: Duration) -> Self {
        self.timeouts.refresh_retry_delay = delay;
        self
    }

    /// Build the timeout configuration.
    pub fn build(self) -> LinkTimeouts {
        self.timeouts
    }
}
