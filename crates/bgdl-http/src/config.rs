//! HTTP engine configuration.

use std::time::Duration;

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default redirect limit.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;
/// Default capacity of the completion broadcast channel.
pub const DEFAULT_SIGNAL_CAPACITY: usize = 64;

/// `User-Agent` sent when none is configured.
pub fn default_user_agent() -> String {
    format!("bgdl-http/{}", env!("CARGO_PKG_VERSION"))
}

/// Configuration for the HTTP transfer engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpEngineConfig {
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Limit on establishing a connection. Body reads are not time-limited.
    pub connect_timeout: Duration,
    /// Redirects followed before a transfer fails.
    pub max_redirects: usize,
    /// Buffered completion signals per subscriber.
    pub signal_capacity: usize,
}

impl Default for HttpEngineConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            signal_capacity: DEFAULT_SIGNAL_CAPACITY,
        }
    }
}

impl HttpEngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Set the completion channel capacity (at least 1).
    #[must_use]
    pub fn with_signal_capacity(mut self, capacity: usize) -> Self {
        self.signal_capacity = capacity.max(1);
        self
    }
}
