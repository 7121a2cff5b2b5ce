use std::time::Duration;

use crate::http::retry::{MAX_ATTEMPTS, RETRY_DELAY_MS};

/// Default backend location when none is supplied.
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

/// Default per-request deadline in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default path of the token-issuing endpoint, relative to the base URL.
pub const DEFAULT_CSRF_PATH: &str = "/csrf-token";

/// Settings for [`crate::http::ApiClient`]. Supplied by the caller; nothing in
/// the request layer falls back to hard-coded values.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub max_attempts: usize,
    pub retry_base_delay: Duration,
    pub csrf_path: String,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_attempts: MAX_ATTEMPTS,
            retry_base_delay: Duration::from_millis(RETRY_DELAY_MS),
            csrf_path: DEFAULT_CSRF_PATH.to_string(),
            user_agent: "scriptmarket-cli".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn with_csrf_path(mut self, path: impl Into<String>) -> Self {
        self.csrf_path = path.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
