use std::env;
use std::time::Duration;

use tracing::warn;

/// Backend used when `RESERVATION_API_URL` is not set
pub const DEFAULT_RESERVATION_API_URL: &str = "http://localhost:8081/api";
/// Request timeout used when `RESERVATION_API_TIMEOUT_SECS` is not set
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where and how to reach the reservation backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL including the `/api` prefix
    pub base_url: String,
    /// Timeout applied to every request
    pub timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RESERVATION_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("booking-wizard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Reads `RESERVATION_API_URL` and `RESERVATION_API_TIMEOUT_SECS`, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = env::var("RESERVATION_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(defaults.base_url);

        let timeout = match env::var("RESERVATION_API_TIMEOUT_SECS") {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(
                        "Ignoring invalid RESERVATION_API_TIMEOUT_SECS value '{}'",
                        raw
                    );
                    defaults.timeout
                }
            },
            Err(_) => defaults.timeout,
        };

        Self {
            base_url,
            timeout,
            user_agent: defaults.user_agent,
        }
    }

    /// Overrides the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Base URL without a trailing slash
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
