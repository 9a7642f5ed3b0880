//! Client and apply configuration.

use std::time::Duration;

/// API root used when none is configured.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8081/api";

/// Per-request deadline used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// How to reach the Moira API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, e.g. `http://moira.local/api`. A trailing `/` is ignored.
    pub base_url: String,
    /// Deadline for each individual request. There are no retries.
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `base_url` without trailing slashes.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("moira-dumper/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Knobs for the apply path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Decide and report, but issue no write calls.
    pub dry_run: bool,
    /// Also create/update subscriptions after their contacts are resolved.
    pub upload_subscriptions: bool,
}
