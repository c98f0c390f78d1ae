//! Client configuration: backend location and retry policy.

use std::time::Duration;

/// Attempts per request, including the first one.
pub const DEFAULT_REQUEST_ATTEMPTS: u32 = 3;
/// Sleep between failed attempts.
pub const DEFAULT_REQUEST_BACKOFF: Duration = Duration::from_secs(5);
/// Per-attempt timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Bounded retry policy applied to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_REQUEST_ATTEMPTS,
            backoff: DEFAULT_REQUEST_BACKOFF,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attempts actually made; a zero budget still sends one request.
    pub fn effective_attempts(&self) -> u32 {
        self.attempts.max(1)
    }
}

/// Everything needed to reach a cluster.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL or bare host/IP of the cluster ingress.
    pub base_url: String,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
