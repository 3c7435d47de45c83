//! Notifier trait definition and shared error types.

use crate::templating::AlertContext;

/// Errors that can occur during notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{channel} API returned {status}: {body}")]
    Api {
        channel: &'static str,
        status: u16,
        body: String,
    },

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

impl NotifyError {
    /// Wrap a transport error with the request URL stripped, since channel
    /// URLs can embed credentials.
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}

/// Trait for notification channel implementations.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver an alert through this channel.
    async fn send(&self, alert: &AlertContext) -> Result<(), NotifyError>;

    /// Test connectivity with a sample alert marked as a test.
    async fn test(&self) -> Result<(), NotifyError> {
        self.send(&AlertContext::test_sample()).await
    }

    /// Human-readable name for this channel (e.g., "telegram", "pushover").
    fn channel_name(&self) -> &str;
}

/// Result of delivering an alert to a single channel.
#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub channel: String,
    pub success: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}
