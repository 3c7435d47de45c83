//! Pushover emergency-priority notifier.
//!
//! Emergency priority (2) makes the recipient's device repeat the alert every
//! `retry` seconds until acknowledged or until `expire` seconds have passed.

use std::sync::Arc;
use std::time::Duration;

use crate::templating::{AlertContext, TemplateRenderer, DEFAULT_PUSH_TEMPLATE};
use crate::traits::{Notifier, NotifyError};

/// Delivery parameters for urgent pushes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushoverParams {
    pub priority: i8,
    /// Seconds between repeats (Pushover minimum is 30).
    pub retry_secs: u64,
    /// Seconds after which repeating stops.
    pub expire_secs: u64,
    pub sound: String,
}

impl Default for PushoverParams {
    fn default() -> Self {
        Self {
            priority: 2,
            retry_secs: 30,
            expire_secs: 3_600,
            sound: "echo".to_string(),
        }
    }
}

/// Sends urgent alerts via the Pushover messages API.
#[derive(Debug)]
pub struct PushoverNotifier {
    app_token: String,
    user_key: String,
    api_base: String,
    params: PushoverParams,
    template: String,
    renderer: Arc<TemplateRenderer>,
    client: reqwest::Client,
}

impl PushoverNotifier {
    pub fn from_config(
        app_token: String,
        user_key: String,
        api_base: String,
        params: PushoverParams,
        template: Option<String>,
        renderer: Arc<TemplateRenderer>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        if app_token.is_empty() || user_key.is_empty() {
            return Err(NotifyError::Config(
                "Pushover app token and user key must not be empty".to_string(),
            ));
        }

        let template = template.unwrap_or_else(|| DEFAULT_PUSH_TEMPLATE.to_string());
        renderer
            .validate(&template)
            .map_err(|e| NotifyError::Config(format!("invalid push template: {e}")))?;

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            app_token,
            user_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            params,
            template,
            renderer,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/1/messages.json", self.api_base)
    }
}

#[async_trait::async_trait]
impl Notifier for PushoverNotifier {
    async fn send(&self, alert: &AlertContext) -> Result<(), NotifyError> {
        let message = self.renderer.render(&self.template, alert)?;
        let priority = self.params.priority.to_string();
        let retry = self.params.retry_secs.to_string();
        let expire = self.params.expire_secs.to_string();
        let form = [
            ("token", self.app_token.as_str()),
            ("user", self.user_key.as_str()),
            ("message", message.as_str()),
            ("priority", priority.as_str()),
            ("retry", retry.as_str()),
            ("expire", expire.as_str()),
            ("sound", self.params.sound.as_str()),
        ];

        tracing::debug!(
            priority = self.params.priority,
            retry_secs = self.params.retry_secs,
            expire_secs = self.params.expire_secs,
            "Sending Pushover notification"
        );

        let response = self
            .client
            .post(self.endpoint())
            .form(&form)
            .send()
            .await
            .map_err(NotifyError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "Pushover returned non-2xx status");
            return Err(NotifyError::Api {
                channel: "pushover",
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!("Pushover notification sent");
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "pushover"
    }
}
