//! Telegram Bot API notifier.
//!
//! Delivers plain-text alerts via the `sendMessage` endpoint as a
//! form-encoded POST with link previews disabled.

use std::sync::Arc;
use std::time::Duration;

use crate::templating::{AlertContext, TemplateRenderer, DEFAULT_CHAT_TEMPLATE};
use crate::traits::{Notifier, NotifyError};

/// Sends alerts to a Telegram chat via the Bot API.
#[derive(Debug)]
pub struct TelegramNotifier {
    bot_token: String,
    chat_id: String,
    api_base: String,
    template: String,
    renderer: Arc<TemplateRenderer>,
    client: reqwest::Client,
}

impl TelegramNotifier {
    /// Creates a new `TelegramNotifier` from configuration values.
    ///
    /// Returns [`NotifyError::Config`] if the token or chat id is empty, or
    /// the template override does not parse.
    pub fn from_config(
        bot_token: String,
        chat_id: String,
        api_base: String,
        template: Option<String>,
        renderer: Arc<TemplateRenderer>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        if bot_token.is_empty() {
            return Err(NotifyError::Config(
                "Telegram bot token must not be empty".to_string(),
            ));
        }
        if chat_id.is_empty() {
            return Err(NotifyError::Config(
                "Telegram chat id must not be empty".to_string(),
            ));
        }

        let template = template.unwrap_or_else(|| DEFAULT_CHAT_TEMPLATE.to_string());
        renderer
            .validate(&template)
            .map_err(|e| NotifyError::Config(format!("invalid chat template: {e}")))?;

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            bot_token,
            chat_id,
            api_base: api_base.trim_end_matches('/').to_string(),
            template,
            renderer,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, alert: &AlertContext) -> Result<(), NotifyError> {
        let text = self.renderer.render(&self.template, alert)?;
        let form = [
            ("chat_id", self.chat_id.as_str()),
            ("text", text.as_str()),
            ("disable_web_page_preview", "true"),
        ];

        tracing::debug!(chat_id = %self.chat_id, "Sending Telegram notification");

        let response = self
            .client
            .post(self.endpoint())
            .form(&form)
            .send()
            .await
            .map_err(NotifyError::transport)?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(chat_id = %self.chat_id, "Telegram notification sent");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();

        // Handle rate limiting (HTTP 429).
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("parameters")?.get("retry_after")?.as_u64())
                .unwrap_or(30);
            return Err(NotifyError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        Err(NotifyError::Api {
            channel: "telegram",
            status: status.as_u16(),
            body,
        })
    }

    fn channel_name(&self) -> &str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn notifier(api_base: String) -> TelegramNotifier {
        TelegramNotifier::from_config(
            "123:ABC".to_string(),
            "-100123".to_string(),
            api_base,
            None,
            Arc::new(TemplateRenderer::new()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn alert() -> AlertContext {
        AlertContext {
            keyword: "happening".to_string(),
            count: 41,
            threshold: 40,
            board: "/pol/".to_string(),
            source_url: "https://a.4cdn.org/pol/catalog.json".to_string(),
            now: "2026-02-16 12:00 UTC".to_string(),
            test: false,
        }
    }

    #[test]
    fn empty_token_rejected() {
        let result = TelegramNotifier::from_config(
            String::new(),
            "12345".to_string(),
            "https://api.telegram.org".to_string(),
            None,
            Arc::new(TemplateRenderer::new()),
            Duration::from_secs(5),
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("must not be empty"));
    }

    #[test]
    fn invalid_template_rejected() {
        let result = TelegramNotifier::from_config(
            "t".to_string(),
            "c".to_string(),
            "https://api.telegram.org".to_string(),
            Some("{{ unclosed".to_string()),
            Arc::new(TemplateRenderer::new()),
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(NotifyError::Config(msg)) if msg.contains("chat template")));
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let n = notifier("https://api.telegram.org/".to_string());
        assert_eq!(n.endpoint(), "https://api.telegram.org/bot123:ABC/sendMessage");
        assert_eq!(n.channel_name(), "telegram");
    }

    #[tokio::test]
    async fn posts_form_encoded_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bot123:ABC/sendMessage")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("chat_id".into(), "-100123".into()),
                Matcher::UrlEncoded("disable_web_page_preview".into(), "true".into()),
                Matcher::UrlEncoded(
                    "text".into(),
                    "ALERT: 'happening' count is 41 (>= 40) on /pol/ catalog.\n\
                     Time: 2026-02-16 12:00 UTC\n\
                     Source: https://a.4cdn.org/pol/catalog.json"
                        .into(),
                ),
            ]))
            .with_status(200)
            .with_body(r#"{"ok":true,"result":{}}"#)
            .create_async()
            .await;

        notifier(server.url()).send(&alert()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/bot123:ABC/sendMessage")
            .with_status(400)
            .with_body(r#"{"ok":false,"description":"Bad Request: chat not found"}"#)
            .create_async()
            .await;

        match notifier(server.url()).send(&alert()).await {
            Err(NotifyError::Api { status, body, .. }) => {
                assert_eq!(status, 400);
                assert!(body.contains("chat not found"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rate_limit_reports_retry_after() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/bot123:ABC/sendMessage")
            .with_status(429)
            .with_body(r#"{"ok":false,"parameters":{"retry_after":17}}"#)
            .create_async()
            .await;

        match notifier(server.url()).send(&alert()).await {
            Err(NotifyError::RateLimited { retry_after_secs }) => assert_eq!(retry_after_secs, 17),
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }
}
