//! Builds the notification channels described by [`Config`].

use std::sync::Arc;

use boardwatch_core::Config;
use boardwatch_notify::{
    Dispatcher, Notifier, NotifyError, PushoverNotifier, PushoverParams, TelegramNotifier,
    TemplateRenderer,
};

/// Urgent push first (when enabled), then the chat message.
pub fn build_dispatcher(config: &Config) -> Result<Dispatcher, NotifyError> {
    let renderer = Arc::new(TemplateRenderer::new());
    let timeout = config.http_timeout();
    let mut channels: Vec<Box<dyn Notifier>> = Vec::with_capacity(2);

    if let Some(push) = &config.pushover {
        channels.push(Box::new(PushoverNotifier::from_config(
            push.app_token.clone(),
            push.user_key.clone(),
            push.api_base.clone(),
            PushoverParams {
                priority: push.priority,
                retry_secs: push.retry_secs,
                expire_secs: push.expire_secs,
                sound: push.sound.clone(),
            },
            config.templates.push.clone(),
            renderer.clone(),
            timeout,
        )?));
    }

    channels.push(Box::new(TelegramNotifier::from_config(
        config.telegram.bot_token.clone(),
        config.telegram.chat_id.clone(),
        config.telegram.api_base.clone(),
        config.templates.chat.clone(),
        renderer,
        timeout,
    )?));

    Ok(Dispatcher::new(channels))
}
