//! Alert delivery for keyword alarms.
//!
//! This crate provides:
//! - `Notifier` trait for pluggable notification channels
//! - Telegram (chat) and Pushover (urgent push) notifier implementations
//! - Minijinja template rendering for alert messages
//! - Dispatcher that delivers one alert to every configured channel

pub mod dispatcher;
pub mod pushover;
pub mod telegram;
pub mod templating;
pub mod traits;

pub use dispatcher::Dispatcher;
pub use pushover::{PushoverNotifier, PushoverParams};
pub use telegram::TelegramNotifier;
pub use templating::{AlertContext, TemplateRenderer};
pub use traits::{DispatchResult, Notifier, NotifyError};
