use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::cooldown::parse_cooldown;
use crate::error::{BoardwatchError, Result};

pub const DEFAULT_CATALOG_URL: &str = "https://a.4cdn.org/pol/catalog.json";
pub const DEFAULT_USER_AGENT: &str = "keyword-monitor/1.0 (+github actions)";
pub const DEFAULT_KEYWORD: &str = "happening";
pub const DEFAULT_THRESHOLD: u64 = 40;
pub const DEFAULT_COOLDOWN: &str = "1h";
pub const DEFAULT_STATE_FILE: &str = "last_alarm.txt";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_PUSHOVER_API_BASE: &str = "https://api.pushover.net";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Load a specific dotenv file (silently ignores if missing).
pub fn load_dotenv_from(path: &Path) {
    dotenvy::from_path(path).ok();
}

/// Key lookup used to build a [`Config`]. The process environment in
/// production, a map in tests.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn env_opt(lookup: Lookup<'_>, key: &str) -> Option<String> {
    lookup(key).filter(|s| !s.trim().is_empty())
}

fn env_or(lookup: Lookup<'_>, key: &str, default: &str) -> String {
    env_opt(lookup, key).unwrap_or_else(|| default.to_string())
}

fn env_required(lookup: Lookup<'_>, key: &str) -> Result<String> {
    env_opt(lookup, key).ok_or_else(|| BoardwatchError::MissingEnv(key.to_string()))
}

fn env_parse<T: std::str::FromStr>(lookup: Lookup<'_>, key: &str, default: T) -> Result<T> {
    match env_opt(lookup, key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            BoardwatchError::Config(format!("{key} must be an integer, got '{raw}'"))
        }),
        None => Ok(default),
    }
}

fn env_flag(lookup: Lookup<'_>, key: &str, default: bool) -> Result<bool> {
    match env_opt(lookup, key) {
        Some(raw) => parse_flag(&raw).ok_or_else(|| {
            BoardwatchError::Config(format!("{key} must be a boolean flag, got '{raw}'"))
        }),
        None => Ok(default),
    }
}

/// `1/true/yes/on` and `0/false/no/off`, case-insensitive.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Config {
    pub monitor: MonitorConfig,
    pub source: SourceConfig,
    pub cooldown: CooldownConfig,
    pub telegram: TelegramConfig,
    /// `None` when the urgent-push channel is disabled.
    pub pushover: Option<PushoverConfig>,
    pub templates: TemplateConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let urgent_push = env_flag(lookup, "URGENT_PUSH", true)?;
        Ok(Self {
            monitor: MonitorConfig::from_lookup(lookup)?,
            source: SourceConfig::from_lookup(lookup)?,
            cooldown: CooldownConfig::from_lookup(lookup)?,
            telegram: TelegramConfig::from_lookup(lookup)?,
            pushover: if urgent_push {
                Some(PushoverConfig::from_lookup(lookup)?)
            } else {
                None
            },
            templates: TemplateConfig::from_lookup(lookup),
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs)
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  monitor:   keyword='{}', threshold={}, whole_word={}",
            self.monitor.keyword,
            self.monitor.threshold,
            self.monitor.whole_word
        );
        tracing::info!(
            "  source:    url={}, timeout={}s",
            self.source.catalog_url,
            self.source.timeout_secs
        );
        match self.cooldown.window {
            Some(w) => tracing::info!(
                "  cooldown:  {}s, state_file={}",
                w.as_secs(),
                self.cooldown.state_file.display()
            ),
            None => tracing::info!("  cooldown:  disabled"),
        }
        tracing::info!("  telegram:  chat_id={}", self.telegram.chat_id);
        tracing::info!(
            "  pushover:  {}",
            if self.pushover.is_some() { "enabled" } else { "disabled" }
        );
    }

    /// Return a redacted view safe for logs and diagnostics (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "monitor": self.monitor,
            "source": self.source,
            "cooldown": {
                "enabled": self.cooldown.window.is_some(),
                "seconds": self.cooldown.window.map(|w| w.as_secs()),
                "state_file": self.cooldown.state_file,
            },
            "telegram": {
                "chat_id": self.telegram.chat_id,
                "api_base": self.telegram.api_base,
            },
            "pushover": self.pushover.as_ref().map(|p| serde_json::json!({
                "api_base": p.api_base,
                "priority": p.priority,
                "retry_secs": p.retry_secs,
                "expire_secs": p.expire_secs,
                "sound": p.sound,
            })),
            "templates": {
                "chat_override": self.templates.chat.is_some(),
                "push_override": self.templates.push.is_some(),
            },
        })
    }
}

// ── Monitor ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MonitorConfig {
    pub keyword: String,
    pub threshold: u64,
    pub whole_word: bool,
}

impl MonitorConfig {
    fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let keyword = lookup("KEYWORD").unwrap_or_else(|| DEFAULT_KEYWORD.to_string());
        if keyword.trim().is_empty() {
            return Err(BoardwatchError::Config("KEYWORD must not be empty".to_string()));
        }
        Ok(Self {
            keyword,
            threshold: env_parse(lookup, "THRESHOLD", DEFAULT_THRESHOLD)?,
            whole_word: env_flag(lookup, "WHOLE_WORD", false)?,
        })
    }
}

// ── Catalog source ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SourceConfig {
    pub catalog_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl SourceConfig {
    fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        Ok(Self {
            catalog_url: env_or(lookup, "CATALOG_URL", DEFAULT_CATALOG_URL),
            user_agent: env_or(lookup, "USER_AGENT", DEFAULT_USER_AGENT),
            timeout_secs: env_parse(lookup, "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
        })
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

// ── Cooldown ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CooldownConfig {
    /// `None` disables the gate.
    pub window: Option<Duration>,
    pub state_file: PathBuf,
}

impl CooldownConfig {
    fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let raw = env_or(lookup, "COOLDOWN", DEFAULT_COOLDOWN);
        let window = if parse_flag(&raw) == Some(false) {
            None
        } else {
            let parsed = parse_cooldown(&raw).ok_or_else(|| {
                BoardwatchError::Config(format!("COOLDOWN is not a valid duration: '{raw}'"))
            })?;
            Some(parsed).filter(|d| !d.is_zero())
        };
        Ok(Self {
            window,
            state_file: PathBuf::from(env_or(lookup, "ALARM_STATE_FILE", DEFAULT_STATE_FILE)),
        })
    }
}

// ── Telegram ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_base: String,
}

impl TelegramConfig {
    fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        Ok(Self {
            bot_token: env_required(lookup, "TELEGRAM_BOT_TOKEN")?,
            chat_id: env_required(lookup, "TELEGRAM_CHAT_ID")?,
            api_base: env_or(lookup, "TELEGRAM_API_BASE", DEFAULT_TELEGRAM_API_BASE),
        })
    }
}

// ── Pushover ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PushoverConfig {
    pub app_token: String,
    pub user_key: String,
    pub api_base: String,
    pub priority: i8,
    pub retry_secs: u64,
    pub expire_secs: u64,
    pub sound: String,
}

impl PushoverConfig {
    fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        Ok(Self {
            app_token: env_required(lookup, "PUSHOVER_APP_TOKEN")?,
            user_key: env_required(lookup, "PUSHOVER_USER_KEY")?,
            api_base: env_or(lookup, "PUSHOVER_API_BASE", DEFAULT_PUSHOVER_API_BASE),
            priority: env_parse(lookup, "PUSHOVER_PRIORITY", 2)?,
            retry_secs: env_parse(lookup, "PUSHOVER_RETRY", 30)?,
            expire_secs: env_parse(lookup, "PUSHOVER_EXPIRE", 3_600)?,
            sound: env_or(lookup, "PUSHOVER_SOUND", "echo"),
        })
    }
}

// ── Message templates ─────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct TemplateConfig {
    pub chat: Option<String>,
    pub push: Option<String>,
}

impl TemplateConfig {
    fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            chat: env_opt(lookup, "ALERT_CHAT_TEMPLATE"),
            push: env_opt(lookup, "ALERT_PUSH_TEMPLATE"),
        }
    }
}
