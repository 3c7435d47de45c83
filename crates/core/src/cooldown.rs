//! Cooldown gate backed by a one-line timestamp file.
//!
//! The file holds the Unix timestamp (floating-point seconds) of the most
//! recent recorded alarm. A missing, empty or unparseable file means "no
//! prior alarm"; reading never fails.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::Result;

/// Outcome of checking the gate at a given instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// No prior alarm, or the cooldown has elapsed.
    Open,
    /// Still inside the cooldown window.
    Suppressed {
        last_alarm: f64,
        remaining_minutes: u64,
    },
}

/// Persists and checks the last-alarm timestamp.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    path: PathBuf,
    cooldown: Duration,
}

impl CooldownGate {
    pub fn new(path: impl Into<PathBuf>, cooldown: Duration) -> Self {
        Self {
            path: path.into(),
            cooldown,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Read the last recorded alarm, or `None` if absent or unreadable.
    pub fn read_last_alarm(&self) -> Option<f64> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no alarm state file");
                return None;
            }
        };
        let trimmed = text.trim();
        match trimmed.parse::<f64>() {
            Ok(ts) if ts.is_finite() => Some(ts),
            _ => {
                warn!(
                    path = %self.path.display(),
                    content = %trimmed,
                    "unparseable alarm state, treating as no prior alarm"
                );
                None
            }
        }
    }

    /// Overwrite the state file with `now`.
    pub fn record_alarm(&self, now: f64) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, format!("{now}\n"))?;
        debug!(path = %self.path.display(), timestamp = now, "alarm recorded");
        Ok(())
    }

    /// Read the state file and decide whether an alarm at `now` may fire.
    pub fn check(&self, now: f64) -> GateDecision {
        let cooldown_secs = self.cooldown.as_secs_f64();
        match self.read_last_alarm() {
            Some(last) if should_suppress(now, Some(last), cooldown_secs) => {
                GateDecision::Suppressed {
                    last_alarm: last,
                    remaining_minutes: remaining_minutes(now, last, cooldown_secs),
                }
            }
            _ => GateDecision::Open,
        }
    }
}

/// True iff `last` is present and `now - last < cooldown_secs`.
pub fn should_suppress(now: f64, last: Option<f64>, cooldown_secs: f64) -> bool {
    match last {
        Some(last) => now - last < cooldown_secs,
        None => false,
    }
}

/// Whole minutes left in the cooldown window, rounded down.
pub fn remaining_minutes(now: f64, last: f64, cooldown_secs: f64) -> u64 {
    let remaining = cooldown_secs - (now - last);
    if remaining <= 0.0 {
        0
    } else {
        (remaining / 60.0).floor() as u64
    }
}

/// Unix timestamp of `at` as floating-point seconds (microsecond precision).
pub fn unix_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp() as f64 + f64::from(at.timestamp_subsec_micros()) / 1_000_000.0
}

/// Parse a human-readable duration string into a [`Duration`].
///
/// Supports components: `Xd` (days), `Xh` (hours), `Xm` (minutes), `Xs` (seconds).
/// Components can be combined: "2h30m", "1d12h", "90s". A bare number is seconds.
/// Returns `None` if the string is empty or unparseable.
pub fn parse_cooldown(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let mut total_secs: u64 = 0;
    let mut num_buf = String::new();
    let mut found_unit = false;

    for ch in s.chars() {
        if ch.is_ascii_digit() {
            num_buf.push(ch);
        } else {
            let n: u64 = num_buf.parse().ok()?;
            num_buf.clear();
            let unit = match ch {
                'd' => 86_400,
                'h' => 3_600,
                'm' => 60,
                's' => 1,
                _ => return None,
            };
            total_secs = total_secs.checked_add(n.checked_mul(unit)?)?;
            found_unit = true;
        }
    }

    if !num_buf.is_empty() {
        // "30m15" is ambiguous.
        if found_unit {
            return None;
        }
        total_secs = num_buf.parse().ok()?;
    }

    Some(Duration::from_secs(total_secs))
}
