//! One monitoring pass: fetch → count → threshold → cooldown gate → dispatch.
//!
//! The runner is invoked once per process; periodic execution is left to an
//! external scheduler. The clock is passed in so a pass is deterministic.

use boardwatch_core::config::MonitorConfig;
use boardwatch_core::cooldown::unix_seconds;
use boardwatch_core::{Config, CooldownGate, GateDecision, KeywordCounter};
use boardwatch_notify::{AlertContext, DispatchResult, Dispatcher};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::{MonitorError, Result};
use crate::fetcher::CatalogFetcher;

/// Timestamp format used in status lines and alert messages.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// What a single pass ended up doing.
#[derive(Debug)]
pub enum Outcome {
    BelowThreshold {
        count: u64,
    },
    Suppressed {
        count: u64,
        remaining_minutes: u64,
    },
    Alerted {
        count: u64,
        results: Vec<DispatchResult>,
    },
    DryRun {
        count: u64,
        would_alert: bool,
    },
}

pub struct Runner {
    monitor: MonitorConfig,
    fetcher: CatalogFetcher,
    counter: KeywordCounter,
    /// `None` when the cooldown is disabled.
    gate: Option<CooldownGate>,
    dispatcher: Dispatcher,
}

impl Runner {
    pub fn new(config: &Config, dispatcher: Dispatcher) -> Result<Self> {
        let fetcher = CatalogFetcher::new(&config.source)?;
        let gate = config
            .cooldown
            .window
            .map(|window| CooldownGate::new(config.cooldown.state_file.clone(), window));
        Self::from_parts(config.monitor.clone(), fetcher, gate, dispatcher)
    }

    pub fn from_parts(
        monitor: MonitorConfig,
        fetcher: CatalogFetcher,
        gate: Option<CooldownGate>,
        dispatcher: Dispatcher,
    ) -> Result<Self> {
        let counter = KeywordCounter::new(&monitor.keyword, monitor.whole_word)?;
        Ok(Self {
            monitor,
            fetcher,
            counter,
            gate,
            dispatcher,
        })
    }

    /// Fetch the catalog and count the keyword.
    pub async fn count(&self) -> Result<u64> {
        let catalog = self.fetcher.fetch().await?;
        let count = self.counter.count(&catalog) as u64;
        info!(
            keyword = %self.monitor.keyword,
            count,
            threshold = self.monitor.threshold,
            threads = catalog.thread_count(),
            "keyword counted"
        );
        Ok(count)
    }

    /// Run one full pass at instant `now`.
    ///
    /// The alarm is recorded after dispatch, and only when at least one
    /// channel delivered. Any failed channel makes the pass fail with
    /// [`MonitorError::Delivery`].
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<Outcome> {
        let count = self.count().await?;
        let stamp = now.format(TIME_FORMAT).to_string();

        if count < self.monitor.threshold {
            println!(
                "{}",
                status_line(&stamp, &self.monitor.keyword, count, self.monitor.threshold)
            );
            return Ok(Outcome::BelowThreshold { count });
        }

        let now_secs = unix_seconds(now);
        if let Some(gate) = &self.gate {
            if let GateDecision::Suppressed {
                remaining_minutes, ..
            } = gate.check(now_secs)
            {
                info!(
                    count,
                    remaining_minutes, "threshold reached but alarm is in cooldown"
                );
                println!(
                    "{stamp} COOLDOWN: '{}' count={count}, threshold={}, {remaining_minutes} min remaining",
                    self.monitor.keyword, self.monitor.threshold
                );
                return Ok(Outcome::Suppressed {
                    count,
                    remaining_minutes,
                });
            }
        }

        let alert = self.alert_context(count, stamp);
        let results = self.dispatcher.dispatch(&alert).await;

        let delivered = results.iter().filter(|r| r.success).count();
        let failed: Vec<String> = results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.channel.clone())
            .collect();

        if delivered > 0 {
            if let Some(gate) = &self.gate {
                gate.record_alarm(now_secs)?;
            }
        } else {
            warn!(count, "no channel delivered the alarm; cooldown not recorded");
        }

        if !failed.is_empty() {
            return Err(MonitorError::Delivery { failed, delivered });
        }

        info!(count, channels = delivered, "alarm delivered");
        Ok(Outcome::Alerted { count, results })
    }

    /// Fetch and count, report what a real pass would do, touch nothing.
    pub async fn dry_run(&self, now: DateTime<Utc>) -> Result<Outcome> {
        let count = self.count().await?;
        let stamp = now.format(TIME_FORMAT).to_string();

        let over = count >= self.monitor.threshold;
        let suppressed = over
            && self.gate.as_ref().is_some_and(|gate| {
                matches!(gate.check(unix_seconds(now)), GateDecision::Suppressed { .. })
            });
        let would_alert = over && !suppressed;

        println!(
            "{stamp} DRY-RUN: '{}' count={count}, threshold={}, would_alert={would_alert}{}",
            self.monitor.keyword,
            self.monitor.threshold,
            if suppressed { " (cooldown active)" } else { "" }
        );
        Ok(Outcome::DryRun { count, would_alert })
    }

    fn alert_context(&self, count: u64, now: String) -> AlertContext {
        AlertContext {
            keyword: self.monitor.keyword.clone(),
            count,
            threshold: self.monitor.threshold,
            board: self.fetcher.board_label(),
            source_url: self.fetcher.url().to_string(),
            now,
            test: false,
        }
    }
}

/// Operator-facing line for a run that stayed below the threshold.
pub fn status_line(now: &str, keyword: &str, count: u64, threshold: u64) -> String {
    format!("{now} OK: '{keyword}' count={count}, threshold={threshold}")
}
