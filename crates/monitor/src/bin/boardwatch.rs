//! boardwatch — one-shot keyword alarm for a board catalog.
//!
//! Meant to be run from cron or a CI schedule. Exits 0 on a normal pass
//! (including "below threshold" and "in cooldown"), non-zero on any error.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::info;

use boardwatch_core::config::{self, Config};
use boardwatch_monitor::channels::build_dispatcher;
use boardwatch_monitor::{Outcome, Runner};

// ── CLI ─────────────────────────────────────────────────────────────

/// Count a keyword in a board catalog and alert when it crosses a threshold.
#[derive(Parser, Debug)]
#[command(name = "boardwatch", version, about)]
struct Cli {
    /// Fetch and count only; never notify or touch the cooldown state.
    #[arg(long, conflicts_with = "test_notify")]
    dry_run: bool,

    /// Send a test notification through every channel and exit.
    #[arg(long)]
    test_notify: bool,

    /// Dotenv file to load before reading the environment (ignored if missing).
    #[arg(long, env = "BOARDWATCH_ENV_FILE", default_value = ".env")]
    env_file: PathBuf,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the operator status lines; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    config::load_dotenv_from(&cli.env_file);
    let config = Config::from_env().context("failed to load configuration")?;
    config.log_summary();

    let dispatcher = build_dispatcher(&config).context("failed to set up notification channels")?;
    info!(channels = ?dispatcher.channel_names(), "notification channels ready");

    if cli.test_notify {
        let results = dispatcher.test_all().await;
        let failed: Vec<&str> = results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.channel.as_str())
            .collect();
        if !failed.is_empty() {
            bail!("test notification failed on: {}", failed.join(", "));
        }
        info!("test notification delivered on every channel");
        return Ok(());
    }

    let runner = Runner::new(&config, dispatcher).context("failed to set up monitor")?;
    let now = Utc::now();

    let outcome = if cli.dry_run {
        runner.dry_run(now).await?
    } else {
        runner.run_once(now).await?
    };

    match outcome {
        Outcome::Alerted { count, results } => {
            info!(count, channels = results.len(), "pass finished: alarm sent")
        }
        Outcome::Suppressed {
            count,
            remaining_minutes,
        } => info!(count, remaining_minutes, "pass finished: alarm suppressed"),
        Outcome::BelowThreshold { count } => info!(count, "pass finished: below threshold"),
        Outcome::DryRun { count, would_alert } => {
            info!(count, would_alert, "pass finished: dry run")
        }
    }

    Ok(())
}
