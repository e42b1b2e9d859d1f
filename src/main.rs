//! recipe-gate - support tool for the on-device quota store
//!
//! Inspects and resets the file-backed state the engine keeps between
//! launches. Runs without a subscription backend: entitlement is read from
//! the cache only.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recipe_gate::adapters::{FileDurableStore, OfflineEntitlementProvider, SystemClock};
use recipe_gate::application::EntitlementGate;
use recipe_gate::config::{AppConfig, TelemetryConfig};
use recipe_gate::domain::entitlement::EntitlementSnapshot;
use recipe_gate::domain::gating::Verdict;
use recipe_gate::domain::usage::{MeteredAction, UsageCounters};

#[derive(Debug, Parser)]
#[command(name = "recipe-gate", version, about = "Inspect and reset recipe quota state")]
struct Cli {
    /// Override the configured data directory
    #[arg(long, global = true)]
    data_dir: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print cached entitlement, today's usage and verdicts as YAML
    Status,
    /// Zero today's usage counters
    ResetUsage,
    /// Forget the cached entitlement
    Logout,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    entitlement: EntitlementSnapshot,
    usage: UsageCounters,
    verdicts: Vec<ActionVerdict>,
}

#[derive(Debug, Serialize)]
struct ActionVerdict {
    action: MeteredAction,
    verdict: Verdict,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load().context("failed to load configuration")?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }
    config.validate().context("invalid configuration")?;

    init_tracing(&config.telemetry);

    let clock = config
        .quota
        .utc_offset()
        .map(SystemClock::new)
        .context("utc offset out of range")?;
    let gate = EntitlementGate::from_config(
        &config,
        Arc::new(FileDurableStore::new(&config.storage.data_dir)),
        Arc::new(OfflineEntitlementProvider),
        Arc::new(clock),
    );

    match cli.command {
        Command::Status => {
            let report = status(&gate).await?;
            print!("{}", serde_yaml::to_string(&report)?);
        }
        Command::ResetUsage => {
            gate.reset_usage().await?;
            tracing::info!(data_dir = %config.storage.data_dir.display(), "usage reset");
        }
        Command::Logout => {
            gate.logout().await?;
            tracing::info!(data_dir = %config.storage.data_dir.display(), "entitlement cleared");
        }
    }

    Ok(())
}

async fn status(gate: &EntitlementGate) -> anyhow::Result<StatusReport> {
    let entitlement = gate.current_entitlement().await?;
    let usage = gate.usage_today().await?;

    let mut verdicts = Vec::with_capacity(MeteredAction::ALL.len());
    for action in MeteredAction::ALL {
        let result = gate.can_perform(action).await?;
        verdicts.push(ActionVerdict {
            action,
            verdict: result.verdict,
        });
    }

    Ok(StatusReport {
        entitlement,
        usage,
        verdicts,
    })
}

fn init_tracing(telemetry: &TelemetryConfig) {
    let filter =
        EnvFilter::try_new(&telemetry.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if telemetry.json_logs() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
