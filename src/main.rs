//! Metronome - in-process recurring-job scheduler.
//!
//! Main entry point: loads configuration, discovers plugin jobs, and runs
//! the dispatch loop plus the status endpoint until interrupted.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use serde::Deserialize;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use metronome_api::{StatusConfig, StatusServer};
use metronome_engine::{JobRegistry, Scheduler, SchedulerConfig};
use metronome_plugin::{PluginScanner, ReloadPolicy};

/// Metronome CLI.
#[derive(Parser)]
#[command(name = "metronome")]
#[command(about = "In-process recurring-job scheduler with plugin-discovered jobs")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Plugin directory (overrides the config file)
    #[arg(long)]
    plugin_dir: Option<PathBuf>,

    /// Status endpoint port (overrides the config file)
    #[arg(long)]
    port: Option<u16>,

    /// Reload plugin modules on every scan instead of honoring the
    /// modification-time watermark
    #[arg(long)]
    always_reload: bool,
}

/// Top-level configuration file layout.
#[derive(Debug, Default, Deserialize)]
struct AppConfig {
    #[serde(default)]
    scheduler: SchedulerConfig,

    #[serde(default)]
    status: StatusConfig,
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    match path {
        None => Ok(AppConfig::default()),
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&raw)?)
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(dir) = cli.plugin_dir {
        config.scheduler.plugin_dir = Some(dir);
    }
    if let Some(port) = cli.port {
        config.status.port = port;
    }

    // An unresolvable time zone is fatal: without it there is no consistent
    // reference clock.
    let timezone = config.scheduler.resolve_timezone()?;
    info!(%timezone, "reference clock configured");

    let registry = Arc::new(JobRegistry::with_history_capacity(
        timezone,
        config.scheduler.history_capacity,
    ));
    registry.set_schedule_overrides(config.scheduler.schedules.clone());

    match &config.scheduler.plugin_dir {
        Some(dir) => {
            let policy = if cli.always_reload {
                ReloadPolicy::Always
            } else {
                ReloadPolicy::ModifiedSinceLastScan
            };
            let scanner = PluginScanner::new(dir).with_policy(policy);
            scanner.discover_into(&registry);
            info!(
                dir = %dir.display(),
                jobs = registry.len(),
                "plugin discovery complete"
            );
        }
        None => info!("no plugin directory configured, skipping discovery"),
    }

    let (shutdown, cancel) = watch::channel(false);
    let server = StatusServer::new(config.status.clone(), Arc::clone(&registry));
    let server_task = tokio::spawn(async move {
        if let Err(err) = server.run(cancel).await {
            error!(%err, "status server exited");
        }
    });

    let scheduler = Scheduler::start(Arc::clone(&registry));
    info!(jobs = registry.len(), "metronome running");

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    let _ = shutdown.send(true);
    scheduler.stop().await;
    let _ = server_task.await;

    Ok(())
}
