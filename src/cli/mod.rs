// CLI module - flag parsing and wiring

use crate::config::{log_environment, TailConfig};
use crate::error::Result;
use crate::query::{format_millis, CloudWatchLogs};
use crate::session::{run_session, SessionOptions, SessionOutcome};
use crate::sink::Sink;
use crate::tail::IDLE_INTERVAL;
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;

/// Find the most recently active log stream in a CloudWatch log group and tail it
#[derive(Parser, Debug)]
#[command(name = "streamtail")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Substring the stream name must contain [default: utility]
    #[arg(short, long)]
    filter: Option<String>,

    /// How far back to look for events, e.g. 30m or 1h [default: 5m]
    #[arg(short, long)]
    since: Option<String>,

    /// Log group to search
    #[arg(short, long)]
    group: Option<String>,

    /// Load settings from a TOML or JSON file; flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// AWS region override
    #[arg(short, long)]
    region: Option<String>,

    /// Disable colored status lines
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    /// Parse arguments and run a session
    pub async fn run() -> Result<SessionOutcome> {
        let cli = Cli::parse();
        cli.execute().await
    }

    async fn execute(&self) -> Result<SessionOutcome> {
        // Fails before any network access on a bad lookback
        let config = self.resolve_config()?;
        let lookback = config.lookback()?;
        let window_start = lookback.window_start(Utc::now());

        log_environment();
        tracing::info!(
            log_group = %config.log_group,
            filter = %config.filter,
            since = %config.since,
            window_start = %format_millis(window_start),
            "starting"
        );

        let query = CloudWatchLogs::from_env(config.region.clone()).await;
        let mut sink = Sink::stdout().color(!self.no_color);

        let options = SessionOptions {
            log_group: config.log_group,
            filter: config.filter,
            window_start,
            idle_interval: IDLE_INTERVAL,
        };

        run_session(&query, &options, &mut sink, shutdown_signal()).await
    }

    /// Defaults, then the config file, then explicit flags
    fn resolve_config(&self) -> Result<TailConfig> {
        let mut config = match &self.config {
            Some(path) => TailConfig::from_file(path)?,
            None => TailConfig::default(),
        };

        if let Some(filter) = &self.filter {
            config.filter = filter.clone();
        }
        if let Some(since) = &self.since {
            config.since = since.clone();
        }
        if let Some(group) = &self.group {
            config.log_group = group.clone();
        }
        if let Some(region) = &self.region {
            config.region = Some(region.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
                    _ = sigint.recv() => tracing::info!("Received SIGINT"),
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("Failed to install signal handlers: {}", e);
            }
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
