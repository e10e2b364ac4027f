//! HTTP server exposing recent CPU utilization history.
//!
//! Samples host CPU usage into a ringstat buffer on a dedicated thread and
//! serves windows of that history over HTTP. See [`api`] for the endpoints.

mod api;
mod cpu;

use std::time::Duration;

use clap::Parser;
use ringstat::config::{RetentionConfig, SamplerPolicy};
use ringstat::health::Health;
use ringstat::sampler::{SAMPLER_THREAD_NAME, Sampler};
use ringstat::shared;
use tracing_subscriber::EnvFilter;

use crate::api::ApiState;
use crate::cpu::CpuUsage;

/// ringstat-server: CPU utilization history over HTTP.
#[derive(Parser)]
#[command(name = "ringstat-server", version, about)]
struct Cli {
    /// Port to listen on.
    #[arg(short, long, default_value = "2137")]
    port: u16,

    /// Frequency at which samples are taken, in milliseconds.
    #[arg(short, long, default_value = "100")]
    frequency: u64,

    /// How much history to keep, in seconds.
    #[arg(short, long, default_value = "60")]
    limit: u64,

    /// Consecutive sampling failures tolerated before sampling stops.
    #[arg(long, default_value = "3")]
    max_failures: u32,

    /// Pause between a failed sample and the retry, in milliseconds.
    #[arg(long, default_value = "1000")]
    retry_backoff: u64,

    /// Exit the process when sampling stops instead of reporting it on /health.
    #[arg(long)]
    exit_on_failure: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("ringstat-server failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = RetentionConfig::new(
        Duration::from_millis(cli.frequency),
        Duration::from_secs(cli.limit),
    )?;
    let policy = SamplerPolicy {
        max_consecutive_failures: cli.max_failures,
        retry_backoff: Duration::from_millis(cli.retry_backoff),
    };

    if config.frequency < sysinfo::MINIMUM_CPU_UPDATE_INTERVAL {
        tracing::warn!(
            frequency = ?config.frequency,
            minimum = ?sysinfo::MINIMUM_CPU_UPDATE_INTERVAL,
            "sampling faster than the recommended CPU refresh interval, readings may be noisy"
        );
    }

    let (writer, reader) = shared::channel(&config)?;
    let health = Health::new();

    let sampler = Sampler::new(CpuUsage::new(), writer, config.frequency)
        .with_policy(policy)
        .with_health(health.clone());
    spawn_sampler(sampler, cli.exit_on_failure)?;

    tracing::info!(
        frequency = ?config.frequency,
        retention = ?config.retention,
        slots = config.slot_count(),
        "sampler started"
    );

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cli.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    let router = api::build_router(ApiState { reader, health });
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Runs the sampler on its own thread.
///
/// With `exit_on_failure`, the process exits with status 1 once sampling
/// stops; otherwise the failure stays visible on `/health`.
fn spawn_sampler(sampler: Sampler<CpuUsage>, exit_on_failure: bool) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name(SAMPLER_THREAD_NAME.to_string())
        .spawn(move || match sampler.run() {
            Ok(never) => match never {},
            Err(e) => {
                if exit_on_failure {
                    tracing::error!("sampling stopped, exiting: {e}");
                    std::process::exit(1);
                }
                tracing::error!("sampling stopped, serving stale data: {e}");
            }
        })?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["ringstat-server"]).unwrap();

        assert_eq!(cli.port, 2137);
        assert_eq!(cli.frequency, 100);
        assert_eq!(cli.limit, 60);
        assert_eq!(cli.max_failures, 3);
        assert_eq!(cli.retry_backoff, 1000);
        assert!(!cli.exit_on_failure);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli =
            Cli::try_parse_from(["ringstat-server", "-p", "8080", "-f", "250", "-l", "120"]).unwrap();

        assert_eq!(cli.port, 8080);
        assert_eq!(cli.frequency, 250);
        assert_eq!(cli.limit, 120);
    }
}
