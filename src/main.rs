//! Starlink Exporter Binary Entry Point
//!
//! Probes the devices, starts every collector and serves `/metrics` until
//! shutdown or until the restart watchdog fires.

use std::future::IntoFuture;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use starlink_exporter::{
    AppConfig, CollectorRegistry, ConfigError, Dialer, GrpcDialer, PrometheusSink,
    RESTART_EXIT_CODE, RestartRequested, Schedule, Watchdog,
    collector::{history::HistoryReplayer, ping::PingCollector, status},
    config::parse_duration,
    server::{AppState, create_router},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Prometheus exporter for Starlink dish and router telemetry
#[derive(Parser, Debug)]
#[command(name = "starlink-exporter", version, about, long_about = None)]
struct Cli {
    /// Path to an optional YAML configuration file
    #[arg(short, long, env = "STARLINK_EXPORTER_CONFIG")]
    config: Option<PathBuf>,

    /// Dish gRPC address, host:port
    #[arg(long, env = "STARLINK_EXPORTER_DISH_ADDR")]
    dish_addr: Option<String>,

    /// Wifi router gRPC address, host:port
    #[arg(long, env = "STARLINK_EXPORTER_WIFI_ADDR")]
    wifi_addr: Option<String>,

    /// Metrics listen address, ip:port
    #[arg(long, env = "STARLINK_EXPORTER_METRICS_ADDR")]
    metrics_addr: Option<String>,

    /// Status polling interval (e.g. 4m)
    #[arg(long, env = "STARLINK_EXPORTER_STATUS_INTERVAL", value_parser = parse_duration)]
    status_interval: Option<Duration>,

    /// Router ping report interval (e.g. 1m)
    #[arg(long, env = "STARLINK_EXPORTER_PING_INTERVAL", value_parser = parse_duration)]
    ping_interval: Option<Duration>,

    /// History fetch interval, also the replay window in seconds (e.g. 20s)
    #[arg(long, env = "STARLINK_EXPORTER_HISTORY_INTERVAL", value_parser = parse_duration)]
    history_interval: Option<Duration>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,starlink_exporter=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // Armed before anything can block so uptime is bounded from process start.
    let watchdog = config
        .watchdog
        .enabled
        .then(|| Watchdog::start(config.watchdog.after));

    let dish = config.dish_target()?;
    let wifi = config.wifi_target()?;
    tracing::info!(
        dish = %dish,
        wifi = %wifi,
        status = %humantime::format_duration(config.intervals.status),
        ping = %humantime::format_duration(config.intervals.ping),
        history = %humantime::format_duration(config.intervals.history),
        "Starlink exporter starting"
    );

    let dialer: Arc<dyn Dialer> = Arc::new(GrpcDialer::new());

    let plan = status::startup(
        dialer.as_ref(),
        &dish,
        &wifi,
        config.timeouts.probe_connect,
        config.timeouts.status,
    )
    .await?;

    let sink = Arc::new(PrometheusSink::new()?);
    let registry = CollectorRegistry::new(Arc::clone(&dialer), sink.clone())
        .with_retry_interval(config.intervals.retry);

    let status_schedule =
        Schedule::interval(config.intervals.status).with_timeout(config.timeouts.status);
    registry
        .spawn(status::DishStatusCollector::new(
            dish.clone(),
            status_schedule,
            sink.clone(),
        ))
        .await?;
    if plan.wifi_status_enabled() {
        registry
            .spawn(status::WifiStatusCollector::new(
                wifi.clone(),
                status_schedule,
                sink.clone(),
            ))
            .await?;
    }
    registry
        .spawn(PingCollector::new(
            wifi,
            Schedule::interval(config.intervals.ping).with_timeout(config.timeouts.ping),
            sink.clone(),
        ))
        .await?;
    registry
        .spawn(HistoryReplayer::new(
            dish,
            Schedule::interval(config.intervals.history).with_timeout(config.timeouts.history),
            sink.clone(),
        ))
        .await?;
    tracing::info!(collectors = registry.job_count().await, "Collectors started");

    let app = create_router(AppState { sink });
    let addr = config.metrics_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("metrics available at http://{}/metrics", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    tokio::select! {
        result = server.into_future() => result?,
        restart = restart_requested(watchdog) => {
            tracing::warn!(reason = %restart, exit_code = RESTART_EXIT_CODE, "Exiting for restart");
            std::process::exit(RESTART_EXIT_CODE);
        }
    }

    tracing::info!("Shutting down collectors...");
    registry.shutdown().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Build the effective configuration (CLI > ENV > file > defaults).
fn load_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            AppConfig::load(path)?
        }
        None => AppConfig::default(),
    };

    if let Some(addr) = &cli.dish_addr {
        config.devices.dish = addr.clone();
    }
    if let Some(addr) = &cli.wifi_addr {
        config.devices.wifi = addr.clone();
    }
    if let Some(addr) = &cli.metrics_addr {
        config.set_metrics_addr(addr)?;
    }
    if let Some(interval) = cli.status_interval {
        config.intervals.status = interval;
    }
    if let Some(interval) = cli.ping_interval {
        config.intervals.ping = interval;
    }
    if let Some(interval) = cli.history_interval {
        config.intervals.history = interval;
    }

    config.validate()?;
    Ok(config)
}

/// Resolve when the watchdog fires; never when it is disabled.
async fn restart_requested(watchdog: Option<Watchdog>) -> RestartRequested {
    match watchdog {
        Some(watchdog) => watchdog.expired().await,
        None => std::future::pending().await,
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}
