//! Starlink Exporter
//!
//! Polls a Starlink dish and wifi router over their local gRPC API and
//! exposes the readings as Prometheus gauges. The library holds every piece
//! of the exporter; the `starlink-exporter` binary wires them together.
//!
//! # Architecture
//!
//! - **Device**: targets, protobuf messages and the gRPC client
//! - **Collectors**: status snapshots, router ping report, dish history replay
//! - **Sink**: write-only gauge storage backed by a Prometheus registry
//! - **Server**: `/metrics` scrape endpoint and `/healthz`
//! - **Watchdog**: periodic restart request to the process supervisor
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use starlink_exporter::collector::history::HistoryReplayer;
//! use starlink_exporter::{AppConfig, CollectorRegistry, GrpcDialer, PrometheusSink, Schedule};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let sink = Arc::new(PrometheusSink::new()?);
//! let registry = CollectorRegistry::new(Arc::new(GrpcDialer::new()), sink.clone());
//!
//! let schedule = Schedule::interval(config.intervals.history)
//!     .with_timeout(config.timeouts.history);
//! registry
//!     .spawn(HistoryReplayer::new(config.dish_target()?, schedule, sink.clone()))
//!     .await?;
//!
//! println!("{}", sink.encode_text()?);
//! registry.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod device;
pub mod server;
pub mod sink;
pub mod watchdog;

pub use collector::{Collector, CollectorError, CollectorRegistry, Schedule};
pub use config::{AppConfig, ConfigError};
pub use device::{Dialer, GrpcDialer, Role, Target};
pub use sink::{MetricPoint, MetricSink, PrometheusSink, SinkError};
pub use watchdog::{RESTART_EXIT_CODE, RestartRequested, Watchdog};
