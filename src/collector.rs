//! Collector Layer
//!
//! Periodic polling of the dish and router. Each collector runs in its own
//! Tokio task owned by the [`CollectorRegistry`], dials a fresh connection
//! every cycle and writes gauges straight into the shared metric sink.
//!
//! # Architecture
//!
//! - [`Collector`]: one device query plus its metric mapping
//! - [`Schedule`]: polling interval and per-call deadline
//! - [`CollectorRegistry`]: task lifecycle, retry loop and graceful shutdown
//!
//! # Collectors
//!
//! - [`status`]: dish and router status snapshots
//! - [`ping`]: router ping report
//! - [`history`]: dish history replay
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use starlink_exporter::collector::status::DishStatusCollector;
//! use starlink_exporter::{CollectorRegistry, GrpcDialer, PrometheusSink, Role, Schedule, Target};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let sink = Arc::new(PrometheusSink::new()?);
//! let registry = CollectorRegistry::new(Arc::new(GrpcDialer::new()), sink.clone());
//! let dish = Target::new(Role::Dish, "192.168.100.1:9200")?;
//! let schedule = Schedule::interval(Duration::from_secs(240));
//! registry
//!     .spawn(DishStatusCollector::new(dish, schedule, sink))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod history;
pub mod ping;
mod registry;
pub mod status;
#[cfg(test)]
pub(crate) mod testing;
mod traits;

pub use registry::{
    CollectorRegistry, DEFAULT_RETRY_INTERVAL, DEFAULT_SHUTDOWN_TIMEOUT, ShutdownSignal,
};
pub use traits::{
    Collector, CollectorError, CollectorState, DEFAULT_RPC_TIMEOUT, MIN_INTERVAL, Schedule,
};
