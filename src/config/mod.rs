//! Configuration module for the exporter.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Device addresses (dish, wifi router)
//! - Metrics server bind address
//! - Polling intervals, RPC timeouts and the restart watchdog
//!
//! Command-line flags override file values; see the binary for the flags.

mod app;
mod error;

pub use app::{
    AppConfig, DevicesConfig, IntervalsConfig, ServerConfig, TimeoutsConfig, WatchdogConfig,
    parse_duration,
};
pub use error::ConfigError;

// Re-export constants
pub use app::{DEFAULT_DISH_ADDRESS, DEFAULT_METRICS_PORT, DEFAULT_WIFI_ADDRESS};
