//! Application configuration structures.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::collector::{DEFAULT_RETRY_INTERVAL, MIN_INTERVAL, history, ping, status};
use crate::device::{Role, Target};
use crate::watchdog::DEFAULT_RESTART_AFTER;

use super::ConfigError;

// =============================================================================
// Constants
// =============================================================================

/// Default dish gRPC address.
pub const DEFAULT_DISH_ADDRESS: &str = "192.168.100.1:9200";

/// Default router gRPC address.
pub const DEFAULT_WIFI_ADDRESS: &str = "192.168.1.1:9000";

/// Default metrics port.
pub const DEFAULT_METRICS_PORT: u16 = 2112;

/// `${NAME}` or `${NAME:-fallback}`.
static ENV_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
        .expect("env reference pattern is valid")
});

/// Replace environment references in raw config text.
///
/// Unset variables without a fallback become the empty string.
fn substitute_env(text: &str) -> String {
    ENV_REFERENCE
        .replace_all(text, |caps: &Captures<'_>| {
            let fallback = caps.get(2).map_or("", |m| m.as_str());
            std::env::var(&caps[1]).unwrap_or_else(|_| fallback.to_owned())
        })
        .into_owned()
}

/// `clap` value parser for interval flags: a humantime duration such as
/// `20s`, `4m` or `1h30m`.
///
/// ```
/// use starlink_exporter::config::parse_duration;
///
/// assert_eq!(parse_duration("4m").unwrap().as_secs(), 240);
/// assert!(parse_duration("20").is_err());
/// ```
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    match value.trim() {
        "" => Err("empty duration".to_owned()),
        trimmed => humantime::parse_duration(trimmed).map_err(|e| format!("'{trimmed}': {e}")),
    }
}

// =============================================================================
// Device Configuration
// =============================================================================

/// Device addresses, as `host:port`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DevicesConfig {
    /// Dish address (default: "192.168.100.1:9200").
    pub dish: String,

    /// Router address (default: "192.168.1.1:9000").
    pub wifi: String,
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            dish: DEFAULT_DISH_ADDRESS.to_string(),
            wifi: DEFAULT_WIFI_ADDRESS.to_string(),
        }
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Metrics server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address (default: "0.0.0.0").
    pub bind: String,

    /// Server port (default: 2112).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: DEFAULT_METRICS_PORT,
        }
    }
}

// =============================================================================
// Polling Configuration
// =============================================================================

/// Polling cadence of each collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalsConfig {
    /// Status polling interval (default: 4m).
    #[serde(with = "humantime_serde")]
    pub status: Duration,

    /// Router ping report interval (default: 1m).
    #[serde(with = "humantime_serde")]
    pub ping: Duration,

    /// History fetch interval (default: 20s). Also the replay window size.
    #[serde(with = "humantime_serde")]
    pub history: Duration,

    /// Delay before retrying a failed cycle (default: 2s).
    #[serde(with = "humantime_serde")]
    pub retry: Duration,
}

impl Default for IntervalsConfig {
    fn default() -> Self {
        Self {
            status: status::DEFAULT_INTERVAL,
            ping: ping::DEFAULT_INTERVAL,
            history: history::DEFAULT_INTERVAL,
            retry: DEFAULT_RETRY_INTERVAL,
        }
    }
}

/// Per-RPC deadlines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    #[serde(with = "humantime_serde")]
    pub status: Duration,

    #[serde(with = "humantime_serde")]
    pub ping: Duration,

    #[serde(with = "humantime_serde")]
    pub history: Duration,

    /// Connect timeout of the startup probes.
    #[serde(with = "humantime_serde")]
    pub probe_connect: Duration,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            status: status::DEFAULT_TIMEOUT,
            ping: ping::DEFAULT_TIMEOUT,
            history: history::DEFAULT_TIMEOUT,
            probe_connect: status::PROBE_CONNECT_TIMEOUT,
        }
    }
}

// =============================================================================
// Watchdog Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Request a restart after `after` of uptime (default: true).
    pub enabled: bool,

    /// Uptime before a restart is requested (default: 1h).
    #[serde(with = "humantime_serde")]
    pub after: Duration,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            after: DEFAULT_RESTART_AFTER,
        }
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level application configuration.
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub devices: DevicesConfig,
    pub server: ServerConfig,
    pub intervals: IntervalsConfig,
    pub timeouts: TimeoutsConfig,
    pub watchdog: WatchdogConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// `${VAR}` and `${VAR:-default}` references are expanded before parsing.
    /// The result is not validated yet; command-line overrides are applied
    /// first and [`validate`](Self::validate) is called afterwards.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let expanded = substitute_env(content);
        if expanded.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&expanded)?)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dish_target()?;
        self.wifi_target()?;

        self.server.bind.parse::<IpAddr>().map_err(|_| {
            ConfigError::ValidationError(format!(
                "invalid server bind address: '{}'",
                self.server.bind
            ))
        })?;

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server port must be non-zero".to_string(),
            ));
        }

        let intervals = [
            ("intervals.status", self.intervals.status),
            ("intervals.ping", self.intervals.ping),
            ("intervals.history", self.intervals.history),
            ("intervals.retry", self.intervals.retry),
        ];
        for (field, value) in intervals {
            if value < MIN_INTERVAL {
                return Err(ConfigError::ValidationError(format!(
                    "{field} must be at least {}, got {}",
                    humantime::format_duration(MIN_INTERVAL),
                    humantime::format_duration(value)
                )));
            }
        }

        let timeouts = [
            ("timeouts.status", self.timeouts.status),
            ("timeouts.ping", self.timeouts.ping),
            ("timeouts.history", self.timeouts.history),
            ("timeouts.probe_connect", self.timeouts.probe_connect),
        ];
        for (field, value) in timeouts {
            if value.is_zero() {
                return Err(ConfigError::ValidationError(format!(
                    "{field} must be non-zero"
                )));
            }
        }

        if self.watchdog.enabled && self.watchdog.after.is_zero() {
            return Err(ConfigError::ValidationError(
                "watchdog.after must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn dish_target(&self) -> Result<Target, ConfigError> {
        Target::new(Role::Dish, &self.devices.dish)
    }

    pub fn wifi_target(&self) -> Result<Target, ConfigError> {
        Target::new(Role::Wifi, &self.devices.wifi)
    }

    /// Socket address the metrics server binds to.
    pub fn metrics_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = self.server.bind.parse::<IpAddr>().map_err(|_| {
            ConfigError::ValidationError(format!(
                "invalid server bind address: '{}'",
                self.server.bind
            ))
        })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Apply a `host:port` metrics address given on the command line.
    pub fn set_metrics_addr(&mut self, addr: &str) -> Result<(), ConfigError> {
        let parsed: SocketAddr = addr.parse().map_err(|_| {
            ConfigError::ValidationError(format!("invalid metrics address: '{addr}'"))
        })?;
        self.server.bind = parsed.ip().to_string();
        self.server.port = parsed.port();
        Ok(())
    }
}
