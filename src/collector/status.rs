//! Status collectors for point-in-time device snapshots.
//!
//! - [`DishStatusCollector`]: dish identity and obstruction statistics
//! - [`WifiStatusCollector`]: router identity and headline ping quality
//! - [`probe`] / [`startup`]: one-shot reachability checks run before polling

mod dish;
mod probe;
mod wifi;

use std::time::Duration;

pub use dish::{DishStatusCollector, dish_status_points};
pub use probe::{PROBE_CONNECT_TIMEOUT, StartupPlan, probe, startup};
pub use wifi::{WifiStatusCollector, wifi_status_points};

/// Default status polling interval (4 minutes).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(4 * 60);

/// Default `GetStatus` deadline (5 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
