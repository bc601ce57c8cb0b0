//! Ping collectors for per-destination ping quality reported by the router.
//!
//! - [`PingCollector`]: router `GetPing` results, one label set per destination

mod collector;

pub use collector::{DEFAULT_INTERVAL, DEFAULT_TIMEOUT, PingCollector, ping_points};
