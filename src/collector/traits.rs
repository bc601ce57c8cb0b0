//! Core collector traits and types.

use std::time::Duration;

use thiserror::Error;

use crate::device::{DeviceClient, Target};
use crate::sink::SinkError;

/// Minimum allowed interval (1 second).
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Fallback per-RPC deadline when a schedule does not set one.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur during collection.
///
/// None of these are fatal to a running collector: the registry logs them,
/// waits the retry interval and runs the same cycle again.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// Could not open a connection to the device.
    #[error("could not connect to {target}: {reason}")]
    Connection { target: String, reason: String },

    /// The device answered with a gRPC error.
    #[error("{method} failed: {status}")]
    Rpc {
        method: &'static str,
        status: tonic::Status,
    },

    /// The RPC deadline expired.
    #[error("{method} timed out after {after:?}")]
    Timeout {
        method: &'static str,
        after: Duration,
    },

    /// The response carried a different variant than the request asked for.
    #[error("{method} returned an unexpected response variant")]
    UnexpectedResponse { method: &'static str },

    /// A field the collector depends on was absent.
    #[error("{method} response is missing {field}")]
    MissingField {
        method: &'static str,
        field: &'static str,
    },

    /// Failed to write a gauge.
    #[error("failed to write metric: {0}")]
    Sink(#[from] SinkError),

    /// A replay task panicked or was cancelled.
    #[error("replay task failed: {0}")]
    Replay(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

/// Polling cadence and per-RPC deadline of a collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    interval: Duration,
    timeout: Duration,
}

impl Schedule {
    /// Create an interval schedule.
    ///
    /// Interval is clamped to a minimum of 1 second.
    pub fn interval(duration: Duration) -> Self {
        let interval = if duration < MIN_INTERVAL {
            tracing::warn!(min_interval = ?MIN_INTERVAL,
                "Interval duration is less than minimum allowed. Using minimum duration."
            );
            MIN_INTERVAL
        } else {
            duration
        };
        Self {
            interval,
            timeout: DEFAULT_RPC_TIMEOUT,
        }
    }

    /// Set the per-RPC deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Time between successful cycles.
    pub fn every(&self) -> Duration {
        self.interval
    }

    /// Deadline applied to each RPC.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "every {} (timeout {})",
            humantime::format_duration(self.interval),
            humantime::format_duration(self.timeout)
        )
    }
}

/// Where a collector task is in its connect/poll loop.
///
/// Only used to drive retry timing and for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum CollectorState {
    Disconnected,
    Connecting,
    Polling,
    BackingOff,
}

impl CollectorState {
    /// Move to `next`, logging the transition.
    pub fn advance(&mut self, next: CollectorState, collector: &str) {
        if *self != next {
            tracing::debug!(collector, from = %self, to = %next, "Collector state changed");
            *self = next;
        }
    }
}

/// Core collector trait for implementing device pollers.
///
/// The registry owns the connection: it dials the collector's target, hands
/// the connected client to [`Collector::collect`], and drops it afterwards.
///
/// # Error Handling
///
/// Any error from `collect` (RPC failure, deadline, malformed response, sink
/// rejection) aborts the cycle. Collectors must therefore build every point
/// of a cycle before writing the first one, so that a failed cycle never
/// leaves a half-populated set behind. Gauges already in the sink keep their
/// last value.
#[async_trait::async_trait]
pub trait Collector: Send + Sync + 'static {
    /// Unique identifier for this collector instance.
    fn name(&self) -> &str;

    /// Device this collector polls.
    fn target(&self) -> &Target;

    /// Polling cadence and RPC deadline.
    fn schedule(&self) -> &Schedule;

    /// Perform one collection cycle over an already connected client.
    ///
    /// # Returns
    ///
    /// How long to idle before the next cycle starts. Plain pollers return
    /// their interval; the history replayer returns whatever is left of its
    /// interval after replay.
    async fn collect(&self, client: &mut dyn DeviceClient) -> Result<Duration, CollectorError>;
}
