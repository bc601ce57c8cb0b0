//! Router ping report collector.
//!
//! The router pings a set of destinations on its own; this collector only
//! reads the latest results. Each destination becomes one label combination
//! in the `wifi_ping_report_*` families.

use std::sync::Arc;
use std::time::Duration;

use crate::collector::{Collector, CollectorError, Schedule};
use crate::device::proto::{GetPingResponse, Request};
use crate::device::{DeviceClient, Target, call};
use crate::sink::catalog::{WIFI_PING_REPORT_DROP_RATE, WIFI_PING_REPORT_LATENCY_MS};
use crate::sink::{MetricPoint, MetricSink};

/// Default collection interval (1 minute).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Default `GetPing` deadline (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Router ping report collector.
pub struct PingCollector {
    target: Target,
    schedule: Schedule,
    sink: Arc<dyn MetricSink>,
}

impl PingCollector {
    /// Create a new ping collector polling `target`.
    pub fn new(target: Target, schedule: Schedule, sink: Arc<dyn MetricSink>) -> Self {
        Self {
            target,
            schedule,
            sink,
        }
    }
}

impl std::fmt::Debug for PingCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PingCollector")
            .field("target", &self.target)
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}

/// Drop-rate and latency points for every destination in `ping`.
///
/// A result without a target descriptor is exported with empty labels.
pub fn ping_points(ping: &GetPingResponse) -> Vec<MetricPoint> {
    ping.results
        .iter()
        .flat_map(|result| {
            let target = result.target.clone().unwrap_or_default();
            let labeled = |name, value: f32| {
                MetricPoint::gauge(name, f64::from(value))
                    .with_label("service", target.service.clone())
                    .with_label("location", target.location.clone())
                    .with_label("address", target.address.clone())
            };
            [
                labeled(WIFI_PING_REPORT_DROP_RATE, result.drop_rate),
                labeled(WIFI_PING_REPORT_LATENCY_MS, result.latency_ms),
            ]
        })
        .collect()
}

#[async_trait::async_trait]
impl Collector for PingCollector {
    fn name(&self) -> &str {
        "wifi_ping"
    }

    fn target(&self) -> &Target {
        &self.target
    }

    fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    async fn collect(&self, client: &mut dyn DeviceClient) -> Result<Duration, CollectorError> {
        let response = call(client, Request::get_ping(), self.schedule.timeout()).await?;
        let ping = response
            .into_get_ping()
            .ok_or(CollectorError::UnexpectedResponse { method: "GetPing" })?;

        let points = ping_points(&ping);
        self.sink.record_all(&points)?;

        tracing::debug!(
            target = %self.target,
            destinations = ping.results.len(),
            "Ping report recorded"
        );
        Ok(self.schedule.every())
    }
}
