//! Wifi router status collector.

use std::sync::Arc;
use std::time::Duration;

use crate::collector::{Collector, CollectorError, Schedule};
use crate::device::proto::{Request, WifiGetStatusResponse};
use crate::device::{DeviceClient, Target, call};
use crate::sink::catalog::{WIFI_DEVICE_INFO, WIFI_PING_DROP_RATE, WIFI_PING_LATENCY_MS};
use crate::sink::{MetricPoint, MetricSink};

/// Polls router `GetStatus` for identity and headline ping quality.
pub struct WifiStatusCollector {
    target: Target,
    schedule: Schedule,
    sink: Arc<dyn MetricSink>,
}

impl WifiStatusCollector {
    pub fn new(target: Target, schedule: Schedule, sink: Arc<dyn MetricSink>) -> Self {
        Self {
            target,
            schedule,
            sink,
        }
    }
}

impl std::fmt::Debug for WifiStatusCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WifiStatusCollector")
            .field("target", &self.target)
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}

/// Convert a router status snapshot into gauge writes.
pub fn wifi_status_points(status: &WifiGetStatusResponse) -> Vec<MetricPoint> {
    let info = status.device_info.clone().unwrap_or_default();
    vec![
        MetricPoint::gauge(WIFI_DEVICE_INFO, 1.0)
            .with_label("id", info.id)
            .with_label("hardware_version", info.hardware_version)
            .with_label("software_version", info.software_version)
            .with_label("country_code", info.country_code)
            .with_label("sku", status.sku.clone()),
        MetricPoint::gauge(WIFI_PING_DROP_RATE, f64::from(status.ping_drop_rate)),
        MetricPoint::gauge(WIFI_PING_LATENCY_MS, f64::from(status.ping_latency_ms)),
    ]
}

#[async_trait::async_trait]
impl Collector for WifiStatusCollector {
    fn name(&self) -> &str {
        "wifi_status"
    }

    fn target(&self) -> &Target {
        &self.target
    }

    fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    async fn collect(&self, client: &mut dyn DeviceClient) -> Result<Duration, CollectorError> {
        let response = call(client, Request::get_status(), self.schedule.timeout()).await?;
        let status = response
            .into_wifi_get_status()
            .ok_or(CollectorError::UnexpectedResponse {
                method: "GetStatus",
            })?;

        self.sink.record_all(&wifi_status_points(&status))?;
        Ok(self.schedule.every())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::proto::DeviceInfo;

    #[test]
    fn test_wifi_status_points() {
        let status = WifiGetStatusResponse {
            device_info: Some(DeviceInfo {
                id: "Router-010000000000000000ABCDEF".to_string(),
                hardware_version: "v2".to_string(),
                software_version: "2021.08.1".to_string(),
                country_code: "CA".to_string(),
            }),
            ping_drop_rate: 0.5,
            ping_latency_ms: 31.25,
            sku: "ROUTER-V2".to_string(),
        };

        let points = wifi_status_points(&status);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].labels.len(), 5);
        assert_eq!(points[0].labels["sku"], "ROUTER-V2");
        assert_eq!(points[1], MetricPoint::gauge(WIFI_PING_DROP_RATE, 0.5));
        assert_eq!(points[2], MetricPoint::gauge(WIFI_PING_LATENCY_MS, 31.25));
    }

    #[test]
    fn test_missing_device_info_uses_empty_labels() {
        let points = wifi_status_points(&WifiGetStatusResponse::default());
        assert_eq!(points[0].labels["id"], "");
        assert_eq!(points[0].labels.len(), 5);
    }
}
