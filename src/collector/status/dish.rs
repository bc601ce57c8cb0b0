//! Dish status collector.

use std::sync::Arc;
use std::time::Duration;

use crate::collector::{Collector, CollectorError, Schedule};
use crate::device::proto::{DishGetStatusResponse, Request};
use crate::device::{DeviceClient, Target, call};
use crate::sink::catalog::{
    DISH_CURRENTLY_OBSTRUCTED, DISH_DEVICE_INFO, DISH_FRACTION_OBSTRUCTED,
    DISH_LAST_24H_OBSTRUCTED_S, DISH_VALID_S, DISH_WEDGE_ABS_FRACTION_OBSTRUCTED,
    DISH_WEDGE_FRACTION_OBSTRUCTED, wedge_label,
};
use crate::sink::{MetricPoint, MetricSink, bool_value};

const METHOD: &str = "GetStatus";

/// Polls dish `GetStatus` and exports identity plus obstruction gauges.
pub struct DishStatusCollector {
    target: Target,
    schedule: Schedule,
    sink: Arc<dyn MetricSink>,
}

impl DishStatusCollector {
    pub fn new(target: Target, schedule: Schedule, sink: Arc<dyn MetricSink>) -> Self {
        Self {
            target,
            schedule,
            sink,
        }
    }
}

impl std::fmt::Debug for DishStatusCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DishStatusCollector")
            .field("target", &self.target)
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}

/// Convert a dish status snapshot into gauge writes.
///
/// # Errors
/// Returns `CollectorError::MissingField` when obstruction stats are absent;
/// nothing should be written for such a response.
pub fn dish_status_points(
    status: &DishGetStatusResponse,
) -> Result<Vec<MetricPoint>, CollectorError> {
    let info = status.device_info.clone().unwrap_or_default();
    let obstruction = status
        .obstruction_stats
        .as_ref()
        .ok_or(CollectorError::MissingField {
            method: METHOD,
            field: "obstruction_stats",
        })?;

    let mut points = vec![
        MetricPoint::gauge(DISH_DEVICE_INFO, 1.0)
            .with_label("id", info.id)
            .with_label("hardware_version", info.hardware_version)
            .with_label("software_version", info.software_version)
            .with_label("country_code", info.country_code),
        MetricPoint::gauge(
            DISH_CURRENTLY_OBSTRUCTED,
            bool_value(obstruction.currently_obstructed),
        ),
        MetricPoint::gauge(
            DISH_FRACTION_OBSTRUCTED,
            f64::from(obstruction.fraction_obstructed),
        ),
        MetricPoint::gauge(
            DISH_LAST_24H_OBSTRUCTED_S,
            f64::from(obstruction.last_24h_obstructed_s),
        ),
        MetricPoint::gauge(DISH_VALID_S, f64::from(obstruction.valid_s)),
    ];

    let wedges = [
        (
            DISH_WEDGE_FRACTION_OBSTRUCTED,
            &obstruction.wedge_fraction_obstructed,
        ),
        (
            DISH_WEDGE_ABS_FRACTION_OBSTRUCTED,
            &obstruction.wedge_abs_fraction_obstructed,
        ),
    ];
    for (name, values) in wedges {
        points.extend(values.iter().enumerate().map(|(index, value)| {
            MetricPoint::gauge(name, f64::from(*value)).with_label("degrees", wedge_label(index))
        }));
    }

    Ok(points)
}

#[async_trait::async_trait]
impl Collector for DishStatusCollector {
    fn name(&self) -> &str {
        "dish_status"
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
            .into_dish_get_status()
            .ok_or(CollectorError::UnexpectedResponse { method: METHOD })?;

        let points = dish_status_points(&status)?;
        self.sink.record_all(&points)?;

        tracing::debug!(
            target = %self.target,
            points = points.len(),
            "Dish status recorded"
        );
        Ok(self.schedule.every())
    }
}
