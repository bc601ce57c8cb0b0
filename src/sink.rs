//! Metric Sink
//!
//! Collectors write gauges through the [`MetricSink`] trait and never read
//! them back. The production sink is [`PrometheusSink`], which owns a
//! `prometheus::Registry` pre-populated with every family in [`catalog`] and
//! renders the text exposition format for scraping.
//!
//! # Components
//!
//! - [`MetricSink`]: write-only gauge capability, safe to share across tasks
//! - [`MetricPoint`] / [`Labels`]: one gauge write
//! - [`catalog`]: metric names, help text and label keys
//! - [`PrometheusSink`]: registry-backed implementation

pub mod catalog;
mod error;
mod registry;

use std::collections::BTreeMap;

pub use error::SinkError;
pub use registry::{PrometheusSink, TEXT_CONTENT_TYPE};

/// Label set of a gauge write. Keys are unique by construction.
pub type Labels = BTreeMap<&'static str, String>;

/// Write-only gauge storage shared by every collector task.
///
/// Gauge semantics: the last write wins and an absent write leaves the
/// previous value in place. Implementations synchronise internally.
pub trait MetricSink: Send + Sync + 'static {
    /// Set an unlabeled gauge.
    fn set_gauge(&self, name: &str, value: f64) -> Result<(), SinkError>;

    /// Set one labeled instance of a gauge family.
    fn set_labeled_gauge(&self, name: &str, labels: &Labels, value: f64)
    -> Result<(), SinkError>;

    /// Write a single point, dispatching on whether it carries labels.
    fn record(&self, point: &MetricPoint) -> Result<(), SinkError> {
        if point.labels.is_empty() {
            self.set_gauge(point.name, point.value)
        } else {
            self.set_labeled_gauge(point.name, &point.labels, point.value)
        }
    }

    /// Write a batch of points in order, stopping at the first failure.
    fn record_all(&self, points: &[MetricPoint]) -> Result<(), SinkError> {
        points.iter().try_for_each(|point| self.record(point))
    }
}

/// A named, optionally labeled gauge value.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPoint {
    pub name: &'static str,
    pub labels: Labels,
    pub value: f64,
}

impl MetricPoint {
    /// An unlabeled point.
    pub fn gauge(name: &'static str, value: f64) -> Self {
        Self {
            name,
            labels: Labels::new(),
            value,
        }
    }

    /// Add a label, replacing any previous value for the same key.
    pub fn with_label(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.labels.insert(key, value.into());
        self
    }
}

/// Gauge value for a boolean flag.
pub fn bool_value(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}
