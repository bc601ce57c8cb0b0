//! Prometheus-backed metric sink.

use std::collections::HashMap;

use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};

use crate::sink::catalog::{FAMILIES, Family};
use crate::sink::{Labels, MetricSink, SinkError};

/// Content type of the text exposition format.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// [`MetricSink`] that stores gauges in a private `prometheus::Registry`.
///
/// Families are registered once at construction; the lookup tables are
/// immutable afterwards, and `Gauge`/`GaugeVec` synchronise internally, so
/// the sink can be shared behind an `Arc` without extra locking.
pub struct PrometheusSink {
    registry: Registry,
    gauges: HashMap<&'static str, Gauge>,
    gauge_vecs: HashMap<&'static str, (GaugeVec, usize)>,
}

impl PrometheusSink {
    /// Create a sink with every family from the catalog registered.
    ///
    /// # Errors
    /// Returns `SinkError::Prometheus` if a family fails to register.
    pub fn new() -> Result<Self, SinkError> {
        Self::with_families(FAMILIES)
    }

    /// Create a sink with the given families registered.
    pub fn with_families(families: &[Family]) -> Result<Self, SinkError> {
        let registry = Registry::new();
        let mut gauges = HashMap::new();
        let mut gauge_vecs = HashMap::new();

        for family in families {
            let opts = Opts::new(family.name, family.help);
            if family.labels.is_empty() {
                let gauge = Gauge::with_opts(opts)?;
                registry.register(Box::new(gauge.clone()))?;
                gauges.insert(family.name, gauge);
            } else {
                let vec = GaugeVec::new(opts, family.labels)?;
                registry.register(Box::new(vec.clone()))?;
                gauge_vecs.insert(family.name, (vec, family.labels.len()));
            }
        }

        tracing::debug!(
            gauges = gauges.len(),
            gauge_vecs = gauge_vecs.len(),
            "Metric families registered"
        );

        Ok(Self {
            registry,
            gauges,
            gauge_vecs,
        })
    }

    /// Render every registered family in the text exposition format.
    pub fn encode_text(&self) -> Result<String, SinkError> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| SinkError::Encode(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| SinkError::Encode(e.to_string()))
    }
}

impl std::fmt::Debug for PrometheusSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusSink")
            .field("gauges", &self.gauges.len())
            .field("gauge_vecs", &self.gauge_vecs.len())
            .finish_non_exhaustive()
    }
}

impl MetricSink for PrometheusSink {
    fn set_gauge(&self, name: &str, value: f64) -> Result<(), SinkError> {
        match self.gauges.get(name) {
            Some(gauge) => {
                gauge.set(value);
                Ok(())
            }
            None if self.gauge_vecs.contains_key(name) => Err(SinkError::LabelMismatch {
                name: name.to_string(),
                expected: self.gauge_vecs[name].1,
                got: 0,
            }),
            None => Err(SinkError::UnknownMetric(name.to_string())),
        }
    }

    fn set_labeled_gauge(
        &self,
        name: &str,
        labels: &Labels,
        value: f64,
    ) -> Result<(), SinkError> {
        let Some((vec, expected)) = self.gauge_vecs.get(name) else {
            return Err(if self.gauges.contains_key(name) {
                SinkError::LabelMismatch {
                    name: name.to_string(),
                    expected: 0,
                    got: labels.len(),
                }
            } else {
                SinkError::UnknownMetric(name.to_string())
            });
        };

        if labels.len() != *expected {
            return Err(SinkError::LabelMismatch {
                name: name.to_string(),
                expected: *expected,
                got: labels.len(),
            });
        }

        let label_map: HashMap<&str, &str> =
            labels.iter().map(|(k, v)| (*k, v.as_str())).collect();
        vec.get_metric_with(&label_map)?.set(value);
        Ok(())
    }
}
