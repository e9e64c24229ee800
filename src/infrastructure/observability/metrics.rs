//! Prometheus metrics definitions for WaitForIt
//!
//! All metrics use the `waitforit_` prefix and are read-only.

use prometheus::{
    CounterVec, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;
use std::time::Instant;

/// Prometheus metrics for the prediction service
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    started: Instant,
    /// Successful predictions by decision label
    pub predictions_total: CounterVec,
    /// Failed requests by error kind
    pub prediction_errors_total: CounterVec,
    /// Request latency in seconds by route
    pub request_latency_seconds: HistogramVec,
    /// Uptime in seconds, refreshed on every scrape
    pub uptime_seconds: GenericGauge<AtomicF64>,
}

impl Metrics {
    /// Create a new Metrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let predictions_total = CounterVec::new(
            Opts::new(
                "waitforit_predictions_total",
                "Successful predictions by decision",
            ),
            &["decision"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        let prediction_errors_total = CounterVec::new(
            Opts::new(
                "waitforit_prediction_errors_total",
                "Failed prediction requests by error kind",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(prediction_errors_total.clone()))?;

        let request_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "waitforit_request_latency_seconds",
                "Request latency in seconds",
            )
            .buckets(vec![
                0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
            ]),
            &["route"],
        )?;
        registry.register(Box::new(request_latency_seconds.clone()))?;

        let uptime_seconds = Gauge::with_opts(Opts::new(
            "waitforit_uptime_seconds",
            "Server uptime in seconds",
        ))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            started: Instant::now(),
            predictions_total,
            prediction_errors_total,
            request_latency_seconds,
            uptime_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        self.uptime_seconds
            .set(self.started.elapsed().as_secs_f64());
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_prediction(&self, decision: &str) {
        self.predictions_total.with_label_values(&[decision]).inc();
    }

    pub fn inc_error(&self, kind: &str) {
        self.prediction_errors_total
            .with_label_values(&[kind])
            .inc();
    }

    pub fn observe_latency(&self, route: &str, seconds: f64) {
        self.request_latency_seconds
            .with_label_values(&[route])
            .observe(seconds);
    }
}
