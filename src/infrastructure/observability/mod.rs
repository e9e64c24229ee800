//! Prometheus metrics for the prediction service, rendered on `GET /metrics`,
//! plus the tracing subscriber setup shared by the binaries.

pub mod logging;
pub mod metrics;

pub use logging::init_tracing;
pub use metrics::Metrics;
