use crate::config::LogFormat;
use tracing::Level;
use tracing_subscriber::prelude::*;

/// Installs the global subscriber. `RUST_LOG` directives are honored on top
/// of the INFO default.
pub fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(false).pretty())
            .init(),
    }
}
