//! Tracing setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::DashboardConfig;
use crate::error::DashboardError;

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over the configured level; `log_json` switches to one
/// JSON object per line.
pub fn init_tracing(config: &DashboardConfig) -> Result<(), DashboardError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };
    result.map_err(|e| DashboardError::Telemetry(e.to_string()))
}
