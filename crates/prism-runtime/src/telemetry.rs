//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use prism_core::{PrismError, PrismResult};

use crate::LogConfig;

/// Install the global fmt subscriber. `RUST_LOG` takes precedence over the
/// configured filter. A subscriber that is already installed is kept.
pub fn init_tracing(config: &LogConfig) -> PrismResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|e| PrismError::InvalidConfig(format!("log filter: {}", e)))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = installed {
        tracing::debug!("tracing subscriber already installed: {}", e);
    }
    Ok(())
}
