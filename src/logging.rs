//! Tracing initialisation.
//!
//! The configured level applies to this crate; `RUST_LOG` takes precedence
//! when it is set, e.g. `RUST_LOG=electrometer_daq=trace`.

use tracing_subscriber::EnvFilter;

use crate::config::Settings;

/// Build the filter used by [`init`].
///
/// Falls back to `electrometer_daq=<level>,warn` when `RUST_LOG` is unset or invalid.
pub fn env_filter(settings: &Settings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "electrometer_daq={},k6514_current={},warn",
            settings.application.log_level, settings.application.log_level
        ))
    })
}

/// Install the global fmt subscriber. Diagnostics go to stderr so stdout keeps
/// only the operator-facing lines.
///
/// # Errors
///
/// Fails if a global subscriber was already installed.
pub fn init(settings: &Settings) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(settings))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {}", e))
}
