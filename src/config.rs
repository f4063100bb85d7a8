//! Settings for the electrometer run, loaded with Figment.
//!
//! Settings are merged in this order (later wins):
//! 1. Built-in defaults ([`Settings::default`]), which reproduce the fixed lab procedure
//! 2. An optional TOML file
//! 3. Environment variables prefixed with `K6514_`, with `__` separating nested keys
//!
//! # Environment Variable Overrides
//!
//! ```text
//! K6514_APPLICATION__LOG_LEVEL=debug
//! K6514_INSTRUMENT__RESOURCE=GPIB0::22::INSTR
//! K6514_OUTPUT__RESULT_FILE=/data/iv_6514.txt
//! ```
//!
//! # Example
//!
//! ```no_run
//! use electrometer_daq::config::Settings;
//!
//! let settings = Settings::load(None)?;
//! println!("Instrument: {}", settings.instrument.resource);
//! # Ok::<(), electrometer_daq::config::ConfigError>(())
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment could not merge or extract the settings.
    #[error("Configuration load error: {0}")]
    LoadError(#[from] Box<figment::Error>),
    /// Settings were loaded but are not usable.
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Application settings
    pub application: ApplicationConfig,
    /// Instrument connection and measurement setup
    pub instrument: InstrumentConfig,
    /// Burst layout and buffer wait
    pub acquisition: AcquisitionConfig,
    /// Result log and plot locations
    pub output: OutputConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Keithley 6514 connection and front-end setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// VISA resource string (bus type + address)
    pub resource: String,
    /// VISA open/read timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Argument of `CURR:RANG`, sent verbatim
    #[serde(default = "default_current_range")]
    pub current_range: String,
    /// Argument of `CURR:NPLC`, sent verbatim
    #[serde(default = "default_nplc")]
    pub nplc: String,
    /// Settling time with zero check enabled before `SYST:ZCOR ON`
    #[serde(default = "default_zero_check_settle_ms")]
    pub zero_check_settle_ms: u64,
}

/// Burst layout and buffer fill wait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Number of acquisition bursts per run
    #[serde(default = "default_bursts")]
    pub bursts: usize,
    /// Trace points per burst
    #[serde(default = "default_points_per_burst")]
    pub points_per_burst: usize,
    /// Fixed part of the buffer fill wait
    #[serde(default = "default_wait_base_ms")]
    pub wait_base_ms: u64,
    /// Additional wait per requested point
    #[serde(default = "default_wait_per_point_ms")]
    pub wait_per_point_ms: u64,
}

/// Output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Append-only tab-separated result log
    pub result_file: PathBuf,
    /// SVG file the trace plot is exported to
    pub plot_file: PathBuf,
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_timeout_ms() -> u64 {
    5000
}

fn default_current_range() -> String {
    "1E-8".to_string()
}

fn default_nplc() -> String {
    "10".to_string()
}

fn default_zero_check_settle_ms() -> u64 {
    2000
}

fn default_bursts() -> usize {
    10
}

fn default_points_per_burst() -> usize {
    10
}

fn default_wait_base_ms() -> u64 {
    2000
}

fn default_wait_per_point_ms() -> u64 {
    100
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            application: ApplicationConfig {
                log_level: "info".to_string(),
            },
            instrument: InstrumentConfig {
                resource: "GPIB0::14::INSTR".to_string(),
                timeout_ms: default_timeout_ms(),
                current_range: default_current_range(),
                nplc: default_nplc(),
                zero_check_settle_ms: default_zero_check_settle_ms(),
            },
            acquisition: AcquisitionConfig {
                bursts: default_bursts(),
                points_per_burst: default_points_per_burst(),
                wait_base_ms: default_wait_base_ms(),
                wait_per_point_ms: default_wait_per_point_ms(),
            },
            output: OutputConfig {
                result_file: PathBuf::from("pyvisa_IV_6514.txt"),
                plot_file: PathBuf::from("pyvisa_IV_6514.svg"),
            },
        }
    }
}

// ============================================================================
// Configuration Loading and Validation
// ============================================================================

impl Settings {
    /// Load settings from defaults, an optional TOML file and `K6514_` environment variables.
    ///
    /// A missing file is not an error; figment treats it as an empty provider.
    ///
    /// # Errors
    ///
    /// Returns a ConfigError if extraction or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        Self::extract(figment.merge(Env::prefixed("K6514_").split("__")))
    }

    /// Load settings from TOML text on top of the defaults. Environment is not consulted.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Self::extract(
            Figment::from(Serialized::defaults(Settings::default())).merge(Toml::string(toml)),
        )
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let settings: Self = figment
            .extract()
            .map_err(|e| ConfigError::LoadError(Box::new(e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings after loading
    ///
    /// Checks:
    /// - Log level is valid (trace, debug, info, warn, error)
    /// - Resource string is not empty
    /// - Burst count and points per burst are positive
    /// - Range and NPLC arguments are numeric
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.instrument.resource.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "instrument 'resource' cannot be empty".to_string(),
            ));
        }

        for (name, value) in [
            ("current_range", &self.instrument.current_range),
            ("nplc", &self.instrument.nplc),
        ] {
            if value.trim().parse::<f64>().is_err() {
                return Err(ConfigError::ValidationError(format!(
                    "instrument '{}' must be numeric, got '{}'",
                    name, value
                )));
            }
        }

        if self.acquisition.bursts == 0 {
            return Err(ConfigError::ValidationError(
                "acquisition 'bursts' must be > 0".to_string(),
            ));
        }
        if self.acquisition.points_per_burst == 0 {
            return Err(ConfigError::ValidationError(
                "acquisition 'points_per_burst' must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// VISA timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.instrument.timeout_ms)
    }

    /// Zero-check settling time as a [`Duration`].
    pub fn zero_check_settle(&self) -> Duration {
        Duration::from_millis(self.instrument.zero_check_settle_ms)
    }
}
