//! Custom error types for the application.
//!
//! This module defines the primary error type, `DaqError`, for the whole crate.
//! Using the `thiserror` crate, it provides a single tagged error that every
//! layer returns, from the VISA transport up to the result log and plot export.
//!
//! ## Error Hierarchy
//!
//! - **`Communication`**: any failure opening the instrument, writing a command or
//!   reading a response. Transient and permanent failures are not distinguished.
//! - **`Parse`**: the trace buffer text could not be turned into reading triples.
//! - **`InvalidPointCount`**: an acquisition was requested for zero points.
//! - **`InsufficientSamples`**: statistics were requested on fewer than two samples.
//! - **`Io`**: wraps `std::io::Error`, covering the result log and console prompt.
//! - **`Config`**: settings failed to load or validate.
//! - **`Plot`**: the trace plot could not be rendered.
//! - **`FeatureNotEnabled`**: the code path needs a cargo feature that was not
//!   compiled in (VISA transport, interactive window).
//!
//! The binary catches every `DaqError` once at the top level and prints the
//! operator-facing `communication failed: <detail>` line.

use thiserror::Error;

use crate::config::ConfigError;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, DaqError>;

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum DaqError {
    /// Instrument transport or command failure.
    #[error("{0}")]
    Communication(String),

    /// Malformed trace buffer response.
    #[error("could not parse trace data: {0}")]
    Parse(String),

    /// Acquisition requested with a non-positive point count.
    #[error("point count must be a positive integer, got {0}")]
    InvalidPointCount(usize),

    /// Standard deviation is undefined for fewer than two samples.
    #[error("at least 2 samples are required for statistics, got {0}")]
    InsufficientSamples(usize),

    /// File system or console I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings failed to load or validate.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Plot rendering failure.
    #[error("Plot error: {0}")]
    Plot(String),

    /// A cargo feature required for this operation was not compiled in.
    #[error("Feature '{0}' is not enabled. Please build with --features {0}")]
    FeatureNotEnabled(String),
}
