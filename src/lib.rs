//! Core library for the Keithley 6514 current acquisition tool.
//!
//! The library drives an electrometer over a SCPI endpoint (VISA or simulated),
//! collects trace-buffer bursts, reduces them to mean and sample standard
//! deviation, appends a tab-separated result line and plots the trace. The
//! `k6514_current` binary is a thin CLI over [`procedure::run`].
//!
//! # Features
//!
//! - `instrument_visa` - Enable VISA instrument communication (visa-rs)
//! - `gui` - Enable the interactive trace window (eframe/egui_plot)
//! - `full` - Enable all features

pub mod adapters;
pub mod config;
pub mod data;
pub mod error;
pub mod gui;
pub mod hardware;
pub mod instrument;
pub mod logging;
pub mod measurement;
pub mod procedure;
pub mod traits;

pub use config::Settings;
pub use error::{AppResult, DaqError};
pub use traits::ScpiEndpoint;
