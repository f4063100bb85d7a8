//! Trace visualisation.
//!
//! - `plot`: the plot model and SVG export (always available)
//! - `viewer`: blocking egui window, behind the `gui` feature

pub mod plot;
#[cfg(feature = "gui")]
pub mod viewer;

pub use plot::{export_svg, TracePlot};

use std::path::PathBuf;

use crate::error::AppResult;

/// How a finished run is visualised
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlotTarget {
    /// Skip visualisation
    None,
    /// Export an SVG file
    File(PathBuf),
    /// Open a blocking window (requires the `gui` feature)
    Window,
}

/// Render `plot` to `target`.
pub fn render(plot: TracePlot, target: &PlotTarget) -> AppResult<()> {
    match target {
        PlotTarget::None => Ok(()),
        PlotTarget::File(path) => export_svg(&plot, path),
        PlotTarget::Window => show_window(plot),
    }
}

#[cfg(feature = "gui")]
fn show_window(plot: TracePlot) -> AppResult<()> {
    viewer::show_blocking(plot)
}

#[cfg(not(feature = "gui"))]
fn show_window(_plot: TracePlot) -> AppResult<()> {
    Err(crate::error::DaqError::FeatureNotEnabled("gui".to_string()))
}
