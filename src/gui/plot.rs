//! Trace plot model and SVG export.
//!
//! The exported file is the non-interactive counterpart of the blocking viewer:
//! markers joined by a line, grid, axis labels, title, and a legend carrying the
//! mean and 1σ of the trimmed series.

use plotters::prelude::*;
use std::path::Path;
use tracing::info;

use crate::data::format_scientific;
use crate::error::{AppResult, DaqError};
use crate::measurement::{SampleSeries, SummaryStatistics};

/// Everything needed to draw one run
#[derive(Debug, Clone, PartialEq)]
pub struct TracePlot {
    /// Chart title
    pub title: String,
    /// Legend entry for the series
    pub legend: String,
    /// `[sample index (1-based), current]` pairs of the untrimmed series
    pub points: Vec<[f64; 2]>,
}

impl TracePlot {
    /// X axis label
    pub const X_LABEL: &'static str = "Sample";
    /// Y axis label
    pub const Y_LABEL: &'static str = "Current (A)";

    /// Plot of the full series, annotated with statistics of the trimmed series
    pub fn from_series(series: &SampleSeries, stats: &SummaryStatistics) -> Self {
        let points = series
            .samples()
            .iter()
            .enumerate()
            .map(|(i, &current)| [(i + 1) as f64, current])
            .collect();

        Self {
            title: format!("Keithley 6514 - {}pts", series.len()),
            legend: format!(
                "Avg = {} A ± {} A (1σ)",
                format_scientific(stats.mean, 2),
                format_scientific(stats.std_dev, 1)
            ),
            points,
        }
    }

    /// X range covering every sample index
    pub fn x_range(&self) -> (f64, f64) {
        (1.0, self.points.len().max(2) as f64)
    }

    /// Y range with 5% padding; a flat series gets a symmetric band around its value
    pub fn y_range(&self) -> (f64, f64) {
        let (min, max) = self
            .points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p[1]), hi.max(p[1]))
            });
        if !min.is_finite() || !max.is_finite() {
            return (0.0, 1.0);
        }
        let span = max - min;
        let pad = if span > 0.0 {
            span * 0.05
        } else if min != 0.0 {
            min.abs() * 0.05
        } else {
            1e-12
        };
        (min - pad, max + pad)
    }
}

/// Render `plot` as an SVG file at `path`, overwriting it.
pub fn export_svg(plot: &TracePlot, path: &Path) -> AppResult<()> {
    draw_svg(plot, path).map_err(|e| DaqError::Plot(e.to_string()))?;
    info!("trace plot written to '{}'", path.display());
    Ok(())
}

fn draw_svg(plot: &TracePlot, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(path, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_min, x_max) = plot.x_range();
    let (y_min, y_max) = plot.y_range();

    let mut chart = ChartBuilder::on(&root)
        .caption(&plot.title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(TracePlot::X_LABEL)
        .y_desc(TracePlot::Y_LABEL)
        .y_label_formatter(&|y| format_scientific(*y, 2))
        .draw()?;

    let line = plot.points.iter().map(|p| (p[0], p[1]));
    chart
        .draw_series(LineSeries::new(line, BLUE))?
        .label(plot.legend.as_str())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    chart.draw_series(
        plot.points
            .iter()
            .map(|p| Circle::new((p[0], p[1]), 3, BLUE.filled())),
    )?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
