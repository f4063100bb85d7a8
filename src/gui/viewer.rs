//! Interactive trace window (eframe/egui_plot).
//!
//! [`show_blocking`] opens a native window and returns when it is closed.

use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use super::plot::TracePlot;
use crate::error::{AppResult, DaqError};

struct TraceViewer {
    plot: TracePlot,
}

impl eframe::App for TraceViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(&self.plot.title);

            let line = Line::new(PlotPoints::from(self.plot.points.clone()))
                .name(&self.plot.legend);
            let markers = Points::new(PlotPoints::from(self.plot.points.clone()))
                .radius(3.0)
                .name(&self.plot.legend);

            Plot::new("k6514_trace")
                .legend(Legend::default())
                .x_axis_label(TracePlot::X_LABEL)
                .y_axis_label(TracePlot::Y_LABEL)
                .show_grid(true)
                .show(ui, |plot_ui| {
                    plot_ui.line(line);
                    plot_ui.points(markers);
                });
        });
    }
}

/// Show `plot` in a native window; blocks until the window is closed.
pub fn show_blocking(plot: TracePlot) -> AppResult<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([800.0, 500.0]),
        ..Default::default()
    };
    let title = plot.title.clone();

    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(TraceViewer { plot }))),
    )
    .map_err(|e| DaqError::Plot(format!("viewer failed: {}", e)))
}
