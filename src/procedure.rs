//! The current-measurement run, top to bottom.
//!
//! connect → configure → zero correction → bursts → statistics → result log → plot → release.
//!
//! Any failure before the result log aborts the run; nothing is persisted or
//! plotted from a partial acquisition. The session is released on every path.

use std::io::Write;
use tracing::info;

use crate::config::Settings;
use crate::data::{format_scientific, ResultLog, ResultRecord};
use crate::error::AppResult;
use crate::gui::{self, PlotTarget, TracePlot};
use crate::instrument::Keithley6514;
use crate::measurement::{AcquisitionPlan, Aggregator, SampleSeries, SummaryStatistics};
use crate::traits::ScpiEndpoint;

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// `*IDN?` response
    pub identity: String,
    /// Every reading, warm-up sample included
    pub series: SampleSeries,
    /// Statistics of the trimmed series
    pub stats: SummaryStatistics,
    /// The line appended to the result log
    pub record: ResultRecord,
}

/// Operator input for one run
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Voltage setting as typed by the operator
    pub voltage: String,
    /// Visualisation target
    pub plot: PlotTarget,
}

/// Run the full procedure against an opened endpoint.
///
/// Operator-facing lines are written to `console`.
pub async fn run<E: ScpiEndpoint>(
    endpoint: E,
    settings: &Settings,
    request: &RunRequest,
    console: &mut impl Write,
) -> AppResult<RunReport> {
    let mut session = Keithley6514::new(endpoint, settings);

    let identity = session.connect().await?;
    writeln!(console, "Connected: {}", identity)?;
    session.configure().await?;

    session.zero_correct().await?;

    let aggregator = Aggregator::new(AcquisitionPlan::from(&settings.acquisition));
    let series = aggregator.run(&mut session, console).await?;
    let stats = SummaryStatistics::from_samples(series.trimmed())?;

    writeln!(console)?;
    writeln!(console, "Voltage: {} V", request.voltage)?;
    writeln!(
        console,
        "Average current: {} A",
        format_scientific(stats.mean, 6)
    )?;
    writeln!(
        console,
        "Standard deviation (1σ): {} A",
        format_scientific(stats.std_dev, 2)
    )?;

    let record = ResultRecord::new(request.voltage.clone(), &stats);
    ResultLog::new(&settings.output.result_file).append(&record)?;

    gui::render(TracePlot::from_series(&series, &stats), &request.plot)?;

    session.close();
    info!(samples = series.len(), "run complete");

    Ok(RunReport {
        identity,
        series,
        stats,
        record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MockEndpoint;
    use crate::error::DaqError;
    use tempfile::tempdir;

    fn settings_in(dir: &std::path::Path) -> Settings {
        let mut settings = Settings::default();
        settings.output.result_file = dir.join("pyvisa_IV_6514.txt");
        settings.output.plot_file = dir.join("trace.svg");
        settings
    }

    #[tokio::test(start_paused = true)]
    async fn test_console_lines() {
        let dir = tempdir().unwrap();
        let settings = settings_in(dir.path());
        let endpoint = MockEndpoint::new("GPIB0::14::INSTR").with_base_current(1.0e-9);
        let request = RunRequest {
            voltage: "5".to_string(),
            plot: PlotTarget::None,
        };

        let mut console = Vec::new();
        let report = run(endpoint.clone(), &settings, &request, &mut console)
            .await
            .unwrap();
        let text = String::from_utf8(console).unwrap();

        assert!(text.starts_with("Connected: KEITHLEY INSTRUMENTS INC.,MODEL 6514"));
        assert_eq!(text.matches("\nRaw data: ").count(), 10);
        assert!(text.contains("\nVoltage: 5 V\n"));
        assert!(text.contains(&format!(
            "Average current: {} A",
            format_scientific(report.stats.mean, 6)
        )));
        assert!(text.contains("Standard deviation (1σ): "));
        assert!(!endpoint.is_open());
    }

    #[tokio::test]
    async fn test_identity_printed_before_setup_failure() {
        let dir = tempdir().unwrap();
        let settings = settings_in(dir.path());
        let endpoint = MockEndpoint::new("GPIB0::14::INSTR").fail_on("CURR:NPLC");
        let request = RunRequest {
            voltage: "5".to_string(),
            plot: PlotTarget::None,
        };

        let mut console = Vec::new();
        let err = run(endpoint.clone(), &settings, &request, &mut console)
            .await
            .unwrap_err();
        let text = String::from_utf8(console).unwrap();

        assert!(matches!(err, DaqError::Communication(_)));
        assert!(text.starts_with("Connected: KEITHLEY INSTRUMENTS INC."));
        assert!(!settings.output.result_file.exists());
        assert_eq!(endpoint.close_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_statistics_failure_persists_nothing() {
        let dir = tempdir().unwrap();
        let mut settings = settings_in(dir.path());
        settings.acquisition.bursts = 1;
        settings.acquisition.points_per_burst = 1;
        let endpoint = MockEndpoint::new("GPIB0::14::INSTR");
        let request = RunRequest {
            voltage: "5".to_string(),
            plot: PlotTarget::File(settings.output.plot_file.clone()),
        };

        let err = run(endpoint.clone(), &settings, &request, &mut std::io::sink())
            .await
            .unwrap_err();

        assert!(matches!(err, DaqError::InsufficientSamples(0)));
        assert!(!settings.output.result_file.exists());
        assert!(!settings.output.plot_file.exists());
        assert_eq!(endpoint.close_calls(), 1);
    }
}
