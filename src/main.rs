//! `k6514_current`: measure the current through a sample at one voltage setting.
//!
//! ```bash
//! k6514_current --voltage 5
//! k6514_current --simulate --plot-file trace.svg
//! RUST_LOG=electrometer_daq=debug k6514_current --resource GPIB0::22::INSTR
//! ```

use anyhow::Context;
use clap::Parser;
use electrometer_daq::{
    adapters::MockEndpoint,
    config::Settings,
    gui::PlotTarget,
    hardware::VisaAdapterBuilder,
    logging,
    procedure::{self, RunRequest},
    AppResult, DaqError,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// VISA resource string, e.g. GPIB0::14::INSTR
    #[arg(short, long)]
    resource: Option<String>,

    /// Voltage setting recorded with the result; prompted for when omitted
    #[arg(short, long)]
    voltage: Option<String>,

    /// Result log to append to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// SVG file for the trace plot
    #[arg(long)]
    plot_file: Option<PathBuf>,

    /// Do not plot
    #[arg(long, conflicts_with_all = ["interactive", "plot_file"])]
    no_plot: bool,

    /// Show the trace in a window instead of exporting it (needs the `gui` feature)
    #[arg(long)]
    interactive: bool,

    /// Use the built-in simulated electrometer instead of VISA
    #[arg(long)]
    simulate: bool,
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        if let Some(resource) = &self.resource {
            settings.instrument.resource = resource.clone();
        }
        if let Some(output) = &self.output {
            settings.output.result_file = output.clone();
        }
        if let Some(plot_file) = &self.plot_file {
            settings.output.plot_file = plot_file.clone();
        }
        settings.validate()?;
        Ok(settings)
    }

    fn plot_target(&self, settings: &Settings) -> PlotTarget {
        if self.no_plot {
            PlotTarget::None
        } else if self.interactive {
            PlotTarget::Window
        } else {
            PlotTarget::File(settings.output.plot_file.clone())
        }
    }
}

fn prompt_voltage() -> anyhow::Result<String> {
    print!("Enter the voltage setting for this run (V): ");
    io::stdout().flush()?;
    read_voltage(&mut io::stdin().lock()).context("Failed to read voltage from stdin")
}

/// One line of operator input without its line ending. End of input is an
/// error, so a closed stdin never starts a run.
fn read_voltage(input: &mut impl BufRead) -> io::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "end of input before a voltage was entered",
        ));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn acquire(cli: &Cli, settings: &Settings, request: &RunRequest) -> AppResult<()> {
    let mut console = io::stdout();
    let report = if cli.simulate {
        info!("using simulated electrometer");
        let endpoint = MockEndpoint::new(settings.instrument.resource.clone());
        procedure::run(endpoint, settings, request, &mut console).await?
    } else {
        let endpoint = VisaAdapterBuilder::new(settings.instrument.resource.clone())
            .with_timeout(settings.timeout())
            .open()?;
        procedure::run(endpoint, settings, request, &mut console).await?
    };
    info!(
        "appended '{}' to {}",
        report.record.to_line().trim_end(),
        settings.output.result_file.display()
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let settings = cli.settings()?;
    logging::init(&settings)?;

    let plot = cli.plot_target(&settings);
    if plot == PlotTarget::Window && !cfg!(feature = "gui") {
        anyhow::bail!("--interactive needs a build with --features gui");
    }

    let voltage = match &cli.voltage {
        Some(v) => v.clone(),
        None => prompt_voltage()?,
    };
    let request = RunRequest { voltage, plot };

    match acquire(&cli, &settings, &request).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            report_failure(&e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn report_failure(e: &DaqError) {
    error!("{}", e);
    println!("{}", failure_line(e));
}

fn failure_line(e: &DaqError) -> String {
    format!("communication failed: {}", e)
}
