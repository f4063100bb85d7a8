//! End-to-end runs against the simulated electrometer.

use electrometer_daq::{
    adapters::MockEndpoint,
    config::Settings,
    gui::PlotTarget,
    measurement::statistics::sample_std_dev,
    procedure::{self, RunRequest},
    DaqError, ScpiEndpoint,
};
use std::path::Path;
use tempfile::tempdir;

fn burst_response() -> String {
    (1..=10)
        .map(|i| format!("{}.0,0,{}", i, i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn scripted_endpoint() -> MockEndpoint {
    (0..10).fold(MockEndpoint::new("GPIB0::14::INSTR"), |endpoint, _| {
        endpoint.with_response("TRAC:DATA?", burst_response())
    })
}

fn settings_in(dir: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.output.result_file = dir.join("pyvisa_IV_6514.txt");
    settings.output.plot_file = dir.join("pyvisa_IV_6514.svg");
    settings
}

fn request(voltage: &str) -> RunRequest {
    RunRequest {
        voltage: voltage.to_string(),
        plot: PlotTarget::None,
    }
}

#[tokio::test(start_paused = true)]
async fn test_ten_bursts_of_ten() {
    let dir = tempdir().unwrap();
    let settings = settings_in(dir.path());
    let endpoint = scripted_endpoint();

    let report = procedure::run(
        endpoint.clone(),
        &settings,
        &request("5"),
        &mut std::io::sink(),
    )
    .await
    .unwrap();

    assert_eq!(report.series.len(), 100);
    assert_eq!(report.series.trimmed().len(), 99);
    assert_eq!(&report.series.samples()[..10], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
    assert_eq!(report.series.samples()[10], 1.0);

    let expected_mean = 549.0 / 99.0;
    assert!((report.stats.mean - expected_mean).abs() < 1e-12);

    let trimmed: Vec<f64> = (0..100).map(|i| (i % 10 + 1) as f64).skip(1).collect();
    let expected_sd = sample_std_dev(&trimmed).unwrap();
    let by_hand = (trimmed
        .iter()
        .map(|x| (x - expected_mean).powi(2))
        .sum::<f64>()
        / 98.0)
        .sqrt();
    assert!((report.stats.std_dev - by_hand).abs() < 1e-12);
    assert!((expected_sd - by_hand).abs() < 1e-12);

    let log = std::fs::read_to_string(&settings.output.result_file).unwrap();
    assert_eq!(log.lines().count(), 1);
    assert_eq!(log, report.record.to_line());
    assert!(log.starts_with("5\t5.545455e+00\t"));

    assert!(!endpoint.is_open());
    assert_eq!(endpoint.close_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_command_sequence() {
    let dir = tempdir().unwrap();
    let mut settings = settings_in(dir.path());
    settings.acquisition.bursts = 2;
    settings.acquisition.points_per_burst = 10;
    let endpoint = scripted_endpoint();

    procedure::run(endpoint.clone(), &settings, &request("1"), &mut std::io::sink())
        .await
        .unwrap();

    let burst = [
        "TRAC:CLE",
        "TRAC:POIN 10",
        "TRAC:FEED SENS",
        "TRAC:FEED:CONT NEXT",
        "TRIG:SOUR IMM",
        "TRIG:COUN 10",
        "INIT",
        "TRAC:DATA?",
    ];
    let mut expected = vec![
        "*RST",
        "*CLS",
        "*IDN?",
        "FUNC 'CURR'",
        "CURR:RANG 1E-8",
        "CURR:NPLC 10",
        "CURR:DAMP OFF",
        "SYST:ZCH ON",
        "SYST:ZCOR ON",
        "SYST:ZCH OFF",
    ];
    expected.extend_from_slice(&burst);
    expected.extend_from_slice(&burst);

    assert_eq!(endpoint.call_log(), expected);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_runs_append() {
    let dir = tempdir().unwrap();
    let settings = settings_in(dir.path());

    let first = procedure::run(
        MockEndpoint::new("GPIB0::14::INSTR").with_base_current(1.5e-9),
        &settings,
        &request("5"),
        &mut std::io::sink(),
    )
    .await
    .unwrap();
    let second = procedure::run(
        MockEndpoint::new("GPIB0::14::INSTR").with_base_current(2.5e-9),
        &settings,
        &request("10"),
        &mut std::io::sink(),
    )
    .await
    .unwrap();

    let log = std::fs::read_to_string(&settings.output.result_file).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(format!("{}\n", lines[0]), first.record.to_line());
    assert_eq!(format!("{}\n", lines[1]), second.record.to_line());
    for line in lines {
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields.len(), 3);
        assert!(fields[1].contains("e-09"));
    }
}

#[tokio::test(start_paused = true)]
async fn test_midrun_failure_leaves_no_output() {
    let dir = tempdir().unwrap();
    let settings = settings_in(dir.path());
    let endpoint = MockEndpoint::new("GPIB0::14::INSTR")
        .with_response("TRAC:DATA?", burst_response())
        .with_response("TRAC:DATA?", burst_response())
        .with_response("TRAC:DATA?", "1.0,0,1,2.0,0");
    let request = RunRequest {
        voltage: "5".to_string(),
        plot: PlotTarget::File(settings.output.plot_file.clone()),
    };

    let err = procedure::run(endpoint.clone(), &settings, &request, &mut std::io::sink())
        .await
        .unwrap_err();

    assert!(matches!(err, DaqError::Parse(_)));
    assert!(!settings.output.result_file.exists());
    assert!(!settings.output.plot_file.exists());
    assert_eq!(endpoint.close_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_setup_failure_releases_session() {
    let dir = tempdir().unwrap();
    let settings = settings_in(dir.path());
    let endpoint = MockEndpoint::new("GPIB0::14::INSTR").fail_on("SYST:ZCOR");

    let err = procedure::run(endpoint.clone(), &settings, &request("5"), &mut std::io::sink())
        .await
        .unwrap_err();

    assert!(matches!(err, DaqError::Communication(_)));
    assert!(!endpoint.is_open());
    assert!(!settings.output.result_file.exists());
}

#[tokio::test(start_paused = true)]
async fn test_svg_exported_on_success() {
    let dir = tempdir().unwrap();
    let settings = settings_in(dir.path());
    let request = RunRequest {
        voltage: "5".to_string(),
        plot: PlotTarget::File(settings.output.plot_file.clone()),
    };

    procedure::run(scripted_endpoint(), &settings, &request, &mut std::io::sink())
        .await
        .unwrap();

    let svg = std::fs::read_to_string(&settings.output.plot_file).unwrap();
    assert!(svg.contains("Keithley 6514 - 100pts"));
}
