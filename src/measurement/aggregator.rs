//! Burst aggregation into a sample series.

use serde::Serialize;
use std::io::Write;
use tracing::{debug, info};

use crate::config::AcquisitionConfig;
use crate::error::AppResult;
use crate::instrument::keithley_6514::PREVIEW_CHARS;
use crate::instrument::trace::{parse_trace, preview};
use crate::instrument::Keithley6514;
use crate::traits::ScpiEndpoint;

/// Ordered current readings in acquisition order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleSeries {
    samples: Vec<f64>,
}

impl SampleSeries {
    /// Empty series
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a burst, preserving order
    pub fn extend_burst(&mut self, burst: impl IntoIterator<Item = f64>) {
        self.samples.extend(burst);
    }

    /// All readings, including the warm-up sample
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Readings without the first (warm-up) sample; empty if the series is empty
    pub fn trimmed(&self) -> &[f64] {
        self.samples.get(1..).unwrap_or(&[])
    }

    /// Number of readings
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no reading was collected
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl From<Vec<f64>> for SampleSeries {
    fn from(samples: Vec<f64>) -> Self {
        Self { samples }
    }
}

/// Number and size of bursts per run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionPlan {
    /// Bursts per run
    pub bursts: usize,
    /// Trace points per burst
    pub points_per_burst: usize,
}

impl Default for AcquisitionPlan {
    fn default() -> Self {
        Self {
            bursts: 10,
            points_per_burst: 10,
        }
    }
}

impl From<&AcquisitionConfig> for AcquisitionPlan {
    fn from(config: &AcquisitionConfig) -> Self {
        Self {
            bursts: config.bursts,
            points_per_burst: config.points_per_burst,
        }
    }
}

/// Runs the burst plan against a session
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    plan: AcquisitionPlan,
}

impl Aggregator {
    /// Aggregator for `plan`
    pub fn new(plan: AcquisitionPlan) -> Self {
        Self { plan }
    }

    /// The burst plan
    pub fn plan(&self) -> AcquisitionPlan {
        self.plan
    }

    /// Collect every burst in order, printing a preview of each raw response
    /// to `console`. The first failure aborts the run and no partial series is
    /// returned.
    pub async fn run<E: ScpiEndpoint>(
        &self,
        session: &mut Keithley6514<E>,
        console: &mut impl Write,
    ) -> AppResult<SampleSeries> {
        let mut series = SampleSeries::new();
        for burst in 0..self.plan.bursts {
            let raw = session.read_burst(self.plan.points_per_burst).await?;
            writeln!(console, "Raw data: {}", preview(&raw, PREVIEW_CHARS))?;
            let currents = parse_trace(&raw)?;
            debug!(burst, readings = currents.len(), "burst complete");
            series.extend_burst(currents);
        }
        info!(
            "collected {} readings in {} bursts",
            series.len(),
            self.plan.bursts
        );
        Ok(series)
    }
}
