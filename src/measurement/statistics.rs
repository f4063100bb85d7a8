//! Summary statistics over a current series.

use serde::Serialize;

use crate::error::{AppResult, DaqError};

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Sample standard deviation with the N-1 denominator.
///
/// # Errors
///
/// [`DaqError::InsufficientSamples`] for fewer than two samples.
pub fn sample_std_dev(samples: &[f64]) -> AppResult<f64> {
    if samples.len() < 2 {
        return Err(DaqError::InsufficientSamples(samples.len()));
    }
    let mean = mean(samples).unwrap_or_default();
    let sum_sq: f64 = samples.iter().map(|x| (x - mean).powi(2)).sum();
    Ok((sum_sq / (samples.len() - 1) as f64).sqrt())
}

/// Mean and sample standard deviation of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStatistics {
    /// Arithmetic mean in amperes
    pub mean: f64,
    /// Sample standard deviation (1σ) in amperes
    pub std_dev: f64,
    /// Number of samples the statistics cover
    pub count: usize,
}

impl SummaryStatistics {
    /// Compute over `samples`.
    ///
    /// # Errors
    ///
    /// [`DaqError::InsufficientSamples`] for fewer than two samples.
    pub fn from_samples(samples: &[f64]) -> AppResult<Self> {
        let std_dev = sample_std_dev(samples)?;
        Ok(Self {
            mean: mean(samples).unwrap_or_default(),
            std_dev,
            count: samples.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[4.0]), Some(4.0));
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
    }

    #[test]
    fn test_sample_std_dev_known_values() {
        // Population σ is 2.0 for this set; the N-1 estimator gives sqrt(32/7).
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(approx_eq(sample_std_dev(&data).unwrap(), (32.0f64 / 7.0).sqrt()));

        assert!(approx_eq(sample_std_dev(&[1.0, 2.0]).unwrap(), 0.5f64.sqrt()));
        assert_eq!(sample_std_dev(&[3.0, 3.0, 3.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_small_currents() {
        let data = [1.0e-9, 1.2e-9, 0.8e-9, 1.1e-9];
        let stats = SummaryStatistics::from_samples(&data).unwrap();
        assert!(approx_eq(stats.mean, 1.025e-9));
        let expected = ((0.025f64.powi(2) + 0.175f64.powi(2) + 0.225f64.powi(2) + 0.075f64.powi(2))
            / 3.0)
            .sqrt()
            * 1e-9;
        assert!((stats.std_dev - expected).abs() < 1e-21);
        assert_eq!(stats.count, 4);
    }

    #[test]
    fn test_fewer_than_two_samples_fails() {
        assert!(matches!(
            sample_std_dev(&[]),
            Err(DaqError::InsufficientSamples(0))
        ));
        assert!(matches!(
            SummaryStatistics::from_samples(&[1.0]),
            Err(DaqError::InsufficientSamples(1))
        ));
    }
}
