//! Buffer-fill wait strategies.
//!
//! The 6514 is not polled for completion; the session simply waits long enough
//! for the requested number of readings to land in the trace buffer. Keeping the
//! wait behind [`WaitPolicy`] lets a status-polling strategy replace it later
//! without touching the acquisition routine.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::config::AcquisitionConfig;

/// Decides how long to wait between `INIT` and `TRAC:DATA?`
#[async_trait]
pub trait WaitPolicy: Send + Sync {
    /// Wait until a burst of `points` readings should be complete.
    async fn wait_for_buffer(&self, points: usize);
}

/// Non-adaptive delay: `base + per_point * points`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay {
    /// Fixed part of the wait
    pub base: Duration,
    /// Added for every requested point
    pub per_point: Duration,
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(2),
            per_point: Duration::from_millis(100),
        }
    }
}

impl FixedDelay {
    /// Delay for a burst of `points` readings
    pub fn duration_for(&self, points: usize) -> Duration {
        let points = u32::try_from(points).unwrap_or(u32::MAX);
        self.base + self.per_point.saturating_mul(points)
    }
}

impl From<&AcquisitionConfig> for FixedDelay {
    fn from(config: &AcquisitionConfig) -> Self {
        Self {
            base: Duration::from_millis(config.wait_base_ms),
            per_point: Duration::from_millis(config.wait_per_point_ms),
        }
    }
}

#[async_trait]
impl WaitPolicy for FixedDelay {
    async fn wait_for_buffer(&self, points: usize) {
        let delay = self.duration_for(points);
        debug!("waiting {:?} for {} trace points", delay, points);
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn test_default_delay_formula() {
        let delay = FixedDelay::default();
        assert_eq!(delay.duration_for(0), Duration::from_secs(2));
        assert_eq!(delay.duration_for(10), Duration::from_secs(3));
        assert_eq!(delay.duration_for(100), Duration::from_secs(12));
    }

    #[test]
    fn test_from_config() {
        let config = AcquisitionConfig {
            bursts: 1,
            points_per_burst: 5,
            wait_base_ms: 500,
            wait_per_point_ms: 20,
        };
        let delay = FixedDelay::from(&config);
        assert_eq!(delay.duration_for(5), Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_sleeps_full_duration() {
        let start = Instant::now();
        FixedDelay::default().wait_for_buffer(10).await;
        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}
