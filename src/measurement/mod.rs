//! Sample aggregation and statistics.

pub mod aggregator;
pub mod statistics;

pub use aggregator::{AcquisitionPlan, Aggregator, SampleSeries};
pub use statistics::SummaryStatistics;
