//! Result persistence.

pub mod result_log;

pub use result_log::{format_scientific, ResultLog, ResultRecord};
