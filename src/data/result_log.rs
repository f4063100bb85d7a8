//! Append-only tab-separated result log.
//!
//! One line per successful run:
//!
//! ```text
//! <voltage as entered>\t<mean, 6 fraction digits>\t<std dev, 1 fraction digit>\n
//! 5\t1.234560e-09\t4.5e-11
//! ```
//!
//! The log is shared across runs and is never truncated or rewritten.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::AppResult;
use crate::measurement::SummaryStatistics;

/// Fraction digits used for the mean column
pub const MEAN_DIGITS: usize = 6;
/// Fraction digits used for the standard deviation column
pub const STD_DEV_DIGITS: usize = 1;

/// Scientific notation with `fraction_digits` after the point and a signed,
/// at least two-digit exponent (`1.234560e-09`, `4.5e+03`).
pub fn format_scientific(value: f64, fraction_digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string().to_lowercase();
    }
    let rust = format!("{:.*e}", fraction_digits, value);
    match rust.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => rust,
    }
}

/// One result line
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    /// Voltage exactly as the operator entered it
    pub voltage: String,
    /// Mean current in amperes
    pub mean: f64,
    /// Sample standard deviation in amperes
    pub std_dev: f64,
}

impl ResultRecord {
    /// Record for `voltage` and the run statistics
    pub fn new(voltage: impl Into<String>, stats: &SummaryStatistics) -> Self {
        Self {
            voltage: voltage.into(),
            mean: stats.mean,
            std_dev: stats.std_dev,
        }
    }

    /// The three formatted fields
    pub fn fields(&self) -> [String; 3] {
        [
            self.voltage.clone(),
            format_scientific(self.mean, MEAN_DIGITS),
            format_scientific(self.std_dev, STD_DEV_DIGITS),
        ]
    }

    /// The full line including the trailing newline
    pub fn to_line(&self) -> String {
        format!("{}\n", self.fields().join("\t"))
    }
}

/// Append-only result file
#[derive(Debug, Clone)]
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    /// Log at `path`; nothing is touched until [`append`](Self::append)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file if needed.
    pub fn append(&self, record: &ResultRecord) -> AppResult<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'))
            .has_headers(false)
            .from_writer(file);

        writer
            .write_record(record.fields())
            .map_err(std::io::Error::from)?;
        writer.flush()?;

        info!("appended result to '{}'", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_format_scientific() {
        assert_eq!(format_scientific(1.23456e-9, 6), "1.234560e-09");
        assert_eq!(format_scientific(4.5e-11, 1), "4.5e-11");
        assert_eq!(format_scientific(-2.0e-12, 2), "-2.00e-12");
        assert_eq!(format_scientific(4500.0, 1), "4.5e+03");
        assert_eq!(format_scientific(1.0e-100, 1), "1.0e-100");
        assert_eq!(format_scientific(0.0, 6), "0.000000e+00");
        assert_eq!(format_scientific(1.0, 1), "1.0e+00");
    }

    #[test]
    fn test_record_line_exact() {
        let record = ResultRecord {
            voltage: "5".to_string(),
            mean: 1.23456e-9,
            std_dev: 4.5e-11,
        };
        assert_eq!(record.to_line(), "5\t1.234560e-09\t4.5e-11\n");
    }

    #[test]
    fn test_voltage_kept_verbatim() {
        let record = ResultRecord {
            voltage: " -12.50 V".to_string(),
            mean: 1.0e-9,
            std_dev: 1.0e-11,
        };
        assert!(record.to_line().starts_with(" -12.50 V\t"));
    }

    #[test]
    fn test_append_creates_then_appends() {
        let dir = tempdir().unwrap();
        let log = ResultLog::new(dir.path().join("pyvisa_IV_6514.txt"));

        let first = ResultRecord {
            voltage: "5".to_string(),
            mean: 1.23456e-9,
            std_dev: 4.5e-11,
        };
        let second = ResultRecord {
            voltage: "10".to_string(),
            mean: 2.5e-9,
            std_dev: 3.0e-11,
        };
        log.append(&first).unwrap();
        log.append(&second).unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            contents,
            "5\t1.234560e-09\t4.5e-11\n10\t2.500000e-09\t3.0e-11\n"
        );
    }

    #[test]
    fn test_append_preserves_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");
        std::fs::write(&path, "1\t1.000000e-09\t1.0e-11\n").unwrap();

        ResultLog::new(&path)
            .append(&ResultRecord {
                voltage: "2".to_string(),
                mean: 2.0e-9,
                std_dev: 2.0e-11,
            })
            .unwrap();

        let lines: Vec<String> = std::fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        assert_eq!(lines, vec!["1\t1.000000e-09\t1.0e-11", "2\t2.000000e-09\t2.0e-11"]);
    }
}
