//! Trace buffer response parsing.
//!
//! `TRAC:DATA?` returns one comma-separated line holding a triple per reading
//! (current, timestamp, status). Only the current of each triple is kept.

use crate::error::{AppResult, DaqError};

/// Values per stored reading
pub const VALUES_PER_READING: usize = 3;

/// Parse a comma-separated numeric response into a flat list, in order.
///
/// # Errors
///
/// [`DaqError::Parse`] if any field is not a floating-point number, including
/// an empty response.
pub fn parse_values(raw: &str) -> AppResult<Vec<f64>> {
    raw.trim()
        .split(',')
        .enumerate()
        .map(|(index, field)| {
            let field = field.trim();
            field.parse::<f64>().map_err(|_| {
                DaqError::Parse(format!("field {} is not a number: '{}'", index, field))
            })
        })
        .collect()
}

/// Parse a full trace response and return the current reading of each triple.
///
/// # Errors
///
/// [`DaqError::Parse`] if a field is not numeric or the number of values is not
/// a multiple of [`VALUES_PER_READING`].
pub fn parse_trace(raw: &str) -> AppResult<Vec<f64>> {
    let values = parse_values(raw)?;
    if values.len() % VALUES_PER_READING != 0 {
        return Err(DaqError::Parse(format!(
            "expected a multiple of {} values, got {}",
            VALUES_PER_READING,
            values.len()
        )));
    }
    Ok(values.into_iter().step_by(VALUES_PER_READING).collect())
}

/// First `max_chars` characters of the trimmed response, with `...` appended.
pub fn preview(raw: &str, max_chars: usize) -> String {
    let head: String = raw.trim().chars().take(max_chars).collect();
    format!("{}...", head)
}
