//! ScpiEndpoint instrument seam
//!
//! Hardware-agnostic interface for SCPI command execution.
//! Implementations handle protocol-specific details (VISA over GPIB, simulation).

use async_trait::async_trait;

use crate::error::AppResult;

/// SCPI endpoint trait
///
/// One exclusively owned communication channel to one addressed instrument.
///
/// ## Command Semantics
/// - `write` sends a command and returns without reading
/// - `query` sends a command and reads one terminated response
/// - Commands are executed strictly in call order; callers never pipeline
///
/// ## Error Recovery
/// - None. Any failure is returned as [`crate::error::DaqError::Communication`]
///   and the caller aborts the run.
///
/// ## Release
/// - `close()` must tolerate an endpoint that is already closed or was never
///   fully opened, and must be safe to call more than once.
#[async_trait]
pub trait ScpiEndpoint: Send {
    /// Send command without expecting response
    ///
    /// # Arguments
    /// * `cmd` - SCPI command string without terminator (e.g., "*RST", "TRAC:CLE")
    ///
    /// # Errors
    /// - Hardware communication error
    /// - Endpoint already closed
    async fn write(&mut self, cmd: &str) -> AppResult<()>;

    /// Send command and read response
    ///
    /// # Arguments
    /// * `cmd` - SCPI query string (e.g., "*IDN?", "TRAC:DATA?")
    ///
    /// # Returns
    /// - Raw response text; the read terminator may still be attached
    ///
    /// # Errors
    /// - Hardware communication error
    /// - Timeout (implementation-dependent)
    async fn query(&mut self, cmd: &str) -> AppResult<String>;

    /// Query instrument identity (*IDN?), trimmed
    async fn identify(&mut self) -> AppResult<String> {
        Ok(self.query("*IDN?").await?.trim().to_string())
    }

    /// Reset instrument to factory defaults (*RST)
    async fn reset(&mut self) -> AppResult<()> {
        self.write("*RST").await
    }

    /// Clear error queue and event status register (*CLS)
    async fn clear_status(&mut self) -> AppResult<()> {
        self.write("*CLS").await
    }

    /// Release the instrument session and any resource manager behind it.
    fn close(&mut self) -> AppResult<()>;

    /// Whether the endpoint still holds an open session
    fn is_open(&self) -> bool;

    /// Resource identifier the endpoint was opened with
    fn resource_name(&self) -> &str;
}
