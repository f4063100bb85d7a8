//! Keithley 6514 electrometer session
//!
//! Wraps an open [`ScpiEndpoint`] and drives the current-measurement procedure:
//! reset and identity, front-end setup, zero correction, and trace-buffer bursts.
//!
//! The session owns the endpoint exclusively. [`Keithley6514::close`] releases
//! it, and `Drop` does the same, so the bus is freed on every exit path.
//!
//! ## Command sequence
//!
//! ```text
//! connect:       *RST, *CLS, *IDN?
//! configure:     FUNC 'CURR', CURR:RANG <r>, CURR:NPLC <n>, CURR:DAMP OFF
//! zero_correct:  SYST:ZCH ON, <settle>, SYST:ZCOR ON, SYST:ZCH OFF
//! read_burst:    TRAC:CLE, TRAC:POIN <n>, TRAC:FEED SENS, TRAC:FEED:CONT NEXT,
//!                TRIG:SOUR IMM, TRIG:COUN <n>, INIT, <wait>, TRAC:DATA?
//! ```
//!
//! [`Keithley6514::initialize`] is `connect` followed by `configure`, and
//! [`Keithley6514::collect_burst`] is `read_burst` followed by trace parsing.

use std::time::Duration;
use tracing::{debug, info, instrument};

use super::trace::{parse_trace, preview};
use super::wait::{FixedDelay, WaitPolicy};
use crate::config::Settings;
use crate::error::{AppResult, DaqError};
use crate::traits::ScpiEndpoint;

/// Characters of raw trace text shown in the diagnostic preview
pub const PREVIEW_CHARS: usize = 80;

/// Keithley 6514 session over any SCPI endpoint
pub struct Keithley6514<E: ScpiEndpoint> {
    endpoint: Option<E>,
    current_range: String,
    nplc: String,
    zero_check_settle: Duration,
    wait: Box<dyn WaitPolicy>,
}

impl<E: ScpiEndpoint> Keithley6514<E> {
    /// Wrap an opened endpoint, taking setup values from `settings`
    pub fn new(endpoint: E, settings: &Settings) -> Self {
        Self {
            endpoint: Some(endpoint),
            current_range: settings.instrument.current_range.clone(),
            nplc: settings.instrument.nplc.clone(),
            zero_check_settle: settings.zero_check_settle(),
            wait: Box::new(FixedDelay::from(&settings.acquisition)),
        }
    }

    /// Replace the buffer-fill wait strategy
    pub fn with_wait_policy(mut self, wait: impl WaitPolicy + 'static) -> Self {
        self.wait = Box::new(wait);
        self
    }

    /// Whether the endpoint has not been released yet
    pub fn is_open(&self) -> bool {
        self.endpoint.as_ref().is_some_and(|e| e.is_open())
    }

    fn endpoint(&mut self) -> AppResult<&mut E> {
        self.endpoint
            .as_mut()
            .ok_or_else(|| DaqError::Communication("instrument session already closed".into()))
    }

    async fn write(&mut self, cmd: &str) -> AppResult<()> {
        self.endpoint()?.write(cmd).await
    }

    /// Reset, clear status and read the identity.
    ///
    /// Returns the trimmed `*IDN?` response.
    #[instrument(skip(self))]
    pub async fn connect(&mut self) -> AppResult<String> {
        let endpoint = self.endpoint()?;
        endpoint.reset().await?;
        endpoint.clear_status().await?;
        let identity = endpoint.identify().await?;
        info!("connected: {}", identity);
        Ok(identity)
    }

    /// Select current measurement with the configured range and NPLC, damping off.
    #[instrument(skip(self))]
    pub async fn configure(&mut self) -> AppResult<()> {
        self.write("FUNC 'CURR'").await?;
        let range = format!("CURR:RANG {}", self.current_range);
        self.write(&range).await?;
        let nplc = format!("CURR:NPLC {}", self.nplc);
        self.write(&nplc).await?;
        self.write("CURR:DAMP OFF").await
    }

    /// [`connect`](Self::connect) then [`configure`](Self::configure).
    pub async fn initialize(&mut self) -> AppResult<String> {
        let identity = self.connect().await?;
        self.configure().await?;
        Ok(identity)
    }

    /// Acquire and enable zero correction.
    ///
    /// Zero check stays on for the settling time before the offset is captured.
    #[instrument(skip(self))]
    pub async fn zero_correct(&mut self) -> AppResult<()> {
        self.write("SYST:ZCH ON").await?;
        tokio::time::sleep(self.zero_check_settle).await;
        self.write("SYST:ZCOR ON").await?;
        self.write("SYST:ZCH OFF").await?;
        debug!("zero correction enabled");
        Ok(())
    }

    /// Run one trace-buffer burst of `points` readings and return the raw
    /// `TRAC:DATA?` text.
    ///
    /// # Errors
    ///
    /// - [`DaqError::InvalidPointCount`] for `points == 0`; nothing is sent
    /// - [`DaqError::Communication`] for any command failure
    #[instrument(skip(self))]
    pub async fn read_burst(&mut self, points: usize) -> AppResult<String> {
        if points == 0 {
            return Err(DaqError::InvalidPointCount(points));
        }

        self.write("TRAC:CLE").await?;
        self.write(&format!("TRAC:POIN {}", points)).await?;
        self.write("TRAC:FEED SENS").await?;
        self.write("TRAC:FEED:CONT NEXT").await?;
        self.write("TRIG:SOUR IMM").await?;
        self.write(&format!("TRIG:COUN {}", points)).await?;
        self.write("INIT").await?;

        self.wait.wait_for_buffer(points).await;

        let raw = self.endpoint()?.query("TRAC:DATA?").await?;
        debug!("raw data: {}", preview(&raw, PREVIEW_CHARS));
        Ok(raw)
    }

    /// Run one burst and return the currents in order.
    ///
    /// # Errors
    ///
    /// As [`read_burst`](Self::read_burst), plus [`DaqError::Parse`] for a
    /// malformed buffer response.
    pub async fn collect_burst(&mut self, points: usize) -> AppResult<Vec<f64>> {
        let raw = self.read_burst(points).await?;
        let currents = parse_trace(&raw)?;
        debug!("burst returned {} readings", currents.len());
        Ok(currents)
    }

    /// Release the endpoint. Errors are logged and swallowed; calling this on an
    /// already closed session does nothing.
    pub fn close(&mut self) {
        if let Some(mut endpoint) = self.endpoint.take() {
            let resource = endpoint.resource_name().to_string();
            match endpoint.close() {
                Ok(()) => debug!("released instrument '{}'", resource),
                Err(e) => debug!("ignoring error while releasing '{}': {}", resource, e),
            }
        }
    }
}

impl<E: ScpiEndpoint> Drop for Keithley6514<E> {
    fn drop(&mut self) {
        self.close();
    }
}
