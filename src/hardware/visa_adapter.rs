//! VISA Hardware Adapter for GPIB instruments
//!
//! Builder-based [`ScpiEndpoint`] over the system VISA library (visa-rs).
//! The adapter owns both the resource manager and the instrument session, so
//! no process-wide manager exists; dropping or closing the adapter releases both.
//!
//! Supports resource strings like:
//! - "GPIB0::14::INSTR" (GPIB interface, the 6514 default)
//! - "USB0::0x1234::0x5678::SERIAL::INSTR" (USB)
//! - "TCPIP0::192.168.1.100::INSTR" (Ethernet/LXI)
//!
//! Without the `instrument_visa` feature, [`VisaAdapterBuilder::open`] fails with
//! [`DaqError::FeatureNotEnabled`].

use async_trait::async_trait;
use std::time::Duration;
#[cfg(feature = "instrument_visa")]
use tracing::debug;

use crate::error::{AppResult, DaqError};
use crate::traits::ScpiEndpoint;

#[cfg(feature = "instrument_visa")]
use std::ffi::CString;
#[cfg(feature = "instrument_visa")]
use std::io::{BufRead, BufReader, Write};
#[cfg(feature = "instrument_visa")]
use visa_rs::{flags::AccessMode, DefaultRM, Instrument};

/// Builder for constructing [`VisaAdapter`] with custom configuration
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use electrometer_daq::hardware::VisaAdapterBuilder;
///
/// # async fn example() -> electrometer_daq::error::AppResult<()> {
/// let adapter = VisaAdapterBuilder::new("GPIB0::14::INSTR")
///     .with_timeout(Duration::from_millis(2000))
///     .open()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct VisaAdapterBuilder {
    resource_name: String,
    timeout: Duration,
    write_terminator: String,
}

impl VisaAdapterBuilder {
    /// Create a new builder with resource name
    pub fn new(resource_name: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            timeout: Duration::from_secs(5),
            write_terminator: "\n".to_string(),
        }
    }

    /// Set open timeout for the VISA session
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set write terminator character(s)
    pub fn with_write_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.write_terminator = terminator.into();
        self
    }

    /// Open the resource manager and the instrument session
    ///
    /// # Errors
    /// Returns [`DaqError::Communication`] if VISA cannot be initialised or the
    /// resource cannot be opened.
    #[cfg(feature = "instrument_visa")]
    pub fn open(self) -> AppResult<VisaAdapter> {
        let rm = DefaultRM::new().map_err(|e| {
            DaqError::Communication(format!("Failed to create VISA resource manager: {}", e))
        })?;

        let resource = CString::new(self.resource_name.clone()).map_err(|e| {
            DaqError::Communication(format!(
                "Invalid VISA resource '{}': {}",
                self.resource_name, e
            ))
        })?;

        let instrument = rm
            .open(&resource.into(), AccessMode::NO_LOCK, self.timeout)
            .map_err(|e| {
                DaqError::Communication(format!(
                    "Failed to open VISA resource {}: {}",
                    self.resource_name, e
                ))
            })?;

        debug!(
            "VISA resource '{}' opened with {}ms timeout",
            self.resource_name,
            self.timeout.as_millis()
        );

        Ok(VisaAdapter {
            resource_name: self.resource_name,
            write_terminator: self.write_terminator,
            instrument: Some(instrument),
            manager: Some(rm),
        })
    }

    /// Open is unavailable without VISA support
    #[cfg(not(feature = "instrument_visa"))]
    pub fn open(self) -> AppResult<VisaAdapter> {
        let _ = (self.resource_name, self.timeout, self.write_terminator);
        Err(DaqError::FeatureNotEnabled("instrument_visa".to_string()))
    }
}

/// VISA adapter for SCPI instruments
///
/// I/O is performed directly on the calling task; the session is never shared.
pub struct VisaAdapter {
    resource_name: String,

    #[cfg(feature = "instrument_visa")]
    write_terminator: String,

    #[cfg(feature = "instrument_visa")]
    instrument: Option<Instrument>,

    #[cfg(feature = "instrument_visa")]
    manager: Option<DefaultRM>,
}

#[cfg(feature = "instrument_visa")]
impl VisaAdapter {
    fn session(&self) -> AppResult<&Instrument> {
        self.instrument.as_ref().ok_or_else(|| {
            DaqError::Communication(format!(
                "VISA instrument '{}' not connected",
                self.resource_name
            ))
        })
    }

    fn send(&self, cmd: &str) -> AppResult<()> {
        let mut session = self.session()?;
        let line = format!("{}{}", cmd, self.write_terminator);
        session
            .write_all(line.as_bytes())
            .map_err(|e| DaqError::Communication(format!("VISA write failed for {}: {}", cmd, e)))
    }
}

#[cfg(feature = "instrument_visa")]
#[async_trait]
impl ScpiEndpoint for VisaAdapter {
    async fn write(&mut self, cmd: &str) -> AppResult<()> {
        self.send(cmd)?;
        debug!("VISA command sent: {}", cmd);
        Ok(())
    }

    async fn query(&mut self, cmd: &str) -> AppResult<String> {
        self.send(cmd)?;

        let mut response = String::new();
        {
            let mut reader = BufReader::new(self.session()?);
            reader.read_line(&mut response).map_err(|e| {
                DaqError::Communication(format!("VISA read failed for {}: {}", cmd, e))
            })?;
        }

        debug!("VISA query '{}' -> {} bytes", cmd, response.len());
        Ok(response)
    }

    fn close(&mut self) -> AppResult<()> {
        if self.instrument.take().is_some() {
            debug!("VISA resource '{}' closed", self.resource_name);
        }
        self.manager = None;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.instrument.is_some()
    }

    fn resource_name(&self) -> &str {
        &self.resource_name
    }
}

#[cfg(not(feature = "instrument_visa"))]
#[async_trait]
impl ScpiEndpoint for VisaAdapter {
    async fn write(&mut self, _cmd: &str) -> AppResult<()> {
        Err(DaqError::FeatureNotEnabled("instrument_visa".to_string()))
    }

    async fn query(&mut self, _cmd: &str) -> AppResult<String> {
        Err(DaqError::FeatureNotEnabled("instrument_visa".to_string()))
    }

    fn close(&mut self) -> AppResult<()> {
        Ok(())
    }

    fn is_open(&self) -> bool {
        false
    }

    fn resource_name(&self) -> &str {
        &self.resource_name
    }
}
