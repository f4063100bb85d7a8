//! Simulated Keithley 6514 endpoint
//!
//! Provides a [`ScpiEndpoint`] that behaves like an electrometer with a filled
//! trace buffer, without requiring physical hardware. It provides:
//! - Synthetic `TRAC:DATA?` triples sized by the last `TRAC:POIN`
//! - Scripted per-command responses
//! - Controllable failure injection
//! - Call logging for test verification
//!
//! Clones share state, so a test can keep a handle after moving the endpoint
//! into a session.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

use crate::error::{AppResult, DaqError};
use crate::traits::ScpiEndpoint;

const MOCK_IDENTITY: &str = "KEITHLEY INSTRUMENTS INC.,MODEL 6514,0000000,A13 /A02  ";

/// Simulated SCPI endpoint
///
/// # Example
///
/// ```
/// use electrometer_daq::adapters::MockEndpoint;
///
/// let endpoint = MockEndpoint::new("GPIB0::14::INSTR")
///     .with_response("TRAC:DATA?", "1.0,0,1,2.0,0,2");
/// assert!(endpoint.call_log().is_empty());
/// ```
#[derive(Clone)]
pub struct MockEndpoint {
    resource_name: String,
    state: Arc<Mutex<MockState>>,
}

struct MockState {
    open: bool,
    close_calls: usize,
    trace_points: usize,
    readings_served: u64,
    base_current: f64,
    scripted: HashMap<String, VecDeque<String>>,
    fail_on: Option<String>,
    call_log: Vec<String>,
}

impl MockEndpoint {
    /// Create an open endpoint simulating roughly 1.5 nA of input current
    pub fn new(resource_name: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            state: Arc::new(Mutex::new(MockState {
                open: true,
                close_calls: 0,
                trace_points: 0,
                readings_served: 0,
                base_current: 1.5e-9,
                scripted: HashMap::new(),
                fail_on: None,
                call_log: Vec::new(),
            })),
        }
    }

    /// Set the simulated input current in amperes
    pub fn with_base_current(self, amps: f64) -> Self {
        self.state().base_current = amps;
        self
    }

    /// Queue a response for a query; queued responses are served in order
    /// before the simulation takes over again.
    pub fn with_response(self, query: &str, response: impl Into<String>) -> Self {
        self.state()
            .scripted
            .entry(query.to_string())
            .or_default()
            .push_back(response.into());
        self
    }

    /// Fail every command starting with `prefix`
    pub fn fail_on(self, prefix: &str) -> Self {
        self.state().fail_on = Some(prefix.to_string());
        self
    }

    /// Commands received so far, in order, without terminators
    pub fn call_log(&self) -> Vec<String> {
        self.state().call_log.clone()
    }

    /// Number of times `close()` was called
    pub fn close_calls(&self) -> usize {
        self.state().close_calls
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn accept(&self, cmd: &str) -> AppResult<MutexGuard<'_, MockState>> {
        let mut state = self.state();
        state.call_log.push(cmd.to_string());

        if !state.open {
            return Err(DaqError::Communication(format!(
                "Mock endpoint '{}' is closed",
                self.resource_name
            )));
        }
        if let Some(prefix) = &state.fail_on {
            if cmd.starts_with(prefix.as_str()) {
                return Err(DaqError::Communication(format!(
                    "Mock failure injected for: {}",
                    cmd
                )));
            }
        }
        Ok(state)
    }
}

impl MockState {
    fn synthesize_trace(&mut self) -> String {
        let mut values = Vec::with_capacity(self.trace_points);
        for _ in 0..self.trace_points {
            let k = self.readings_served as f64;
            // Deterministic ripple instead of an RNG keeps runs reproducible.
            let current = self.base_current * (1.0 + 0.01 * (k * 0.7).sin());
            values.push(format!("{:.6E},{:.3},{}", current, k * 0.1, 0));
            self.readings_served += 1;
        }
        format!("{}\n", values.join(","))
    }
}

#[async_trait]
impl ScpiEndpoint for MockEndpoint {
    async fn write(&mut self, cmd: &str) -> AppResult<()> {
        let mut state = self.accept(cmd)?;
        if let Some(arg) = cmd.strip_prefix("TRAC:POIN ") {
            state.trace_points = arg.trim().parse().unwrap_or(0);
        }
        trace!("mock write: {}", cmd);
        Ok(())
    }

    async fn query(&mut self, cmd: &str) -> AppResult<String> {
        let mut state = self.accept(cmd)?;
        if let Some(response) = state.scripted.get_mut(cmd).and_then(VecDeque::pop_front) {
            return Ok(response);
        }

        let response = match cmd {
            "*IDN?" => format!("{}\n", MOCK_IDENTITY),
            "TRAC:DATA?" => state.synthesize_trace(),
            other => {
                return Err(DaqError::Communication(format!(
                    "Mock endpoint has no response for: {}",
                    other
                )))
            }
        };
        trace!("mock query '{}' -> {} bytes", cmd, response.len());
        Ok(response)
    }

    fn close(&mut self) -> AppResult<()> {
        let mut state = self.state();
        state.close_calls += 1;
        state.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state().open
    }

    fn resource_name(&self) -> &str {
        &self.resource_name
    }
}
