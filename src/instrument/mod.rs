//! Keithley 6514 driver: session, trace parsing and buffer wait strategies.

pub mod keithley_6514;
pub mod trace;
pub mod wait;

pub use keithley_6514::Keithley6514;
pub use wait::{FixedDelay, WaitPolicy};
