//! Instrument-facing traits.

pub mod scpi_endpoint;

pub use scpi_endpoint::ScpiEndpoint;
