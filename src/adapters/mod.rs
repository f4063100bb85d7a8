//! Simulated adapters
//!
//! Implementations of [`crate::traits::ScpiEndpoint`] that need no hardware,
//! used by the test suite and the `--simulate` flag.

pub mod mock_adapter;

pub use mock_adapter::MockEndpoint;
