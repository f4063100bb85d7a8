//! Hardware transports.

pub mod visa_adapter;

pub use visa_adapter::{VisaAdapter, VisaAdapterBuilder};
