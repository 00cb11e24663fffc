//! # chainabi-observability
//!
//! Structured logging for ChainABI binaries and services.
//!
//! Library crates only emit `tracing` events; installing a subscriber is
//! left to the process, through [`init_tracing`]. Output is either
//! human-readable text or JSON lines (ELK, Loki, CloudWatch), and log
//! levels can be set per component.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, LogConfig, TracingError};
