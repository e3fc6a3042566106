//! # Engine Module
//!
//! Setup types, progress reporting and the error type shared by the workflows.
//!
//! - **Configuration** ([`config`]) - Box, search parameters and per-type molecule setups
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-level error wrapping the model errors

pub mod config;
pub mod error;
pub mod progress;
