//! # Workflows Module
//!
//! High-level entry points that turn a [`SystemSetup`](crate::engine::config::SystemSetup)
//! into a validated periodic system.
//!
//! - **Assembly Workflow** ([`assemble`]) - Builds one representative molecule per type,
//!   places its copies in the box and validates the result.

pub mod assemble;
