//! Shared utilities for finmetric
//!
//! This crate provides common functionality used across the finmetric workspace:
//! logging setup and `.env` loading for the binaries.

pub mod config;
pub mod logging;

pub use config::load_env_file;
pub use logging::{init_tracing, init_tracing_with};
