//! Screener Common - Shared utilities for the equity screener workspace.
//!
//! This crate provides:
//! - Error types and handling utilities
//! - Logging setup
//! - Configuration directory resolution and modular JSON loading
//! - Configuration validation

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod config_loader;
pub mod error;
pub mod logging;
pub mod validation;

pub use config::{config_dir, ObservabilityConfig};
pub use error::{Error, Result};
pub use validation::{Validate, ValidationError, ValidationResult};
