//! Shared errors and configuration for the multinomial workspace.
//!
//! This crate provides foundational types shared across mn-core modules:
//! - The error taxonomy with stable codes
//! - Evaluation options and their file-based configuration

pub mod config;
pub mod error;

pub use config::{Config, ConfigPaths, ConfigResolver, ConfigSource, DistributionOptions};
pub use error::{Error, ErrorCategory, Result, SampleConstraint, StructuredError};
