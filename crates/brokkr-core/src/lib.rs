//! # brokkr-core
//!
//! Core library for Brokkr providing:
//! - Configuration file parsing (brokkr.yaml) with environment overrides
//! - Type definitions for manifests, extension descriptors, credentials and build specs
//! - The error taxonomy shared by every Brokkr crate
//! - Sequential and independent pipeline combinators

pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

pub use config::BrokkrConfig;
pub use error::{Error, Result};
