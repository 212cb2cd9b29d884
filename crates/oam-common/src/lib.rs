//! OTel Java agent manager shared foundation.
//!
//! This crate provides the types shared across oam-core modules:
//! - Unified error taxonomy for lifecycle operations
//! - Agent configuration and its CLI/env/file resolution
//! - Output format specifications

pub mod config;
pub mod error;
pub mod output;

pub use config::{AgentConfig, ConfigOverrides, FileConfig};
pub use error::{Error, ErrorCategory, Result};
pub use output::OutputFormat;
