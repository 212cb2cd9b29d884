//! Error types for the agent lifecycle manager.
//!
//! Errors carry a stable numeric code and a category. The category drives
//! exit-code mapping at the CLI layer; the code is stable for machine
//! parsing of structured output.
//!
//! Fatality is positional, not a property of the type: the same `NotFound`
//! that aborts a rollback is logged-and-ignored when it happens inside a
//! best-effort pre-operation backup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for lifecycle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Version lookup against the release-metadata endpoint failed.
    Resolution,
    /// Artifact download transport or status failure.
    Fetch,
    /// An expected source file or backup entry is absent.
    NotFound,
    /// Directory creation, copy, or removal failure.
    Filesystem,
    /// Configuration file errors.
    Config,
    /// Serialization errors.
    Serialization,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Resolution => write!(f, "resolution"),
            ErrorCategory::Fetch => write!(f, "fetch"),
            ErrorCategory::NotFound => write!(f, "not_found"),
            ErrorCategory::Filesystem => write!(f, "filesystem"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Serialization => write!(f, "serialization"),
        }
    }
}

/// Unified error type for the agent lifecycle manager.
#[derive(Error, Debug)]
pub enum Error {
    // Resolution errors (10-19)
    #[error("version resolution failed: {0}")]
    Resolution(String),

    #[error("release metadata request returned HTTP {status}")]
    ResolutionStatus { status: u16 },

    #[error("latest release carried no usable tag")]
    EmptyReleaseTag,

    // Fetch errors (20-29)
    #[error("artifact download failed: {0}")]
    Fetch(String),

    #[error("artifact download returned HTTP {status}")]
    FetchStatus { status: u16 },

    // Missing-file errors (30-39)
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("no backup found for rollback")]
    NoBackup,

    // Filesystem errors (40-49)
    #[error("filesystem operation failed on {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Ambient errors (50-59)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an I/O error with the path it occurred on.
    pub fn fs(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Filesystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Returns the stable error code for this error.
    ///
    /// Codes are grouped by category:
    /// - 10-19: Resolution errors
    /// - 20-29: Fetch errors
    /// - 30-39: Missing-file errors
    /// - 40-49: Filesystem errors
    /// - 50-59: Ambient errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Resolution(_) => 10,
            Error::ResolutionStatus { .. } => 11,
            Error::EmptyReleaseTag => 12,
            Error::Fetch(_) => 20,
            Error::FetchStatus { .. } => 21,
            Error::NotFound { .. } => 30,
            Error::NoBackup => 31,
            Error::Filesystem { .. } => 40,
            Error::Config(_) => 50,
            Error::Json(_) => 51,
        }
    }

    /// Returns the error category for grouping and exit-code mapping.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Resolution(_) | Error::ResolutionStatus { .. } | Error::EmptyReleaseTag => {
                ErrorCategory::Resolution
            }
            Error::Fetch(_) | Error::FetchStatus { .. } => ErrorCategory::Fetch,
            Error::NotFound { .. } | Error::NoBackup => ErrorCategory::NotFound,
            Error::Filesystem { .. } => ErrorCategory::Filesystem,
            Error::Config(_) => ErrorCategory::Config,
            Error::Json(_) => ErrorCategory::Serialization,
        }
    }
}
