//! Exit codes for the oam CLI.
//!
//! Exit codes communicate operation outcome without parsing stdout.
//! Ranges:
//! - 0: success
//! - 10-19: user/environment errors (recoverable by user action)
//! - 20-29: internal errors

use oam_common::ErrorCategory;

/// Exit codes for oam operations.
///
/// These codes are a stable contract for automation. Changes require a
/// major version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Ok = 0,

    /// Invalid arguments
    ArgsError = 10,

    /// Configuration file invalid or unreadable
    ConfigError = 11,

    /// Version resolution failed
    ResolveError = 12,

    /// Artifact download failed
    FetchError = 13,

    /// Expected file or backup entry missing
    NotFoundError = 14,

    /// Internal error (bug - please report)
    InternalError = 20,

    /// Filesystem operation failed
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates an error.
    pub fn is_error(self) -> bool {
        self != ExitCode::Ok
    }

    /// Map a fatal error's category to its exit code.
    pub fn from_category(category: ErrorCategory) -> Self {
        match category {
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Resolution => ExitCode::ResolveError,
            ErrorCategory::Fetch => ExitCode::FetchError,
            ErrorCategory::NotFound => ExitCode::NotFoundError,
            ErrorCategory::Filesystem => ExitCode::IoError,
            ErrorCategory::Serialization => ExitCode::InternalError,
        }
    }

    /// Get the exit code name as a string constant (for logs and docs).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Ok => "OK",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::ResolveError => "ERR_RESOLVE",
            ExitCode::FetchError => "ERR_FETCH",
            ExitCode::NotFoundError => "ERR_NOT_FOUND",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_mapping() {
        assert_eq!(
            ExitCode::from_category(ErrorCategory::Resolution),
            ExitCode::ResolveError
        );
        assert_eq!(
            ExitCode::from_category(ErrorCategory::NotFound),
            ExitCode::NotFoundError
        );
        assert_eq!(
            ExitCode::from_category(ErrorCategory::Filesystem),
            ExitCode::IoError
        );
    }

    #[test]
    fn test_is_error() {
        assert!(!ExitCode::Ok.is_error());
        assert!(ExitCode::FetchError.is_error());
        assert!(ExitCode::InternalError.is_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(ExitCode::Ok.to_string(), "OK (0)");
        assert_eq!(ExitCode::NotFoundError.to_string(), "ERR_NOT_FOUND (14)");
    }
}
