//! Exit code definitions for the s3h CLI
//!
//! Scripts rely on these values; changing one is a breaking change.

use s3h_core::Error;

/// Exit codes for the s3h CLI application.
///
/// These codes follow a consistent convention to allow scripts and automation
/// to handle different error scenarios appropriately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// General error, or some items of a transfer failed
    GeneralError = 1,

    /// User input error: missing flags, bad configuration, invalid path
    UsageError = 2,

    /// Network error: timeout, connection reset, etc.
    NetworkError = 3,

    /// Authentication or permission failure
    AuthError = 4,

    /// Resource not found: bucket, object or local directory does not exist
    NotFound = 5,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::NetworkError),
            4 => Some(Self::AuthError),
            5 => Some(Self::NotFound),
            _ => None,
        }
    }

    /// Exit code matching a core error
    pub fn from_error(error: &Error) -> Self {
        Self::from_i32(error.exit_code()).unwrap_or(Self::GeneralError)
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid arguments or configuration",
            Self::NetworkError => "Network error",
            Self::AuthError => "Authentication or permission failure",
            Self::NotFound => "Resource not found",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}
