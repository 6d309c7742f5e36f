//! Exit code definitions for the spaces CLI
//!
//! Scripts rely on these values. Renumbering any of them is a breaking change.

use sm_core::Error;

/// Exit codes for the spaces CLI application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// General/unspecified error, including local filesystem failures
    GeneralError = 1,

    /// User input error: invalid arguments, missing configuration
    UsageError = 2,

    /// Failure reported by the storage service
    ServiceError = 3,

    /// Authentication or permission failure
    AuthError = 4,

    /// Object does not exist
    NotFound = 5,

    /// Operation was interrupted (e.g., Ctrl+C)
    Interrupted = 130,
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
            3 => Some(Self::ServiceError),
            4 => Some(Self::AuthError),
            5 => Some(Self::NotFound),
            130 => Some(Self::Interrupted),
            _ => None,
        }
    }

    /// Exit code matching a core error
    pub const fn from_error(error: &Error) -> Self {
        match Self::from_i32(error.exit_code()) {
            Some(code) => code,
            None => Self::GeneralError,
        }
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid arguments or configuration",
            Self::ServiceError => "Storage service error",
            Self::AuthError => "Authentication or permission failure",
            Self::NotFound => "Object not found",
            Self::Interrupted => "Operation interrupted",
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
