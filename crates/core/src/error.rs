//! Error types for sm-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for sm-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for sm-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument passed to an operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Local filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Credentials rejected or permission denied by the storage service
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other failure reported by the storage service
    #[error("Service error: {0}")]
    Service(String),
}

impl Error {
    /// Whether this error means the object (or local file) does not exist.
    ///
    /// Existence checks use this to tell "proceed" apart from a real failure.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) | Error::InvalidArgument(_) | Error::InvalidUrl(_) => 2, // UsageError
            Error::Service(_) => 3,                                                 // ServiceError
            Error::Auth(_) => 4,                                                    // AuthError
            Error::NotFound(_) => 5,                                                // NotFound
            _ => 1,                                                                 // GeneralError
        }
    }
}
