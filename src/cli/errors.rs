//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::check::CompileError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (files, stdout)
    IoError,
    /// Checks directory could not be scanned
    LoadFailed,
    /// No loaded or rejected check has the requested id
    UnknownCheck,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "GEOCHECK_CLI_CONFIG_ERROR",
            Self::IoError => "GEOCHECK_CLI_IO_ERROR",
            Self::LoadFailed => "GEOCHECK_CLI_LOAD_FAILED",
            Self::UnknownCheck => "GEOCHECK_CLI_UNKNOWN_CHECK",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Checks directory could not be scanned
    pub fn load_failed(err: &CompileError) -> Self {
        Self::new(CliErrorCode::LoadFailed, err.message())
    }

    /// Unknown check id
    pub fn unknown_check(id: &str) -> Self {
        Self::new(
            CliErrorCode::UnknownCheck,
            format!("No loaded check has class id '{}'", id),
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = CliError::unknown_check("12");
        assert_eq!(
            err.to_string(),
            "GEOCHECK_CLI_UNKNOWN_CHECK: No loaded check has class id '12'"
        );
    }

    #[test]
    fn test_from_io() {
        let err: CliError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.code(), &CliErrorCode::IoError);
        assert_eq!(err.message(), "gone");
    }
}
