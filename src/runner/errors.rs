//! # Runner Errors

use thiserror::Error;

/// Result type for runner operations
pub type RunResult<T> = Result<T, RunError>;

/// Errors raised while driving a compiled check against a store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Unexpected result row: {0}")]
    RowShape(String),

    #[error("Check not registered: {0}")]
    UnknownCheck(String),

    #[error("Check has no output statement: {0}")]
    MissingOutput(String),
}

impl RunError {
    /// Stable code for logs
    pub fn code(&self) -> &'static str {
        match self {
            RunError::Store(_) => "GEOCHECK_RUN_STORE",
            RunError::RowShape(_) => "GEOCHECK_RUN_ROW_SHAPE",
            RunError::UnknownCheck(_) => "GEOCHECK_RUN_UNKNOWN_CHECK",
            RunError::MissingOutput(_) => "GEOCHECK_RUN_MISSING_OUTPUT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(RunError::Store("x".into()).code(), "GEOCHECK_RUN_STORE");
        assert_eq!(
            RunError::RowShape("x".into()).to_string(),
            "Unexpected result row: x"
        );
    }
}
