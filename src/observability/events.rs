//! Observable events
//!
//! Events are explicit and typed; their names are stable log keys.

use std::fmt;

use super::logger::Severity;

/// Observable events in geocheck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Loading
    /// Directory scan begins
    ChecksLoadBegin,
    /// One check parsed and compiled
    CheckLoaded,
    /// One check rejected, others keep loading
    CheckRejected,
    /// Directory scan complete
    ChecksLoadComplete,

    // Compilation
    /// Statements rendered for a check
    CheckCompiled,

    // Execution
    /// Check class registered with the reporting registry
    ClassRegistered,
    /// Check pipeline begins
    CheckRunBegin,
    /// One statement executed
    StatementExecuted,
    /// Check pipeline complete
    CheckRunComplete,
    /// Check pipeline aborted
    CheckRunFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ChecksLoadBegin => "CHECKS_LOAD_BEGIN",
            Event::CheckLoaded => "CHECK_LOADED",
            Event::CheckRejected => "CHECK_REJECTED",
            Event::ChecksLoadComplete => "CHECKS_LOAD_COMPLETE",
            Event::CheckCompiled => "CHECK_COMPILED",
            Event::ClassRegistered => "CLASS_REGISTERED",
            Event::CheckRunBegin => "CHECK_RUN_BEGIN",
            Event::StatementExecuted => "STATEMENT_EXECUTED",
            Event::CheckRunComplete => "CHECK_RUN_COMPLETE",
            Event::CheckRunFailed => "CHECK_RUN_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::CheckRejected | Event::CheckRunFailed => Severity::Error,
            Event::StatementExecuted => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
