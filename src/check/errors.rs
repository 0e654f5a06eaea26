//! Compile error types for check definitions
//!
//! Error codes:
//! - GEOCHECK_MALFORMED_STAGE (REJECT)
//! - GEOCHECK_UNKNOWN_PREDICATE_KIND (REJECT)
//! - GEOCHECK_UNPARSEABLE_KEY_VALUE (REJECT)
//! - GEOCHECK_UNKNOWN_STAGE_REFERENCE (REJECT)
//! - GEOCHECK_CYCLIC_DEPENDENCY (REJECT)
//! - GEOCHECK_INVALID_SINK (REJECT)
//! - GEOCHECK_MALFORMED_DOCUMENT (REJECT)
//! - GEOCHECK_DUPLICATE_STAGE (REJECT)
//! - GEOCHECK_DUPLICATE_CHECK (REJECT)
//! - GEOCHECK_INVALID_LITERAL (REJECT)
//!
//! Every code rejects a single check definition. None of them abort loading
//! of the other definitions in the same directory.

use std::fmt;

/// Severity levels for compile errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Check definition rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Compile error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorCode {
    /// Request carries neither or both of a filter and a buffer
    MalformedStage,
    /// Unrecognized predicate element
    UnknownPredicateKind,
    /// `key_value` text contains neither `!=` nor `=`
    UnparseableKeyValue,
    /// `from` or `intersects` names nothing known
    UnknownStageReference,
    /// Stage depends on itself through its sources or joins
    CyclicDependency,
    /// Final stage is a buffer
    InvalidSink,
    /// Document is not a well-formed check definition
    MalformedDocument,
    /// Two requests share a name, or a request shadows a built-in source
    DuplicateStage,
    /// Two documents declare the same class id
    DuplicateCheck,
    /// Identifier or literal fails format validation
    InvalidLiteral,
}

impl CompileErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            CompileErrorCode::MalformedStage => "GEOCHECK_MALFORMED_STAGE",
            CompileErrorCode::UnknownPredicateKind => "GEOCHECK_UNKNOWN_PREDICATE_KIND",
            CompileErrorCode::UnparseableKeyValue => "GEOCHECK_UNPARSEABLE_KEY_VALUE",
            CompileErrorCode::UnknownStageReference => "GEOCHECK_UNKNOWN_STAGE_REFERENCE",
            CompileErrorCode::CyclicDependency => "GEOCHECK_CYCLIC_DEPENDENCY",
            CompileErrorCode::InvalidSink => "GEOCHECK_INVALID_SINK",
            CompileErrorCode::MalformedDocument => "GEOCHECK_MALFORMED_DOCUMENT",
            CompileErrorCode::DuplicateStage => "GEOCHECK_DUPLICATE_STAGE",
            CompileErrorCode::DuplicateCheck => "GEOCHECK_DUPLICATE_CHECK",
            CompileErrorCode::InvalidLiteral => "GEOCHECK_INVALID_LITERAL",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for CompileErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Compile error with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// Error code
    code: CompileErrorCode,
    /// Human-readable message
    message: String,
    /// Stage (request) name if applicable
    stage: Option<String>,
}

impl CompileError {
    fn new(code: CompileErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            stage: None,
        }
    }

    /// Attaches the offending stage name
    pub fn at_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    /// Create a malformed stage error
    pub fn malformed_stage(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(CompileErrorCode::MalformedStage, reason).at_stage(stage)
    }

    /// Create an unknown predicate kind error
    pub fn unknown_predicate_kind(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self::new(
            CompileErrorCode::UnknownPredicateKind,
            format!("Unknown predicate element '{}'", tag),
        )
    }

    /// Create an unparseable key-value error
    pub fn unparseable_key_value(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(
            CompileErrorCode::UnparseableKeyValue,
            format!("Cannot split '{}' on '!=' or '='", text),
        )
    }

    /// Create an unknown stage reference error
    pub fn unknown_stage_reference(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            CompileErrorCode::UnknownStageReference,
            format!("'{}' is neither a built-in source nor a declared request", name),
        )
    }

    /// Create a cyclic dependency error
    pub fn cyclic_dependency(path: &[String], repeated: &str) -> Self {
        let mut chain = path.join(" -> ");
        if !chain.is_empty() {
            chain.push_str(" -> ");
        }
        chain.push_str(repeated);
        Self::new(
            CompileErrorCode::CyclicDependency,
            format!("Dependency cycle: {}", chain),
        )
        .at_stage(repeated)
    }

    /// Create an invalid sink error
    pub fn invalid_sink(stage: impl Into<String>) -> Self {
        let stage = stage.into();
        Self::new(
            CompileErrorCode::InvalidSink,
            format!("Buffer request '{}' cannot be the final request", stage),
        )
        .at_stage(stage)
    }

    /// Create a malformed document error
    pub fn malformed_document(reason: impl Into<String>) -> Self {
        Self::new(CompileErrorCode::MalformedDocument, reason)
    }

    /// Create a duplicate stage error
    pub fn duplicate_stage(stage: impl Into<String>) -> Self {
        let stage = stage.into();
        Self::new(
            CompileErrorCode::DuplicateStage,
            format!("Request name '{}' is already taken", stage),
        )
        .at_stage(stage)
    }

    /// Create a duplicate check error
    pub fn duplicate_check(check_id: impl Into<String>) -> Self {
        Self::new(
            CompileErrorCode::DuplicateCheck,
            format!("Check '{}' is already loaded", check_id.into()),
        )
    }

    /// Create an invalid literal error
    pub fn invalid_literal(what: &str, value: &str) -> Self {
        Self::new(
            CompileErrorCode::InvalidLiteral,
            format!("Invalid {}: '{}'", what, value),
        )
    }

    /// Returns the error code
    pub fn code(&self) -> CompileErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the stage name if applicable
    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(stage) = &self.stage {
            write!(f, " [request {}]", stage)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileError {}

/// Result type for compile operations
pub type CompileResult<T> = Result<T, CompileError>;
