//! Check definitions
//!
//! A check is its classification metadata plus its requests in declaration
//! order. The last declared request is the sink.

use serde::{Deserialize, Serialize};

use super::errors::{CompileError, CompileResult};
use super::stage::StageDescriptor;
use super::types::BuiltinSource;

/// Classification block of a check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMetadata {
    /// Class identifier, unique across loaded checks
    pub id: String,
    /// Reporting item the class belongs to
    pub item: String,
    /// Severity level, passed through to the registry
    pub level: String,
    pub title: String,
}

/// Immutable, parsed check
#[derive(Debug, Clone, PartialEq)]
pub struct CheckDefinition {
    class: ClassMetadata,
    stages: Vec<StageDescriptor>,
}

impl CheckDefinition {
    /// Creates a check from stages in declaration order.
    ///
    /// Rejects empty checks, duplicate names and names shadowing built-ins.
    pub fn new(class: ClassMetadata, stages: Vec<StageDescriptor>) -> CompileResult<Self> {
        if stages.is_empty() {
            return Err(CompileError::malformed_document(format!(
                "Check '{}' declares no requests",
                class.id
            )));
        }

        for (i, stage) in stages.iter().enumerate() {
            if BuiltinSource::lookup(stage.name()).is_some() {
                return Err(CompileError::duplicate_stage(stage.name()));
            }
            if stages[..i].iter().any(|s| s.name() == stage.name()) {
                return Err(CompileError::duplicate_stage(stage.name()));
            }
        }

        Ok(Self { class, stages })
    }

    pub fn class(&self) -> &ClassMetadata {
        &self.class
    }

    /// Class id of the check
    pub fn id(&self) -> &str {
        &self.class.id
    }

    /// Stages in declaration order
    pub fn stages(&self) -> &[StageDescriptor] {
        &self.stages
    }

    /// Looks up a declared stage by name
    pub fn stage(&self, name: &str) -> Option<&StageDescriptor> {
        self.stages.iter().find(|s| s.name() == name)
    }

    /// Last declared stage
    pub fn sink(&self) -> &StageDescriptor {
        // new() rejects empty stage lists
        &self.stages[self.stages.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{CompileErrorCode, FeatureKind, GeometryKind};
    use crate::predicate::Predicate;

    fn class() -> ClassMetadata {
        ClassMetadata {
            id: "1".into(),
            item: "9000".into(),
            level: "3".into(),
            title: "test".into(),
        }
    }

    fn filter(name: &str, from: &str) -> StageDescriptor {
        StageDescriptor::filter(
            name,
            FeatureKind::Node,
            GeometryKind::Point,
            from,
            Predicate::HasTag("amenity".into()),
        )
        .unwrap()
    }

    #[test]
    fn test_sink_is_last_declared() {
        let check =
            CheckDefinition::new(class(), vec![filter("a", "nodes"), filter("b", "a")]).unwrap();
        assert_eq!(check.sink().name(), "b");
        assert_eq!(check.stage("a").unwrap().source(), "nodes");
        assert!(check.stage("nodes").is_none());
    }

    #[test]
    fn test_empty_check_rejected() {
        let err = CheckDefinition::new(class(), vec![]).unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::MalformedDocument);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = CheckDefinition::new(class(), vec![filter("a", "nodes"), filter("a", "nodes")])
            .unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::DuplicateStage);
    }

    #[test]
    fn test_builtin_shadowing_rejected() {
        let err = CheckDefinition::new(class(), vec![filter("ways_bbox", "nodes")]).unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::DuplicateStage);
    }
}
