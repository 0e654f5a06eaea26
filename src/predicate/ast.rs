//! Predicate expression tree
//!
//! A closed sum type over the six predicate forms a request filter may use.
//! Trees are immutable once built; literal validation happens in the
//! constructors so translation itself never fails.

use crate::check::{CompileError, CompileResult};

use super::literal;

/// Predicate over a feature's tags or geometry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Conjunction of the children
    And(Vec<Predicate>),
    /// Disjunction of the children
    Or(Vec<Predicate>),
    /// Feature has the tag
    HasTag(String),
    /// Feature lacks the tag
    HasNotTag(String),
    /// Tag equals the value
    KeyEquals { key: String, value: String },
    /// Tag differs from the value
    KeyNotEquals { key: String, value: String },
    /// Geometry intersects the geometry of another stage
    Intersects(String),
}

impl Predicate {
    /// Create a conjunction. At least one child is required.
    pub fn and(children: Vec<Predicate>) -> CompileResult<Self> {
        if children.is_empty() {
            return Err(CompileError::malformed_document("'and' needs at least one child"));
        }
        Ok(Predicate::And(children))
    }

    /// Create a disjunction. At least one child is required.
    pub fn or(children: Vec<Predicate>) -> CompileResult<Self> {
        if children.is_empty() {
            return Err(CompileError::malformed_document("'or' needs at least one child"));
        }
        Ok(Predicate::Or(children))
    }

    /// Create a tag presence test
    pub fn has_tag(key: impl Into<String>) -> CompileResult<Self> {
        let key = key.into();
        literal::validate_tag_key(&key)?;
        Ok(Predicate::HasTag(key))
    }

    /// Create a tag absence test
    pub fn has_not_tag(key: impl Into<String>) -> CompileResult<Self> {
        let key = key.into();
        literal::validate_tag_key(&key)?;
        Ok(Predicate::HasNotTag(key))
    }

    /// Create a spatial intersection test against another stage
    pub fn intersects(stage: impl Into<String>) -> CompileResult<Self> {
        let stage = stage.into();
        literal::validate_identifier(&stage)?;
        Ok(Predicate::Intersects(stage))
    }

    /// Parses `key!=value` or `key=value` text.
    ///
    /// `!=` is looked for first, so `a!=b=c` yields key `a` and value `b=c`.
    /// Only the first occurrence of the operator splits, and whitespace
    /// around either side of it is dropped.
    pub fn parse_key_value(text: &str) -> CompileResult<Self> {
        if let Some((key, value)) = text.split_once("!=") {
            let (key, value) = Self::key_value_parts(text, key, value)?;
            return Ok(Predicate::KeyNotEquals { key, value });
        }
        if let Some((key, value)) = text.split_once('=') {
            let (key, value) = Self::key_value_parts(text, key, value)?;
            return Ok(Predicate::KeyEquals { key, value });
        }
        Err(CompileError::unparseable_key_value(text))
    }

    fn key_value_parts(text: &str, key: &str, value: &str) -> CompileResult<(String, String)> {
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() {
            return Err(CompileError::unparseable_key_value(text));
        }
        literal::validate_tag_key(key)?;
        literal::validate_tag_value(value)?;
        Ok((key.to_string(), value.to_string()))
    }

    /// Returns true for `And`/`Or` nodes
    pub fn is_internal(&self) -> bool {
        matches!(self, Predicate::And(_) | Predicate::Or(_))
    }

    /// Stage names referenced by `Intersects` nodes, first-seen order, no repeats.
    pub fn intersects_targets(&self) -> Vec<String> {
        let mut targets = Vec::new();
        self.collect_targets(&mut targets);
        targets
    }

    fn collect_targets(&self, targets: &mut Vec<String>) {
        match self {
            Predicate::And(children) | Predicate::Or(children) => {
                for child in children {
                    child.collect_targets(targets);
                }
            }
            Predicate::Intersects(stage) => {
                if !targets.iter().any(|t| t == stage) {
                    targets.push(stage.clone());
                }
            }
            Predicate::HasTag(_)
            | Predicate::HasNotTag(_)
            | Predicate::KeyEquals { .. }
            | Predicate::KeyNotEquals { .. } => {}
        }
    }
}
