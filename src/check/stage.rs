//! Stage descriptors (one per request of a check)
//!
//! A stage either filters its source with a predicate or buffers the
//! geometry of its source. The translated condition and the join set are
//! derived once, at construction.

use crate::predicate::{literal, translate, Predicate};

use super::errors::{CompileError, CompileResult};
use super::types::{FeatureKind, GeometryKind};

/// Alias the source relation is bound to in emitted statements
pub const SOURCE_ALIAS: &str = "el";

/// What a stage does with its source rows
#[derive(Debug, Clone, PartialEq)]
pub enum StageMode {
    /// Keep source rows matching the predicate
    Filter {
        predicate: Predicate,
        /// Translated predicate, scoped to [`SOURCE_ALIAS`]
        condition: String,
        /// Stages referenced by `intersects`, first-seen order
        joins: Vec<String>,
    },
    /// Grow each source geometry by a distance literal
    Buffer { distance: String },
}

/// One named request of a check
#[derive(Debug, Clone, PartialEq)]
pub struct StageDescriptor {
    name: String,
    feature_kind: FeatureKind,
    geometry_kind: GeometryKind,
    source: String,
    mode: StageMode,
}

impl StageDescriptor {
    /// Builds a stage from a request declaration.
    ///
    /// Exactly one of `predicate` and `buffer` must be present.
    pub fn new(
        name: impl Into<String>,
        feature_kind: FeatureKind,
        geometry_kind: GeometryKind,
        source: impl Into<String>,
        predicate: Option<Predicate>,
        buffer: Option<String>,
    ) -> CompileResult<Self> {
        let name = name.into();
        let source = source.into();

        literal::validate_identifier(&name)?;
        literal::validate_identifier(&source).map_err(|e| e.at_stage(&name))?;

        if name == SOURCE_ALIAS {
            return Err(CompileError::invalid_literal("request name", &name));
        }

        let mode = match (predicate, buffer) {
            (Some(predicate), None) => {
                let condition = translate(&predicate, SOURCE_ALIAS);
                let joins = predicate.intersects_targets();
                if joins.iter().any(|j| j == SOURCE_ALIAS) {
                    return Err(
                        CompileError::invalid_literal("intersects target", SOURCE_ALIAS)
                            .at_stage(&name),
                    );
                }
                StageMode::Filter {
                    predicate,
                    condition,
                    joins,
                }
            }
            (None, Some(distance)) => {
                let distance = distance.trim().to_string();
                literal::validate_distance(&distance).map_err(|e| e.at_stage(&name))?;
                StageMode::Buffer { distance }
            }
            (Some(_), Some(_)) => {
                return Err(CompileError::malformed_stage(
                    name,
                    "Request has both a filter and a buffer",
                ))
            }
            (None, None) => {
                return Err(CompileError::malformed_stage(
                    name,
                    "Request has neither a filter nor a buffer",
                ))
            }
        };

        Ok(Self {
            name,
            feature_kind,
            geometry_kind,
            source,
            mode,
        })
    }

    /// Builds a filter stage
    pub fn filter(
        name: impl Into<String>,
        feature_kind: FeatureKind,
        geometry_kind: GeometryKind,
        source: impl Into<String>,
        predicate: Predicate,
    ) -> CompileResult<Self> {
        Self::new(name, feature_kind, geometry_kind, source, Some(predicate), None)
    }

    /// Builds a buffer stage
    pub fn buffer(
        name: impl Into<String>,
        feature_kind: FeatureKind,
        geometry_kind: GeometryKind,
        source: impl Into<String>,
        distance: impl Into<String>,
    ) -> CompileResult<Self> {
        Self::new(
            name,
            feature_kind,
            geometry_kind,
            source,
            None,
            Some(distance.into()),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared output feature kind
    pub fn feature_kind(&self) -> FeatureKind {
        self.feature_kind
    }

    /// Declared output geometry kind
    pub fn geometry_kind(&self) -> GeometryKind {
        self.geometry_kind
    }

    /// Name of the stage or built-in this stage reads from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn mode(&self) -> &StageMode {
        &self.mode
    }

    pub fn is_buffer(&self) -> bool {
        matches!(self.mode, StageMode::Buffer { .. })
    }

    /// Stages joined in before filtering. Empty for buffer stages.
    pub fn joins(&self) -> &[String] {
        match &self.mode {
            StageMode::Filter { joins, .. } => joins,
            StageMode::Buffer { .. } => &[],
        }
    }

    /// Translated filter condition, if this is a filter stage
    pub fn condition(&self) -> Option<&str> {
        match &self.mode {
            StageMode::Filter { condition, .. } => Some(condition),
            StageMode::Buffer { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::CompileErrorCode;

    #[test]
    fn test_filter_stage_caches_condition_and_joins() {
        let pred = Predicate::And(vec![
            Predicate::HasTag("amenity".into()),
            Predicate::Intersects("water".into()),
        ]);
        let stage = StageDescriptor::filter(
            "wet_amenities",
            FeatureKind::Node,
            GeometryKind::Point,
            "nodes",
            pred,
        )
        .unwrap();

        assert!(!stage.is_buffer());
        assert_eq!(stage.joins(), ["water".to_string()]);
        assert_eq!(
            stage.condition(),
            Some("(el.tags ? 'amenity' AND ST_Intersects(el.geom, water.geom))")
        );
    }

    #[test]
    fn test_buffer_stage_has_no_joins() {
        let stage = StageDescriptor::buffer(
            "around",
            FeatureKind::Node,
            GeometryKind::Polygon,
            "nodes",
            " 10 ",
        )
        .unwrap();
        assert!(stage.is_buffer());
        assert!(stage.joins().is_empty());
        assert!(stage.condition().is_none());
        assert_eq!(
            stage.mode(),
            &StageMode::Buffer {
                distance: "10".into()
            }
        );
    }

    #[test]
    fn test_neither_mode_rejected() {
        let err = StageDescriptor::new(
            "empty",
            FeatureKind::Way,
            GeometryKind::Linestring,
            "ways_linestring",
            None,
            None,
        )
        .unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::MalformedStage);
        assert_eq!(err.stage(), Some("empty"));
    }

    #[test]
    fn test_both_modes_rejected() {
        let err = StageDescriptor::new(
            "both",
            FeatureKind::Way,
            GeometryKind::Linestring,
            "ways_linestring",
            Some(Predicate::HasTag("highway".into())),
            Some("5".into()),
        )
        .unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::MalformedStage);
    }

    #[test]
    fn test_bad_distance_rejected() {
        let err = StageDescriptor::buffer(
            "around",
            FeatureKind::Node,
            GeometryKind::Polygon,
            "nodes",
            "10); DROP TABLE nodes; --",
        )
        .unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::InvalidLiteral);
        assert_eq!(err.stage(), Some("around"));
    }

    #[test]
    fn test_alias_name_reserved() {
        let err = StageDescriptor::filter(
            "el",
            FeatureKind::Node,
            GeometryKind::Point,
            "nodes",
            Predicate::HasTag("a".into()),
        )
        .unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::InvalidLiteral);

        let err = StageDescriptor::filter(
            "a",
            FeatureKind::Node,
            GeometryKind::Point,
            "nodes",
            Predicate::Intersects("el".into()),
        )
        .unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::InvalidLiteral);
    }

    #[test]
    fn test_bad_name_rejected() {
        let err = StageDescriptor::filter(
            "bad name",
            FeatureKind::Node,
            GeometryKind::Point,
            "nodes",
            Predicate::HasTag("a".into()),
        )
        .unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::InvalidLiteral);
    }
}
