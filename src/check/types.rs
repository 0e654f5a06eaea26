//! Feature kinds, geometry kinds and built-in sources

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{CompileError, CompileResult};

/// OSM object type a stage yields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Node,
    Way,
    Relation,
}

impl FeatureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Node => "node",
            FeatureKind::Way => "way",
            FeatureKind::Relation => "relation",
        }
    }

    /// Parses the `obj` element text
    pub fn parse(text: &str) -> CompileResult<Self> {
        match text {
            "node" => Ok(FeatureKind::Node),
            "way" => Ok(FeatureKind::Way),
            "relation" => Ok(FeatureKind::Relation),
            other => Err(CompileError::malformed_document(format!(
                "Unknown obj '{}', expected node, way or relation",
                other
            ))),
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geometry type a stage yields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Point,
    Linestring,
    Polygon,
    Multipolygon,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "point",
            GeometryKind::Linestring => "linestring",
            GeometryKind::Polygon => "polygon",
            GeometryKind::Multipolygon => "multipolygon",
        }
    }

    /// Parses the `geom` element text
    pub fn parse(text: &str) -> CompileResult<Self> {
        match text {
            "point" => Ok(GeometryKind::Point),
            "linestring" => Ok(GeometryKind::Linestring),
            "polygon" => Ok(GeometryKind::Polygon),
            "multipolygon" => Ok(GeometryKind::Multipolygon),
            other => Err(CompileError::malformed_document(format!(
                "Unknown geom '{}', expected point, linestring, polygon or multipolygon",
                other
            ))),
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pre-typed raw feature collections every check may read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinSource {
    Nodes,
    WaysLinestring,
    WaysBbox,
    RelationsPolygon,
}

impl BuiltinSource {
    pub const ALL: [BuiltinSource; 4] = [
        BuiltinSource::Nodes,
        BuiltinSource::WaysLinestring,
        BuiltinSource::WaysBbox,
        BuiltinSource::RelationsPolygon,
    ];

    /// Looks up a built-in by relation name
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinSource::Nodes => "nodes",
            BuiltinSource::WaysLinestring => "ways_linestring",
            BuiltinSource::WaysBbox => "ways_bbox",
            BuiltinSource::RelationsPolygon => "relations_polygon",
        }
    }

    pub fn feature_kind(&self) -> FeatureKind {
        match self {
            BuiltinSource::Nodes => FeatureKind::Node,
            BuiltinSource::WaysLinestring | BuiltinSource::WaysBbox => FeatureKind::Way,
            BuiltinSource::RelationsPolygon => FeatureKind::Relation,
        }
    }

    pub fn geometry_kind(&self) -> GeometryKind {
        match self {
            BuiltinSource::Nodes => GeometryKind::Point,
            BuiltinSource::WaysLinestring => GeometryKind::Linestring,
            BuiltinSource::WaysBbox | BuiltinSource::RelationsPolygon => GeometryKind::Polygon,
        }
    }

    /// Statement that materializes this source, if the store lacks it.
    ///
    /// Relation polygons are assembled from the closed linestrings of their
    /// way members.
    pub fn setup_sql(&self) -> Option<&'static str> {
        match self {
            BuiltinSource::RelationsPolygon => Some(
                "
CREATE TEMP TABLE relations_polygon AS
SELECT
    el.id AS id,
    ST_Buffer(ST_Polygonize(ways.linestring), 0) AS geom,
    el.tags
FROM
    relations AS el
    JOIN relation_members ON
        relation_members.relation_id = el.id AND
        relation_members.member_type = 'W'
    JOIN ways ON
        ways.id = relation_members.member_id AND
        ST_NPoints(ways.linestring) > 1
GROUP BY
    el.id;
",
            ),
            BuiltinSource::Nodes | BuiltinSource::WaysLinestring | BuiltinSource::WaysBbox => None,
        }
    }
}
