//! Statement emission
//!
//! Intermediate stages materialize into temporary relations named after the
//! stage. The sink is a plain projection: node sinks return id and WKT
//! position, way and relation sinks return ids only.

use crate::check::{
    CompileError, CompileResult, FeatureKind, StageDescriptor, StageMode, SOURCE_ALIAS,
};
use crate::predicate::literal::quote;

/// Renders the statement for `stage`.
///
/// Buffer stages cannot be the sink.
pub fn emit(stage: &StageDescriptor, is_sink: bool) -> CompileResult<String> {
    match stage.mode() {
        StageMode::Buffer { distance } => {
            if is_sink {
                return Err(CompileError::invalid_sink(stage.name()));
            }
            Ok(emit_buffer(stage, distance))
        }
        StageMode::Filter {
            condition, joins, ..
        } => {
            let from = from_clause(stage.source(), joins);
            if !is_sink {
                return Ok(format!(
                    "
CREATE TEMP TABLE {name} AS
SELECT DISTINCT
    {el}.id AS id,
    {obj} AS obj,
    {el}.geom AS geom,
    {el}.tags AS tags
{from}
WHERE {condition};
",
                    name = stage.name(),
                    el = SOURCE_ALIAS,
                    obj = quote(stage.feature_kind().as_str()),
                    from = from,
                    condition = condition,
                ));
            }

            match stage.feature_kind() {
                FeatureKind::Node => Ok(format!(
                    "
SELECT DISTINCT
    {el}.id AS id,
    ST_AsText({el}.geom) AS geom
{from}
WHERE {condition};
",
                    el = SOURCE_ALIAS,
                    from = from,
                    condition = condition,
                )),
                FeatureKind::Way | FeatureKind::Relation => {
                    Ok(format!(
                        "
SELECT DISTINCT
    {el}.id AS id
{from}
WHERE {condition};
",
                        el = SOURCE_ALIAS,
                        from = from,
                        condition = condition,
                    ))
                }
            }
        }
    }
}

fn emit_buffer(stage: &StageDescriptor, distance: &str) -> String {
    format!(
        "
CREATE TEMP TABLE {name} AS
SELECT
    {el}.id AS id,
    ST_Buffer({el}.geom, {distance}) AS geom,
    {obj} AS obj,
    {el}.tags AS tags
FROM {source} AS {el};
",
        name = stage.name(),
        el = SOURCE_ALIAS,
        distance = distance,
        obj = quote(stage.feature_kind().as_str()),
        source = stage.source(),
    )
}

fn from_clause(source: &str, joins: &[String]) -> String {
    let mut clause = format!("FROM {} AS {}", source, SOURCE_ALIAS);
    for join in joins {
        clause.push_str("\n    CROSS JOIN ");
        clause.push_str(join);
    }
    clause
}
