//! Compiled checks
//!
//! A compiled check is the resolved plan of a check together with the
//! statements that execute it, in order. Statements must run sequentially:
//! each one may read relations materialized by the ones before it.

use std::fmt;

use serde::Serialize;

use crate::check::{CheckDefinition, ClassMetadata, CompileError, CompileResult, FeatureKind};

use super::emitter::emit;
use super::resolver::{resolve, ResolvedStage};

/// Role of a statement in a compiled check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementRole {
    /// Materializes a built-in source the store lacks
    Setup,
    /// Materializes an intermediate stage
    Materialize,
    /// Final projection, rows feed the report
    Output,
    /// Drops a relation materialized by the check
    Teardown,
}

impl StatementRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementRole::Setup => "SETUP",
            StatementRole::Materialize => "MATERIALIZE",
            StatementRole::Output => "OUTPUT",
            StatementRole::Teardown => "TEARDOWN",
        }
    }
}

/// Shape of the rows the output statement returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    /// `(id, position as WKT)` pairs of nodes
    Point,
    /// Way ids
    Way,
    /// Relation ids
    Relation,
}

impl ResultKind {
    pub fn for_feature(kind: FeatureKind) -> Self {
        match kind {
            FeatureKind::Node => ResultKind::Point,
            FeatureKind::Way => ResultKind::Way,
            FeatureKind::Relation => ResultKind::Relation,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::Point => "point",
            ResultKind::Way => "way",
            ResultKind::Relation => "relation",
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One statement of a compiled check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    /// Stage or built-in the statement belongs to
    pub stage: String,
    pub role: StatementRole,
    pub sql: String,
}

/// Executable form of a check
#[derive(Debug, Clone, Serialize)]
pub struct CompiledCheck {
    pub class: ClassMetadata,
    pub plan: Vec<ResolvedStage>,
    pub statements: Vec<Statement>,
    pub result_kind: ResultKind,
}

impl CompiledCheck {
    /// Class id of the check
    pub fn id(&self) -> &str {
        &self.class.id
    }

    /// The output statement, which `compile` always places last
    pub fn output(&self) -> Option<&Statement> {
        self.statements
            .last()
            .filter(|s| s.role == StatementRole::Output)
    }

    /// Statements dropping every relation the check materialized, newest first
    pub fn teardown(&self) -> Vec<Statement> {
        self.statements
            .iter()
            .rev()
            .filter(|s| matches!(s.role, StatementRole::Setup | StatementRole::Materialize))
            .map(|s| Statement {
                stage: s.stage.clone(),
                role: StatementRole::Teardown,
                sql: format!("DROP TABLE IF EXISTS {};", s.stage),
            })
            .collect()
    }
}

/// Resolves `check` and renders one statement per plan element.
///
/// Built-ins are skipped unless they need setup; the sink renders last as the
/// output statement.
pub fn compile(check: &CheckDefinition) -> CompileResult<CompiledCheck> {
    let plan = resolve(check)?;
    let sink = check.sink();

    let mut statements = Vec::with_capacity(plan.len());
    for elem in &plan {
        if let Some(builtin) = elem.as_builtin() {
            if let Some(sql) = builtin.setup_sql() {
                statements.push(Statement {
                    stage: elem.name.clone(),
                    role: StatementRole::Setup,
                    sql: sql.to_string(),
                });
            }
            continue;
        }

        let stage = check
            .stage(&elem.name)
            .ok_or_else(|| CompileError::unknown_stage_reference(&elem.name))?;
        let is_sink = stage.name() == sink.name();
        statements.push(Statement {
            stage: elem.name.clone(),
            role: if is_sink {
                StatementRole::Output
            } else {
                StatementRole::Materialize
            },
            sql: emit(stage, is_sink)?,
        });
    }

    Ok(CompiledCheck {
        class: check.class().clone(),
        plan,
        statements,
        result_kind: ResultKind::for_feature(sink.feature_kind()),
    })
}
