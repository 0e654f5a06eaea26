//! Statement execution contract and issue records
//!
//! The store behind [`StatementExecutor`] is not part of geocheck. It runs
//! statement text as given and, for the output statement, hands each result
//! row to a callback.

use serde::Serialize;

use crate::planner::ResultKind;

use super::errors::{RunError, RunResult};
use super::registry::ClassHandle;

/// One result row, columns as text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultRow {
    columns: Vec<Option<String>>,
}

impl ResultRow {
    pub fn new(columns: Vec<Option<String>>) -> Self {
        Self { columns }
    }

    /// Convenience constructor for rows without NULLs
    pub fn from_values<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: values.into_iter().map(|v| Some(v.into())).collect(),
        }
    }

    /// Column `idx`, `None` when absent or NULL
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.columns.get(idx).and_then(|c| c.as_deref())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Row callback handed to the executor
pub type RowCallback<'a> = &'a mut dyn FnMut(&ResultRow) -> RunResult<()>;

/// Runs statement text against a feature store
pub trait StatementExecutor {
    /// Executes `sql`, feeding every result row to `on_row` when given.
    ///
    /// An error from `on_row` must abort the statement and be returned.
    fn execute(&mut self, sql: &str, on_row: Option<RowCallback<'_>>) -> RunResult<()>;
}

/// Feature an issue points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeatureRef {
    /// Node with its position as WKT
    Node { id: i64, position: String },
    /// Way, fetched in full by id downstream
    Way { id: i64 },
    /// Relation, fetched in full by id downstream
    Relation { id: i64 },
}

impl FeatureRef {
    /// Decodes an output row of the given shape
    pub fn from_row(kind: ResultKind, row: &ResultRow) -> RunResult<Self> {
        let id = parse_id(row)?;
        match kind {
            ResultKind::Point => {
                let position = row
                    .get(1)
                    .ok_or_else(|| RunError::RowShape(format!("node {} has no position", id)))?;
                Ok(FeatureRef::Node {
                    id,
                    position: position.to_string(),
                })
            }
            ResultKind::Way => Ok(FeatureRef::Way { id }),
            ResultKind::Relation => Ok(FeatureRef::Relation { id }),
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            FeatureRef::Node { id, .. } | FeatureRef::Way { id } | FeatureRef::Relation { id } => {
                *id
            }
        }
    }
}

fn parse_id(row: &ResultRow) -> RunResult<i64> {
    let raw = row
        .get(0)
        .ok_or_else(|| RunError::RowShape("missing id column".into()))?;
    raw.trim()
        .parse()
        .map_err(|_| RunError::RowShape(format!("id '{}' is not an integer", raw)))
}

/// One reported finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Class id of the check that found it
    pub check_id: String,
    pub class: ClassHandle,
    pub feature: FeatureRef,
}
