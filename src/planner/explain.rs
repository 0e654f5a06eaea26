//! Explain output for compiled checks
//!
//! Produces deterministic, human-readable explain output.

use std::fmt;

use crate::check::CompileError;

use super::plan::CompiledCheck;

/// Explain output
#[derive(Debug, Clone)]
pub struct ExplainPlan {
    /// Whether compilation succeeded
    pub accepted: bool,
    /// Class id (if accepted)
    pub check_id: Option<String>,
    /// Class title (if accepted)
    pub title: Option<String>,
    /// Resolved stages as `name (feature/geometry)`
    pub stages: Vec<String>,
    /// Statements as `ROLE stage`
    pub statements: Vec<String>,
    /// Output row shape
    pub result_kind: Option<String>,
    /// Rejection reason (if rejected)
    pub rejection_reason: Option<String>,
    /// Rejection error code (if rejected)
    pub rejection_code: Option<String>,
    /// Offending request (if rejected and known)
    pub rejection_stage: Option<String>,
}

impl ExplainPlan {
    /// Creates an explain plan from a compiled check
    pub fn from_compiled(compiled: &CompiledCheck) -> Self {
        let stages = compiled
            .plan
            .iter()
            .map(|e| {
                let origin = if e.as_builtin().is_some() { ", built-in" } else { "" };
                format!(
                    "{} ({}/{}{})",
                    e.name, e.feature_kind, e.geometry_kind, origin
                )
            })
            .collect();

        let statements = compiled
            .statements
            .iter()
            .map(|s| format!("{} {}", s.role.as_str(), s.stage))
            .collect();

        Self {
            accepted: true,
            check_id: Some(compiled.class.id.clone()),
            title: Some(compiled.class.title.clone()),
            stages,
            statements,
            result_kind: Some(compiled.result_kind.as_str().to_string()),
            rejection_reason: None,
            rejection_code: None,
            rejection_stage: None,
        }
    }

    /// Creates an explain plan from a compile error
    pub fn from_error(err: &CompileError) -> Self {
        Self {
            accepted: false,
            check_id: None,
            title: None,
            stages: Vec::new(),
            statements: Vec::new(),
            result_kind: None,
            rejection_reason: Some(err.message().to_string()),
            rejection_code: Some(err.code().code().to_string()),
            rejection_stage: err.stage().map(str::to_string),
        }
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN CHECK ===")?;

        if self.accepted {
            writeln!(f, "Status: ACCEPTED")?;
            if let Some(id) = &self.check_id {
                writeln!(f, "Check: {}", id)?;
            }
            if let Some(title) = &self.title {
                writeln!(f, "Title: {}", title)?;
            }
            if !self.stages.is_empty() {
                writeln!(f, "Plan:")?;
                for (i, stage) in self.stages.iter().enumerate() {
                    writeln!(f, "  {}. {}", i + 1, stage)?;
                }
            }
            if !self.statements.is_empty() {
                writeln!(f, "Statements:")?;
                for stmt in &self.statements {
                    writeln!(f, "  - {}", stmt)?;
                }
            }
            if let Some(kind) = &self.result_kind {
                writeln!(f, "Result: {}", kind)?;
            }
        } else {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(stage) = &self.rejection_stage {
                writeln!(f, "Request: {}", stage)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{CheckDefinition, ClassMetadata, FeatureKind, GeometryKind, StageDescriptor};
    use crate::planner::compile;
    use crate::predicate::Predicate;

    fn compiled() -> CompiledCheck {
        let check = CheckDefinition::new(
            ClassMetadata {
                id: "3".into(),
                item: "9000".into(),
                level: "1".into(),
                title: "Unnamed schools".into(),
            },
            vec![StageDescriptor::filter(
                "schools",
                FeatureKind::Node,
                GeometryKind::Point,
                "nodes",
                Predicate::HasNotTag("name".into()),
            )
            .unwrap()],
        )
        .unwrap();
        compile(&check).unwrap()
    }

    #[test]
    fn test_explain_accepted() {
        let explain = ExplainPlan::from_compiled(&compiled());
        assert!(explain.accepted);
        assert_eq!(explain.check_id, Some("3".into()));
        assert_eq!(
            explain.stages,
            ["nodes (node/point, built-in)", "schools (node/point)"]
        );
        assert_eq!(explain.statements, ["OUTPUT schools"]);

        let output = format!("{}", explain);
        assert!(output.contains("ACCEPTED"));
        assert!(output.contains("1. nodes"));
        assert!(output.contains("Result: point"));
    }

    #[test]
    fn test_explain_rejected() {
        let err = CompileError::invalid_sink("around");
        let explain = ExplainPlan::from_error(&err);
        assert!(!explain.accepted);
        assert_eq!(explain.rejection_code, Some("GEOCHECK_INVALID_SINK".into()));

        let output = format!("{}", explain);
        assert!(output.contains("REJECTED"));
        assert!(output.contains("Request: around"));
    }

    #[test]
    fn test_explain_deterministic() {
        let c = compiled();
        assert_eq!(
            format!("{}", ExplainPlan::from_compiled(&c)),
            format!("{}", ExplainPlan::from_compiled(&c))
        );
    }
}
