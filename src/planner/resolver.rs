//! Dependency resolution
//!
//! Turns the request graph of a check into one linear execution order ending
//! with the sink. Ancestors precede dependents, join targets precede the
//! stage joining them, and every name appears once (first seen wins).

use serde::Serialize;

use crate::check::{
    BuiltinSource, CheckDefinition, CompileError, CompileResult, FeatureKind, GeometryKind,
    StageDescriptor,
};

/// One element of a resolved plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedStage {
    pub name: String,
    pub feature_kind: FeatureKind,
    pub geometry_kind: GeometryKind,
}

impl ResolvedStage {
    fn builtin(source: BuiltinSource) -> Self {
        Self {
            name: source.name().to_string(),
            feature_kind: source.feature_kind(),
            geometry_kind: source.geometry_kind(),
        }
    }

    /// Returns the built-in this element stands for, if any
    pub fn as_builtin(&self) -> Option<BuiltinSource> {
        BuiltinSource::lookup(&self.name)
    }
}

/// Resolves the execution order for the sink of `check`.
///
/// Deterministic: the same check always yields the same sequence.
pub fn resolve(check: &CheckDefinition) -> CompileResult<Vec<ResolvedStage>> {
    let mut resolver = Resolver {
        check,
        path: Vec::new(),
    };
    resolver.resolve_name(check.sink().name())
}

struct Resolver<'a> {
    check: &'a CheckDefinition,
    /// Stages on the active recursion path
    path: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn resolve_name(&mut self, name: &str) -> CompileResult<Vec<ResolvedStage>> {
        if let Some(builtin) = BuiltinSource::lookup(name) {
            return Ok(vec![ResolvedStage::builtin(builtin)]);
        }

        let check = self.check;
        let stage = check
            .stage(name)
            .ok_or_else(|| CompileError::unknown_stage_reference(name))?;

        if self.path.iter().any(|p| p == name) {
            return Err(CompileError::cyclic_dependency(&self.path, name));
        }

        self.path.push(name.to_string());
        let stack = self.resolve_stage(stage);
        self.path.pop();
        stack
    }

    fn resolve_stage(&mut self, stage: &StageDescriptor) -> CompileResult<Vec<ResolvedStage>> {
        let mut stack = self
            .resolve_name(stage.source())
            .map_err(|e| attach_stage(e, stage.name()))?;

        let tail = stack
            .last()
            .cloned()
            .ok_or_else(|| CompileError::unknown_stage_reference(stage.source()))?;

        // Buffering always yields polygons, whatever the source geometry
        let geometry_kind = if stage.is_buffer() {
            GeometryKind::Polygon
        } else {
            tail.geometry_kind
        };
        let own = ResolvedStage {
            name: stage.name().to_string(),
            feature_kind: tail.feature_kind,
            geometry_kind,
        };

        for join in stage.joins() {
            if contains(&stack, join) {
                continue;
            }
            let joined = self
                .resolve_name(join)
                .map_err(|e| attach_stage(e, stage.name()))?;
            for elem in joined {
                if !contains(&stack, &elem.name) {
                    stack.push(elem);
                }
            }
        }

        stack.push(own);
        Ok(stack)
    }
}

fn contains(stack: &[ResolvedStage], name: &str) -> bool {
    stack.iter().any(|e| e.name == name)
}

fn attach_stage(err: CompileError, stage: &str) -> CompileError {
    match err.stage() {
        Some(_) => err,
        None => err.at_stage(stage),
    }
}
