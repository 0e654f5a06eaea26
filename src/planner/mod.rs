//! Check planner for geocheck
//!
//! Compiles a check definition into an ordered statement pipeline.
//!
//! # Design Principles
//!
//! - Deterministic: same check, same plan, same statements
//! - Total order: statements run one after another, never in parallel
//! - Duplicate-free: each stage is computed once per check
//! - Fail at load: every error surfaces before any statement runs
//!
//! # Ordering Rules (strict)
//!
//! 1. A stage's source precedes the stage
//! 2. Join targets precede the stage joining them, in join order
//! 3. The first occurrence of a name wins
//! 4. The sink is always last

mod emitter;
mod explain;
mod plan;
mod resolver;

pub use emitter::emit;
pub use explain::ExplainPlan;
pub use plan::{compile, CompiledCheck, ResultKind, Statement, StatementRole};
pub use resolver::{resolve, ResolvedStage};
