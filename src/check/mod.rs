//! Check definitions for geocheck
//!
//! A check is a named sequence of requests. Each request reads from a
//! built-in source or an earlier request and either filters it with a
//! predicate or buffers its geometry. The last request is the sink whose rows
//! are reported.
//!
//! # Design Principles
//!
//! - Parsed once, immutable afterwards
//! - Derived data (translated conditions, join sets) computed at construction
//! - Every error rejects one check only, never the directory

mod definition;
mod errors;
mod loader;
mod parser;
mod stage;
mod types;

pub use definition::{CheckDefinition, ClassMetadata};
pub use errors::{CompileError, CompileErrorCode, CompileResult, Severity};
pub use loader::{CheckLoader, RejectedCheck, DEFAULT_EXTENSION};
pub use parser::parse_check;
pub use stage::{StageDescriptor, StageMode, SOURCE_ALIAS};
pub use types::{BuiltinSource, FeatureKind, GeometryKind};
