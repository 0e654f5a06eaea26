//! Check execution for geocheck
//!
//! geocheck does not talk to a database itself. The store and the reporting
//! registry are reached through two traits:
//!
//! - [`StatementExecutor`] runs statement text and streams result rows
//! - [`ClassRegistry`] mints the classification handle issues are stamped with
//!
//! [`CheckRunner`] ties them together: one registration per check, then one
//! sequential pipeline per check.

mod errors;
mod executor;
mod registry;
#[allow(clippy::module_inception)]
mod runner;

pub use errors::{RunError, RunResult};
pub use executor::{FeatureRef, Issue, ResultRow, RowCallback, StatementExecutor};
pub use registry::{ClassHandle, ClassRegistry, MemoryClassRegistry, RegisteredClass};
pub use runner::{CheckRunner, RunSummary};
