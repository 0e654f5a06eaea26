//! geocheck - compiles declarative geospatial data-quality checks into
//! staged SQL pipelines
//!
//! - `predicate`: filter expressions and their SQL translation
//! - `check`: check definitions, parsing and directory loading
//! - `planner`: dependency resolution, statement emission, explain
//! - `runner`: driving compiled checks through an external store
//! - `observability`: structured logging
//! - `cli`: the `geocheck` command

pub mod check;
pub mod cli;
pub mod observability;
pub mod planner;
pub mod predicate;
pub mod runner;
