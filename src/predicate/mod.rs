//! Predicate expressions and their SQL translation
//!
//! A request filter is a tree of tag tests and spatial tests joined by
//! `and`/`or`. The tree translates to a boolean SQL condition scoped to the
//! alias of the stage under compilation.

mod ast;
pub mod literal;
mod translate;

pub use ast::Predicate;
pub use translate::translate;
