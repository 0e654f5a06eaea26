//! Predicate to SQL condition translation
//!
//! Each connective wraps its joined children in one pair of parentheses, so a
//! tree of `And`/`Or`/`HasTag` nodes renders with exactly two parentheses per
//! connective and leaves never add their own.

use super::ast::Predicate;
use super::literal::quote;

/// Translates `expr` into a boolean condition over the rows aliased `alias`.
///
/// `Intersects` renders against the other stage's `geom` column; the caller
/// is responsible for joining that stage in.
pub fn translate(expr: &Predicate, alias: &str) -> String {
    match expr {
        Predicate::And(children) => connective(children, alias, " AND "),
        Predicate::Or(children) => connective(children, alias, " OR "),
        Predicate::HasTag(key) => format!("{}.tags ? {}", alias, quote(key)),
        Predicate::HasNotTag(key) => format!("NOT {}.tags ? {}", alias, quote(key)),
        Predicate::KeyEquals { key, value } => {
            format!("{}.tags->{} = {}", alias, quote(key), quote(value))
        }
        Predicate::KeyNotEquals { key, value } => {
            format!("{}.tags->{} != {}", alias, quote(key), quote(value))
        }
        Predicate::Intersects(other) => {
            format!("ST_Intersects({}.geom, {}.geom)", alias, other)
        }
    }
}

fn connective(children: &[Predicate], alias: &str, op: &str) -> String {
    let parts: Vec<String> = children.iter().map(|c| translate(c, alias)).collect();
    format!("({})", parts.join(op))
}
