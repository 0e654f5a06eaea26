//! Identifier and literal validation for embedded query text
//!
//! Statements are built as plain text. Every identifier and literal that
//! ends up inside one passes through here first.

use std::sync::OnceLock;

use regex::Regex;

use crate::check::{CompileError, CompileResult};

/// Longest identifier PostgreSQL keeps without truncation
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Longest tag key or value OSM allows
pub const MAX_TAG_LEN: usize = 255;

static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
static DISTANCE: OnceLock<Regex> = OnceLock::new();

fn identifier_re() -> &'static Regex {
    IDENTIFIER.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
    })
}

fn distance_re() -> &'static Regex {
    DISTANCE.get_or_init(|| {
        Regex::new(r"^-?[0-9]+(\.[0-9]+)?([eE][-+]?[0-9]+)?$").expect("distance pattern is valid")
    })
}

/// Validates a stage or relation name
pub fn validate_identifier(name: &str) -> CompileResult<()> {
    if name.len() > MAX_IDENTIFIER_LEN || !identifier_re().is_match(name) {
        return Err(CompileError::invalid_literal("identifier", name));
    }
    Ok(())
}

/// Validates a buffer distance, passed through verbatim
pub fn validate_distance(distance: &str) -> CompileResult<()> {
    if !distance_re().is_match(distance) {
        return Err(CompileError::invalid_literal("buffer distance", distance));
    }
    Ok(())
}

/// Validates a tag key
pub fn validate_tag_key(key: &str) -> CompileResult<()> {
    if key.is_empty() || key.len() > MAX_TAG_LEN {
        return Err(CompileError::invalid_literal("tag key", key));
    }
    Ok(())
}

/// Validates a tag value
pub fn validate_tag_value(value: &str) -> CompileResult<()> {
    if value.len() > MAX_TAG_LEN {
        return Err(CompileError::invalid_literal("tag value", value));
    }
    Ok(())
}

/// Renders a single-quoted SQL string literal
pub fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers() {
        assert!(validate_identifier("ways_bbox").is_ok());
        assert!(validate_identifier("_tmp2").is_ok());
        assert!(validate_identifier("2fast").is_err());
        assert!(validate_identifier("a-b").is_err());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier(&"x".repeat(64)).is_err());
    }

    #[test]
    fn test_distances() {
        for ok in ["10", "0.5", "-3", "1e3", "2.5E-2"] {
            assert!(validate_distance(ok).is_ok(), "{}", ok);
        }
        for bad in ["", "ten", "1.", ".5", "1, 2", "10)"] {
            assert!(validate_distance(bad).is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_quote_doubles_single_quotes() {
        assert_eq!(quote("McDonald's"), "'McDonald''s'");
        assert_eq!(quote(""), "''");
    }
}
