//! Structural checks shared by the dialects.
//!
//! These are not a meta-schema validator: they only reject documents whose
//! keywords have the wrong JSON type, which is enough to keep the indexer and
//! resolver from silently skipping malformed subschemas.

use serde_json::{Map, Value};

use crate::{DialectStrategy, Vocabulary, pointer};

/// A document is not shaped like a schema of the dialect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (at #{pointer})")]
pub struct ShapeError {
    /// Pointer of the offending node or keyword.
    pub pointer: String,
    pub message: String,
}

impl ShapeError {
    pub fn new(pointer: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            message: message.into(),
        }
    }
}

const TYPES: &[&str] = &[
    "null", "boolean", "object", "array", "number", "string", "integer",
];

const NON_NEGATIVE_INTEGERS: &[&str] = &[
    "maxLength",
    "minLength",
    "maxItems",
    "minItems",
    "maxProperties",
    "minProperties",
];

/// Walk `document` depth first, checking every schema node.
///
/// The walk stops at embedded resources that declare another dialect (see
/// [`DialectStrategy::foreign_dialect`]); callers validate those subtrees
/// with their own dialect.
///
/// # Errors
///
/// Returns the first [`ShapeError`] found.
pub fn validate<S: DialectStrategy + ?Sized>(
    strategy: &S,
    document: &Value,
) -> Result<(), ShapeError> {
    match document {
        Value::Object(_) => walk(strategy, document, ""),
        Value::Bool(_) if strategy.vocabulary().boolean_schemas.allows(None) => Ok(()),
        Value::Bool(_) => Err(ShapeError::new(
            "",
            format!("{} does not allow a boolean root schema", strategy.dialect()),
        )),
        other => Err(ShapeError::new(
            "",
            format!("expected a schema object, found {}", json_type(other)),
        )),
    }
}

fn walk<S: DialectStrategy + ?Sized>(
    strategy: &S,
    node: &Value,
    at: &str,
) -> Result<(), ShapeError> {
    let Value::Object(map) = node else {
        return Ok(());
    };
    strategy.check_keywords(map, at)?;
    let booleans = strategy.vocabulary().boolean_schemas;
    for child in strategy.select_children(node, at) {
        if child.node.is_boolean() && !booleans.allows(Some(child.keyword)) {
            return Err(ShapeError::new(
                child.pointer,
                format!(
                    "{} does not allow a boolean schema under `{}`",
                    strategy.dialect(),
                    child.keyword
                ),
            ));
        }
        // Embedded resources in another dialect are checked by that dialect.
        if strategy.foreign_dialect(child.node).is_some() {
            continue;
        }
        walk(strategy, child.node, &child.pointer)?;
    }
    Ok(())
}

/// Checks every dialect applies to an object node.
///
/// # Errors
///
/// Returns a [`ShapeError`] for the first keyword with the wrong JSON type.
pub fn check_common(
    vocabulary: &Vocabulary,
    map: &Map<String, Value>,
    at: &str,
) -> Result<(), ShapeError> {
    check_string(map, "$schema", at)?;
    check_string(map, "$ref", at)?;
    check_string(map, vocabulary.id, at)?;
    check_string(map, "pattern", at)?;
    if let Some(keyword) = vocabulary.anchor {
        check_anchor_name(map, keyword, at)?;
    }
    check_type(map, at)?;
    check_string_array(map, "required", at)?;
    check_array(map, "enum", at)?;
    for keyword in NON_NEGATIVE_INTEGERS {
        check_non_negative_integer(map, keyword, at)?;
    }
    check_number(map, "minimum", at)?;
    check_number(map, "maximum", at)?;
    if let Some(multiple) = map.get("multipleOf")
        && !multiple.as_f64().is_some_and(|m| m > 0.0)
    {
        return Err(keyword_error(at, "multipleOf", "must be a number greater than 0"));
    }
    check_subschema_positions(vocabulary, map, at)
}

fn check_subschema_positions(
    vocabulary: &Vocabulary,
    map: &Map<String, Value>,
    at: &str,
) -> Result<(), ShapeError> {
    for &keyword in vocabulary.subschema {
        match map.get(keyword) {
            None | Some(Value::Object(_) | Value::Bool(_)) => {}
            Some(Value::Array(_)) if keyword == "items" && vocabulary.tuple_items => {}
            Some(Value::Array(_)) if keyword == "items" => {
                return Err(keyword_error(
                    at,
                    keyword,
                    "must be a single schema; use `prefixItems` for tuples",
                ));
            }
            Some(other) => {
                return Err(keyword_error(
                    at,
                    keyword,
                    &format!("must be a schema, found {}", json_type(other)),
                ));
            }
        }
    }

    for &keyword in vocabulary.subschema_map {
        let Some(value) = map.get(keyword) else {
            continue;
        };
        let Value::Object(entries) = value else {
            return Err(keyword_error(at, keyword, "must be an object"));
        };
        for (name, entry) in entries {
            let ok = match entry {
                Value::Object(_) | Value::Bool(_) => true,
                Value::Array(items) => keyword == "dependencies" && items.iter().all(Value::is_string),
                _ => false,
            };
            if !ok {
                return Err(ShapeError::new(
                    pointer::push(&pointer::push(at, keyword), name),
                    format!("`{keyword}` values must be schemas"),
                ));
            }
        }
    }

    for &keyword in vocabulary.subschema_array {
        match map.get(keyword) {
            None => {}
            Some(Value::Array(items)) if !items.is_empty() => {}
            Some(_) => return Err(keyword_error(at, keyword, "must be a non-empty array")),
        }
    }
    Ok(())
}

/// Draft-04 `exclusiveMinimum`/`exclusiveMaximum` are boolean modifiers.
///
/// # Errors
///
/// Returns a [`ShapeError`] when either is not a boolean.
pub fn check_boolean_bounds(map: &Map<String, Value>, at: &str) -> Result<(), ShapeError> {
    for keyword in ["exclusiveMinimum", "exclusiveMaximum"] {
        if map.get(keyword).is_some_and(|v| !v.is_boolean()) {
            return Err(keyword_error(at, keyword, "must be a boolean in draft-04"));
        }
    }
    Ok(())
}

/// Draft-06 and later: `exclusiveMinimum`/`exclusiveMaximum` are numbers.
///
/// # Errors
///
/// Returns a [`ShapeError`] when either is not a number.
pub fn check_numeric_bounds(map: &Map<String, Value>, at: &str) -> Result<(), ShapeError> {
    check_number(map, "exclusiveMinimum", at)?;
    check_number(map, "exclusiveMaximum", at)
}

/// # Errors
///
/// Returns a [`ShapeError`] when `keyword` is present and not a string.
pub fn check_string(map: &Map<String, Value>, keyword: &str, at: &str) -> Result<(), ShapeError> {
    match map.get(keyword) {
        None | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(keyword_error(at, keyword, "must be a string")),
    }
}

/// # Errors
///
/// Returns a [`ShapeError`] when `keyword` is present and not a boolean.
pub fn check_bool(map: &Map<String, Value>, keyword: &str, at: &str) -> Result<(), ShapeError> {
    match map.get(keyword) {
        None | Some(Value::Bool(_)) => Ok(()),
        Some(_) => Err(keyword_error(at, keyword, "must be a boolean")),
    }
}

/// `keyword` must be a plain-name anchor: a letter or `_` followed by
/// letters, digits, `-`, `_` or `.`.
///
/// # Errors
///
/// Returns a [`ShapeError`] for a non-string or malformed anchor.
pub fn check_anchor_name(
    map: &Map<String, Value>,
    keyword: &str,
    at: &str,
) -> Result<(), ShapeError> {
    let Some(value) = map.get(keyword) else {
        return Ok(());
    };
    let Some(name) = value.as_str() else {
        return Err(keyword_error(at, keyword, "must be a string"));
    };
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(keyword_error(
            at,
            keyword,
            &format!("'{name}' is not a valid anchor name"),
        ))
    }
}

/// # Errors
///
/// Returns a [`ShapeError`] when `keyword` is present and not a non-empty array.
pub fn check_non_empty(map: &Map<String, Value>, keyword: &str, at: &str) -> Result<(), ShapeError> {
    match map.get(keyword) {
        Some(Value::Array(items)) if items.is_empty() => {
            Err(keyword_error(at, keyword, "must not be empty"))
        }
        _ => Ok(()),
    }
}

/// `dependentRequired` maps property names to arrays of property names.
///
/// # Errors
///
/// Returns a [`ShapeError`] for any other shape.
pub fn check_dependent_required(map: &Map<String, Value>, at: &str) -> Result<(), ShapeError> {
    let Some(value) = map.get("dependentRequired") else {
        return Ok(());
    };
    let valid = value.as_object().is_some_and(|deps| {
        deps.values()
            .all(|v| v.as_array().is_some_and(|a| a.iter().all(Value::is_string)))
    });
    if valid {
        Ok(())
    } else {
        Err(keyword_error(
            at,
            "dependentRequired",
            "must map names to arrays of strings",
        ))
    }
}

fn check_type(map: &Map<String, Value>, at: &str) -> Result<(), ShapeError> {
    let unknown = |ty: &str| keyword_error(at, "type", &format!("unknown type '{ty}'"));
    match map.get("type") {
        None => Ok(()),
        Some(Value::String(ty)) if TYPES.contains(&ty.as_str()) => Ok(()),
        Some(Value::String(ty)) => Err(unknown(ty.as_str())),
        Some(Value::Array(types)) => {
            let mut seen = Vec::with_capacity(types.len());
            for ty in types {
                let Some(ty) = ty.as_str() else {
                    return Err(keyword_error(at, "type", "array entries must be strings"));
                };
                if !TYPES.contains(&ty) {
                    return Err(unknown(ty));
                }
                if seen.contains(&ty) {
                    return Err(keyword_error(at, "type", &format!("duplicate type '{ty}'")));
                }
                seen.push(ty);
            }
            Ok(())
        }
        Some(_) => Err(keyword_error(at, "type", "must be a string or an array")),
    }
}

fn check_string_array(map: &Map<String, Value>, keyword: &str, at: &str) -> Result<(), ShapeError> {
    match map.get(keyword) {
        None => Ok(()),
        Some(Value::Array(items)) if items.iter().all(Value::is_string) => Ok(()),
        Some(_) => Err(keyword_error(at, keyword, "must be an array of strings")),
    }
}

fn check_array(map: &Map<String, Value>, keyword: &str, at: &str) -> Result<(), ShapeError> {
    match map.get(keyword) {
        None | Some(Value::Array(_)) => Ok(()),
        Some(_) => Err(keyword_error(at, keyword, "must be an array")),
    }
}

fn check_number(map: &Map<String, Value>, keyword: &str, at: &str) -> Result<(), ShapeError> {
    match map.get(keyword) {
        None | Some(Value::Number(_)) => Ok(()),
        Some(_) => Err(keyword_error(at, keyword, "must be a number")),
    }
}

fn check_non_negative_integer(
    map: &Map<String, Value>,
    keyword: &str,
    at: &str,
) -> Result<(), ShapeError> {
    let Some(value) = map.get(keyword) else {
        return Ok(());
    };
    // 2.0 is an integer as far as JSON Schema is concerned.
    let ok = value.as_u64().is_some()
        || value
            .as_f64()
            .is_some_and(|f| f >= 0.0 && f.fract() == 0.0);
    if ok {
        Ok(())
    } else {
        Err(keyword_error(at, keyword, "must be a non-negative integer"))
    }
}

fn keyword_error(at: &str, keyword: &str, message: &str) -> ShapeError {
    ShapeError::new(pointer::push(at, keyword), format!("`{keyword}` {message}"))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
