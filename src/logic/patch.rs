//! Parsing and normalization of the constrained JSON Patch dialect.
//!
//! Only `add` and `remove` are supported; `replace`, `move`, `copy` and `test`
//! are rejected. Paths are single-segment (`/fieldName`) and must map to a
//! known column of the target entity. Removal is represented by an explicit
//! [`PatchValue::Clear`] tombstone so it can never be confused with assigning
//! a literal null or empty value.

use std::collections::HashMap;

use serde_json::Value;

use crate::logic::fields;

#[derive(Debug, Clone, PartialEq)]
pub enum PatchValue {
    /// Replace the field with the given literal.
    Set(Value),
    /// Clear the field to its null representation (from `remove`).
    Clear,
}

/// Validated patch keyed by internal field name. Duplicate paths across
/// operations collapse here, last write wins.
pub type NormalizedPatch = HashMap<String, PatchValue>;

/// Internal distinctions are for test clarity; the HTTP layer surfaces all of
/// these as a generic bad request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatchError {
    #[error("invalid JSON patch operation")]
    InvalidOperation,
    #[error("invalid JSON patch path")]
    InvalidPath,
    #[error("invalid value for field `{0}`")]
    InvalidFieldValue(String),
}

/// Validate a raw operation list against an entity's column set and flatten it
/// into a [`NormalizedPatch`].
pub fn normalize_patch(ops: &[Value], columns: &[&str]) -> Result<NormalizedPatch, PatchError> {
    let mut patch = NormalizedPatch::new();

    for op in ops {
        let Some(item) = op.as_object() else {
            return Err(PatchError::InvalidOperation);
        };
        let verb = match item.get("op").and_then(Value::as_str) {
            Some(verb @ ("add" | "remove")) => verb,
            _ => return Err(PatchError::InvalidOperation),
        };
        // Removal must be unambiguous, and an add must actually carry a value.
        if verb == "remove" && item.contains_key("value") {
            return Err(PatchError::InvalidOperation);
        }
        if verb == "add" && !item.contains_key("value") {
            return Err(PatchError::InvalidOperation);
        }

        let Some(path) = item.get("path").and_then(Value::as_str) else {
            return Err(PatchError::InvalidPath);
        };
        let Some(segment) = path.strip_prefix('/') else {
            return Err(PatchError::InvalidPath);
        };
        let field = fields::to_internal(segment);
        if field.is_empty() || !columns.contains(&field.as_str()) {
            return Err(PatchError::InvalidPath);
        }

        let value = match verb {
            "remove" => PatchValue::Clear,
            _ => PatchValue::Set(item.get("value").cloned().unwrap_or(Value::Null)),
        };
        patch.insert(field, value);
    }

    Ok(patch)
}
