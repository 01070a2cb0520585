//! Application of a normalized patch to a concrete entity, with per-field
//! validation and normalization.
//!
//! Callers apply the patch to a scratch clone and persist only on success, so
//! a failing field never leaves an entity half mutated.

use chrono::NaiveDate;
use serde_json::Value;

use crate::logic::patch::{NormalizedPatch, PatchError, PatchValue};
use crate::model::{Actor, Gender, Genre, Movie};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub trait PatchTarget: Clone {
    /// Column names addressable from a patch path, in application order.
    const COLUMNS: &'static [&'static str];

    /// Apply a normalized patch in place.
    fn apply(&mut self, patch: &NormalizedPatch) -> Result<(), PatchError>;
}

impl PatchTarget for Actor {
    const COLUMNS: &'static [&'static str] = &["id", "name", "age", "photo_url", "gender"];

    fn apply(&mut self, patch: &NormalizedPatch) -> Result<(), PatchError> {
        // `id` is a valid path but is never mutated; a patch touching only
        // `/id` falls through as a no-op.
        if let Some(pv) = patch.get("name") {
            self.name = required_string("name", pv)?;
        }
        if let Some(pv) = patch.get("age") {
            self.age = positive_int("age", pv)?;
        }
        if let Some(pv) = patch.get("photo_url") {
            self.photo_url = optional_string("photo_url", pv)?;
        }
        if let Some(pv) = patch.get("gender") {
            self.gender = match pv {
                PatchValue::Clear => None,
                PatchValue::Set(value) => Some(enum_member("gender", value, Gender::resolve)?),
            };
        }
        Ok(())
    }
}

impl PatchTarget for Movie {
    const COLUMNS: &'static [&'static str] = &["id", "title", "release_date", "genre", "poster_url"];

    fn apply(&mut self, patch: &NormalizedPatch) -> Result<(), PatchError> {
        if let Some(pv) = patch.get("title") {
            self.title = required_string("title", pv)?;
        }
        if let Some(pv) = patch.get("release_date") {
            self.release_date = optional_date("release_date", pv)?;
        }
        if let Some(pv) = patch.get("genre") {
            // genre is required, so a clear is never valid
            self.genre = match pv {
                PatchValue::Clear => {
                    return Err(PatchError::InvalidFieldValue("genre".to_string()))
                }
                PatchValue::Set(value) => enum_member("genre", value, Genre::resolve)?,
            };
        }
        if let Some(pv) = patch.get("poster_url") {
            self.poster_url = optional_string("poster_url", pv)?;
        }
        Ok(())
    }
}

fn invalid(field: &str) -> PatchError {
    PatchError::InvalidFieldValue(field.to_string())
}

/// Required strings cannot be cleared and must be non-empty after trimming.
fn required_string(field: &str, pv: &PatchValue) -> Result<String, PatchError> {
    match pv {
        PatchValue::Set(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(invalid(field)),
    }
}

/// Optional strings are cleared with an explicit `remove`; an `add` carrying
/// an empty string is a disguised clear and is rejected.
fn optional_string(field: &str, pv: &PatchValue) -> Result<Option<String>, PatchError> {
    match pv {
        PatchValue::Clear => Ok(None),
        PatchValue::Set(Value::String(s)) if !s.trim().is_empty() => {
            Ok(Some(s.trim().to_string()))
        }
        _ => Err(invalid(field)),
    }
}

fn positive_int(field: &str, pv: &PatchValue) -> Result<i64, PatchError> {
    match pv {
        PatchValue::Set(Value::Number(n)) => {
            n.as_i64().filter(|v| *v > 0).ok_or_else(|| invalid(field))
        }
        _ => Err(invalid(field)),
    }
}

fn enum_member<T>(
    field: &str,
    value: &Value,
    resolve: fn(&str) -> Option<T>,
) -> Result<T, PatchError> {
    value
        .as_str()
        .map(str::trim)
        .and_then(resolve)
        .ok_or_else(|| invalid(field))
}

fn optional_date(field: &str, pv: &PatchValue) -> Result<Option<NaiveDate>, PatchError> {
    match pv {
        PatchValue::Clear => Ok(None),
        PatchValue::Set(Value::String(s)) if !s.trim().is_empty() => {
            NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .map(Some)
                .map_err(|_| invalid(field))
        }
        _ => Err(invalid(field)),
    }
}
