//! Conversion between internal snake_case field names and the camelCase names
//! used on the wire.
//!
//! The mapping is a lossless round trip for identifiers made of lowercase
//! ASCII words joined by underscores (internal) or camel humps (external).
//! Other shapes (leading underscores, consecutive capitals) are converted
//! mechanically and end up failing the known-column check downstream instead
//! of being silently mismapped.

use serde_json::Value;

/// Internal snake_case name to external camelCase.
pub fn to_external(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// External camelCase name to internal snake_case.
pub fn to_internal(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i != 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Rewrite every object key in `value` to its external camelCase form,
/// recursing through nested objects and arrays.
pub fn camel_case_value(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, val)| (to_external(&key), camel_case_value(val)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(camel_case_value).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snake_to_camel() {
        assert_eq!(to_external("photo_url"), "photoUrl");
        assert_eq!(to_external("release_date"), "releaseDate");
        assert_eq!(to_external("name"), "name");
        assert_eq!(to_external("total_actors"), "totalActors");
    }

    #[test]
    fn camel_to_snake() {
        assert_eq!(to_internal("photoUrl"), "photo_url");
        assert_eq!(to_internal("releaseDate"), "release_date");
        assert_eq!(to_internal("name"), "name");
    }

    #[test]
    fn round_trip_for_word_identifiers() {
        for name in ["id", "name", "photo_url", "release_date", "poster_url"] {
            assert_eq!(to_internal(&to_external(name)), name);
        }
    }

    #[test]
    fn leading_capital_is_not_round_trippable() {
        // "Name" maps onto the same internal name as "name"; the column check
        // downstream is what accepts or rejects it.
        assert_eq!(to_internal("Name"), "name");
        assert_ne!(to_external(&to_internal("Name")), "Name");
    }

    #[test]
    fn camel_cases_nested_structures() {
        let payload = json!({
            "success": true,
            "total_actors": 2,
            "actors": [
                {"photo_url": null, "name": "a"},
                {"photo_url": "x", "nested": {"release_date": "2001-01-01"}},
            ],
        });
        let external = camel_case_value(payload);
        assert_eq!(
            external,
            json!({
                "success": true,
                "totalActors": 2,
                "actors": [
                    {"photoUrl": null, "name": "a"},
                    {"photoUrl": "x", "nested": {"releaseDate": "2001-01-01"}},
                ],
            })
        );
    }
}
