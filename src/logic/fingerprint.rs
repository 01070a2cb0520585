//! Content fingerprints over an entity's canonical external representation.
//!
//! The fingerprint doubles as the ETag and as the change detector that lets
//! the patch endpoint skip persistence for no-op updates.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::logic::fields;

/// External (camelCase) JSON representation of an entity.
pub fn external_repr<T: Serialize>(entity: &T) -> anyhow::Result<Value> {
    Ok(fields::camel_case_value(serde_json::to_value(entity)?))
}

/// Lowercase hex SHA-256 of the canonical external JSON. serde_json maps are
/// ordered by key, so serializing the representation is canonical.
pub fn fingerprint<T: Serialize>(entity: &T) -> anyhow::Result<String> {
    let canonical = serde_json::to_string(&external_repr(entity)?)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Actor, Gender};

    fn actor() -> Actor {
        Actor {
            id: 1,
            name: "Sigourney Weaver".to_string(),
            age: 68,
            photo_url: Some("https://example.com/sw.jpg".to_string()),
            gender: Some(Gender::Female),
        }
    }

    #[test]
    fn equal_entities_share_a_fingerprint() {
        assert_eq!(fingerprint(&actor()).unwrap(), fingerprint(&actor()).unwrap());
    }

    #[test]
    fn any_field_change_moves_the_fingerprint() {
        let base = fingerprint(&actor()).unwrap();

        let mut changed = actor();
        changed.age = 4;
        assert_ne!(fingerprint(&changed).unwrap(), base);

        let mut changed = actor();
        changed.photo_url = None;
        assert_ne!(fingerprint(&changed).unwrap(), base);

        let mut changed = actor();
        changed.gender = None;
        assert_ne!(fingerprint(&changed).unwrap(), base);
    }

    #[test]
    fn clearing_then_restoring_returns_to_the_original_fingerprint() {
        let base = fingerprint(&actor()).unwrap();
        let mut subject = actor();
        subject.photo_url = None;
        let cleared = fingerprint(&subject).unwrap();
        subject.photo_url = actor().photo_url;
        let restored = fingerprint(&subject).unwrap();
        assert_ne!(cleared, base);
        assert_eq!(restored, base);
    }

    #[test]
    fn representation_uses_external_names() {
        let repr = external_repr(&actor()).unwrap();
        let obj = repr.as_object().unwrap();
        assert!(obj.contains_key("photoUrl"));
        assert!(!obj.contains_key("photo_url"));
    }

    #[test]
    fn fingerprint_is_lowercase_hex_sha256() {
        let tag = fingerprint(&actor()).unwrap();
        assert_eq!(tag.len(), 64);
        assert!(tag.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
