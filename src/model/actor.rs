use serde::{Deserialize, Serialize};

use crate::model::Id;

/// Enum members are addressed by their exact name on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn resolve(name: &str) -> Option<Gender> {
        match name {
            "MALE" => Some(Gender::Male),
            "FEMALE" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Id,
    pub name: String,
    pub age: i64,
    pub photo_url: Option<String>,
    pub gender: Option<Gender>,
}

/// Actor payload accepted by the create endpoint; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActor {
    pub name: String,
    pub age: i64,
    pub photo_url: Option<String>,
    pub gender: Option<Gender>,
}

impl NewActor {
    pub fn into_actor(self, id: Id) -> Actor {
        Actor {
            id,
            name: self.name,
            age: self.age,
            photo_url: self.photo_url,
            gender: self.gender,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_wire_names_match_resolution() {
        let json = serde_json::to_string(&Gender::Female).unwrap();
        assert_eq!(json, "\"FEMALE\"");
        assert_eq!(Gender::resolve("FEMALE"), Some(Gender::Female));
        assert_eq!(Gender::resolve("F"), None);
        assert_eq!(Gender::resolve("male"), None);
    }
}
