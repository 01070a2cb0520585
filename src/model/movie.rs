use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::Id;

/// Enum members are addressed by their exact name on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Genre {
    ActionAndAdventure,
    Animation,
    Comedy,
    Documentary,
    Drama,
    Fantasy,
    Historical,
    Horror,
    Noir,
    SciFi,
    Western,
}

impl Genre {
    pub fn resolve(name: &str) -> Option<Genre> {
        match name {
            "ACTION_AND_ADVENTURE" => Some(Genre::ActionAndAdventure),
            "ANIMATION" => Some(Genre::Animation),
            "COMEDY" => Some(Genre::Comedy),
            "DOCUMENTARY" => Some(Genre::Documentary),
            "DRAMA" => Some(Genre::Drama),
            "FANTASY" => Some(Genre::Fantasy),
            "HISTORICAL" => Some(Genre::Historical),
            "HORROR" => Some(Genre::Horror),
            "NOIR" => Some(Genre::Noir),
            "SCI_FI" => Some(Genre::SciFi),
            "WESTERN" => Some(Genre::Western),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::ActionAndAdventure => "ACTION_AND_ADVENTURE",
            Genre::Animation => "ANIMATION",
            Genre::Comedy => "COMEDY",
            Genre::Documentary => "DOCUMENTARY",
            Genre::Drama => "DRAMA",
            Genre::Fantasy => "FANTASY",
            Genre::Historical => "HISTORICAL",
            Genre::Horror => "HORROR",
            Genre::Noir => "NOIR",
            Genre::SciFi => "SCI_FI",
            Genre::Western => "WESTERN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: Id,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub genre: Genre,
    pub poster_url: Option<String>,
}

/// Movie payload accepted by the create endpoint; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub genre: Genre,
    pub poster_url: Option<String>,
}

impl NewMovie {
    pub fn into_movie(self, id: Id) -> Movie {
        Movie {
            id,
            title: self.title,
            release_date: self.release_date,
            genre: self.genre,
            poster_url: self.poster_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_wire_names_match_resolution() {
        assert_eq!(
            serde_json::to_string(&Genre::ActionAndAdventure).unwrap(),
            "\"ACTION_AND_ADVENTURE\""
        );
        assert_eq!(Genre::resolve("SCI_FI"), Some(Genre::SciFi));
        assert_eq!(Genre::resolve("SCIFI"), None);
        assert_eq!(Genre::resolve(""), None);
    }

    #[test]
    fn movie_serializes_snake_case_with_nulls() {
        let movie = Movie {
            id: 3,
            title: "Contact".to_string(),
            release_date: None,
            genre: Genre::SciFi,
            poster_url: None,
        };
        let value = serde_json::to_value(&movie).unwrap();
        assert_eq!(value["release_date"], serde_json::Value::Null);
        assert_eq!(value["genre"], "SCI_FI");
    }
}
