use serde::{Deserialize, Serialize};

use crate::model::Id;

/// Join row between a movie and an actor. Unique per pair, no identity or
/// attributes of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cast {
    pub movie_id: Id,
    pub actor_id: Id,
}

impl Cast {
    /// Composite identifier reported back to clients.
    pub fn external_id(&self) -> String {
        format!("movie-{}-actor-{}", self.movie_id, self.actor_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_id_format() {
        let cast = Cast {
            movie_id: 7,
            actor_id: 12,
        };
        assert_eq!(cast.external_id(), "movie-7-actor-12");
    }
}
