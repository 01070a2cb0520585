use std::collections::{BTreeMap, BTreeSet};

use anyhow::{bail, Result};
use parking_lot::RwLock;

use crate::model::{Actor, Cast, Id, Movie, NewActor, NewMovie};
use crate::store::traits::{ActorStore, CastStore, MovieStore, PAGE_SIZE};

/// In-process store used by the integration tests and for local development
/// without a database. Mirrors the relational semantics of [`PostgresStore`]:
/// store-assigned ids, case-insensitive substring search ordered by the
/// display field, unique cast pairs, and cascade deletes of cast rows.
///
/// [`PostgresStore`]: crate::store::PostgresStore
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    actors: BTreeMap<Id, Actor>,
    movies: BTreeMap<Id, Movie>,
    casts: BTreeSet<(Id, Id)>,
    next_actor_id: Id,
    next_movie_id: Id,
}

fn page<T: Clone>(mut matches: Vec<(&str, &T)>, offset: i64) -> (Vec<T>, i64) {
    let total = matches.len() as i64;
    matches.sort_by(|a, b| a.0.cmp(b.0));
    let items = matches
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(PAGE_SIZE as usize)
        .map(|(_, item)| item.clone())
        .collect();
    (items, total)
}

fn matches_search(haystack: &str, search: &str) -> bool {
    haystack.to_lowercase().contains(&search.to_lowercase())
}

#[async_trait::async_trait]
impl ActorStore for MemoryStore {
    async fn get_actor(&self, id: Id) -> Result<Option<Actor>> {
        Ok(self.inner.read().actors.get(&id).cloned())
    }

    async fn search_actors(&self, search: &str, offset: i64) -> Result<(Vec<Actor>, i64)> {
        let inner = self.inner.read();
        let matches = inner
            .actors
            .values()
            .filter(|actor| matches_search(&actor.name, search))
            .map(|actor| (actor.name.as_str(), actor))
            .collect();
        Ok(page(matches, offset))
    }

    async fn insert_actor(&self, new: NewActor) -> Result<Actor> {
        let mut inner = self.inner.write();
        inner.next_actor_id += 1;
        let actor = new.into_actor(inner.next_actor_id);
        inner.actors.insert(actor.id, actor.clone());
        Ok(actor)
    }

    async fn update_actor(&self, actor: &Actor) -> Result<()> {
        let mut inner = self.inner.write();
        if !inner.actors.contains_key(&actor.id) {
            bail!("actor {} does not exist", actor.id);
        }
        inner.actors.insert(actor.id, actor.clone());
        Ok(())
    }

    async fn delete_actor(&self, id: Id) -> Result<bool> {
        let mut inner = self.inner.write();
        let removed = inner.actors.remove(&id).is_some();
        if removed {
            inner.casts.retain(|(_, actor_id)| *actor_id != id);
        }
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl MovieStore for MemoryStore {
    async fn get_movie(&self, id: Id) -> Result<Option<Movie>> {
        Ok(self.inner.read().movies.get(&id).cloned())
    }

    async fn search_movies(&self, search: &str, offset: i64) -> Result<(Vec<Movie>, i64)> {
        let inner = self.inner.read();
        let matches = inner
            .movies
            .values()
            .filter(|movie| matches_search(&movie.title, search))
            .map(|movie| (movie.title.as_str(), movie))
            .collect();
        Ok(page(matches, offset))
    }

    async fn insert_movie(&self, new: NewMovie) -> Result<Movie> {
        let mut inner = self.inner.write();
        inner.next_movie_id += 1;
        let movie = new.into_movie(inner.next_movie_id);
        inner.movies.insert(movie.id, movie.clone());
        Ok(movie)
    }

    async fn update_movie(&self, movie: &Movie) -> Result<()> {
        let mut inner = self.inner.write();
        if !inner.movies.contains_key(&movie.id) {
            bail!("movie {} does not exist", movie.id);
        }
        inner.movies.insert(movie.id, movie.clone());
        Ok(())
    }

    async fn delete_movie(&self, id: Id) -> Result<bool> {
        let mut inner = self.inner.write();
        let removed = inner.movies.remove(&id).is_some();
        if removed {
            inner.casts.retain(|(movie_id, _)| *movie_id != id);
        }
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl CastStore for MemoryStore {
    async fn create_cast(&self, movie_id: Id, actor_id: Id) -> Result<Cast> {
        let mut inner = self.inner.write();
        if !inner.movies.contains_key(&movie_id) {
            bail!("movie {movie_id} does not exist");
        }
        if !inner.actors.contains_key(&actor_id) {
            bail!("actor {actor_id} does not exist");
        }
        if !inner.casts.insert((movie_id, actor_id)) {
            bail!("cast (movie {movie_id}, actor {actor_id}) already exists");
        }
        Ok(Cast { movie_id, actor_id })
    }

    async fn delete_cast(&self, movie_id: Id, actor_id: Id) -> Result<bool> {
        Ok(self.inner.write().casts.remove(&(movie_id, actor_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Genre;

    fn new_actor(name: &str) -> NewActor {
        NewActor {
            name: name.to_string(),
            age: 40,
            photo_url: None,
            gender: None,
        }
    }

    #[tokio::test]
    async fn assigns_sequential_ids() {
        let store = MemoryStore::default();
        let first = store.insert_actor(new_actor("A")).await.unwrap();
        let second = store.insert_actor(new_actor("B")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_ordered_and_paged() {
        let store = MemoryStore::default();
        for i in 0..12 {
            store
                .insert_actor(new_actor(&format!("Actor {:02}", 12 - i)))
                .await
                .unwrap();
        }
        let (items, total) = store.search_actors("actor", 0).await.unwrap();
        assert_eq!(total, 12);
        assert_eq!(items.len(), PAGE_SIZE as usize);
        assert_eq!(items[0].name, "Actor 01");

        let (items, total) = store.search_actors("ACTOR", 10).await.unwrap();
        assert_eq!(total, 12);
        assert_eq!(items.len(), 2);

        let (items, total) = store.search_actors("nobody", 0).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn deleting_a_movie_cascades_cast_rows() {
        let store = MemoryStore::default();
        let actor = store.insert_actor(new_actor("A")).await.unwrap();
        let movie = store
            .insert_movie(NewMovie {
                title: "M".to_string(),
                release_date: None,
                genre: Genre::Drama,
                poster_url: None,
            })
            .await
            .unwrap();
        store.create_cast(movie.id, actor.id).await.unwrap();

        assert!(store.delete_movie(movie.id).await.unwrap());
        assert!(!store.delete_cast(movie.id, actor.id).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_cast_pairs_are_rejected() {
        let store = MemoryStore::default();
        let actor = store.insert_actor(new_actor("A")).await.unwrap();
        let movie = store
            .insert_movie(NewMovie {
                title: "M".to_string(),
                release_date: None,
                genre: Genre::Drama,
                poster_url: None,
            })
            .await
            .unwrap();
        store.create_cast(movie.id, actor.id).await.unwrap();
        assert!(store.create_cast(movie.id, actor.id).await.is_err());
        assert!(store.create_cast(movie.id + 1, actor.id).await.is_err());
    }
}
