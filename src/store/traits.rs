use anyhow::Result;

use crate::model::{Actor, Cast, Id, Movie, NewActor, NewMovie};

/// Fixed page size for list/search endpoints.
pub const PAGE_SIZE: i64 = 10;

#[async_trait::async_trait]
pub trait ActorStore: Send + Sync {
    async fn get_actor(&self, id: Id) -> Result<Option<Actor>>;
    /// Case-insensitive substring search ordered by name; returns one page
    /// starting at `offset` plus the total match count.
    async fn search_actors(&self, search: &str, offset: i64) -> Result<(Vec<Actor>, i64)>;
    async fn insert_actor(&self, new: NewActor) -> Result<Actor>;
    async fn update_actor(&self, actor: &Actor) -> Result<()>;
    /// Returns false when the id is unknown. Cast rows referencing the actor
    /// are removed with it.
    async fn delete_actor(&self, id: Id) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait MovieStore: Send + Sync {
    async fn get_movie(&self, id: Id) -> Result<Option<Movie>>;
    /// Case-insensitive substring search ordered by title; returns one page
    /// starting at `offset` plus the total match count.
    async fn search_movies(&self, search: &str, offset: i64) -> Result<(Vec<Movie>, i64)>;
    async fn insert_movie(&self, new: NewMovie) -> Result<Movie>;
    async fn update_movie(&self, movie: &Movie) -> Result<()>;
    /// Returns false when the id is unknown. Cast rows referencing the movie
    /// are removed with it.
    async fn delete_movie(&self, id: Id) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait CastStore: Send + Sync {
    /// Fails on unknown ids or a duplicate (movie, actor) pair; callers treat
    /// those constraint failures as client errors.
    async fn create_cast(&self, movie_id: Id, actor_id: Id) -> Result<Cast>;
    /// Returns false when no such pair exists.
    async fn delete_cast(&self, movie_id: Id, actor_id: Id) -> Result<bool>;
}

pub trait Store: ActorStore + MovieStore + CastStore {}

impl<T: ActorStore + MovieStore + CastStore> Store for T {}
