use anyhow::{anyhow, Context, Result};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::model::{Actor, Cast, Gender, Genre, Id, Movie, NewActor, NewMovie};
use crate::store::traits::{ActorStore, CastStore, MovieStore, PAGE_SIZE};

const ACTOR_COLUMNS: &str = "id, name, age, photo_url, gender";
const MOVIE_COLUMNS: &str = "id, title, release_date, genre, poster_url";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL and pool size
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn actor_from_row(row: &PgRow) -> Result<Actor> {
    let gender: Option<String> = row.try_get("gender")?;
    let gender = gender
        .map(|g| Gender::resolve(&g).ok_or_else(|| anyhow!("unknown gender `{g}` in actors row")))
        .transpose()?;

    Ok(Actor {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        age: row.try_get("age")?,
        photo_url: row.try_get("photo_url")?,
        gender,
    })
}

fn movie_from_row(row: &PgRow) -> Result<Movie> {
    let genre: String = row.try_get("genre")?;
    let genre =
        Genre::resolve(&genre).ok_or_else(|| anyhow!("unknown genre `{genre}` in movies row"))?;

    Ok(Movie {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        release_date: row.try_get("release_date")?,
        genre,
        poster_url: row.try_get("poster_url")?,
    })
}

fn like_pattern(search: &str) -> String {
    format!("%{}%", search)
}

#[async_trait::async_trait]
impl ActorStore for PostgresStore {
    async fn get_actor(&self, id: Id) -> Result<Option<Actor>> {
        let row = sqlx::query(&format!("SELECT {ACTOR_COLUMNS} FROM actors WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch actor")?;

        row.as_ref().map(actor_from_row).transpose()
    }

    async fn search_actors(&self, search: &str, offset: i64) -> Result<(Vec<Actor>, i64)> {
        let pattern = like_pattern(search);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM actors WHERE name ILIKE $1")
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count actors")?;

        let rows = sqlx::query(&format!(
            "SELECT {ACTOR_COLUMNS} FROM actors WHERE name ILIKE $1 ORDER BY name, id LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(PAGE_SIZE)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to search actors")?;

        let actors = rows.iter().map(actor_from_row).collect::<Result<Vec<_>>>()?;
        Ok((actors, total))
    }

    async fn insert_actor(&self, new: NewActor) -> Result<Actor> {
        let row = sqlx::query(&format!(
            "INSERT INTO actors (name, age, photo_url, gender) VALUES ($1, $2, $3, $4) RETURNING {ACTOR_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(new.age)
        .bind(&new.photo_url)
        .bind(new.gender.map(|g| g.as_str()))
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert actor")?;

        actor_from_row(&row)
    }

    async fn update_actor(&self, actor: &Actor) -> Result<()> {
        sqlx::query(
            "UPDATE actors SET name = $2, age = $3, photo_url = $4, gender = $5 WHERE id = $1",
        )
        .bind(actor.id)
        .bind(&actor.name)
        .bind(actor.age)
        .bind(&actor.photo_url)
        .bind(actor.gender.map(|g| g.as_str()))
        .execute(&self.pool)
        .await
        .context("Failed to update actor")?;

        Ok(())
    }

    async fn delete_actor(&self, id: Id) -> Result<bool> {
        // casts rows go with the actor via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM actors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete actor")?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl MovieStore for PostgresStore {
    async fn get_movie(&self, id: Id) -> Result<Option<Movie>> {
        let row = sqlx::query(&format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch movie")?;

        row.as_ref().map(movie_from_row).transpose()
    }

    async fn search_movies(&self, search: &str, offset: i64) -> Result<(Vec<Movie>, i64)> {
        let pattern = like_pattern(search);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies WHERE title ILIKE $1")
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count movies")?;

        let rows = sqlx::query(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE title ILIKE $1 ORDER BY title, id LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(PAGE_SIZE)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to search movies")?;

        let movies = rows.iter().map(movie_from_row).collect::<Result<Vec<_>>>()?;
        Ok((movies, total))
    }

    async fn insert_movie(&self, new: NewMovie) -> Result<Movie> {
        let row = sqlx::query(&format!(
            "INSERT INTO movies (title, release_date, genre, poster_url) VALUES ($1, $2, $3, $4) RETURNING {MOVIE_COLUMNS}"
        ))
        .bind(&new.title)
        .bind(new.release_date)
        .bind(new.genre.as_str())
        .bind(&new.poster_url)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert movie")?;

        movie_from_row(&row)
    }

    async fn update_movie(&self, movie: &Movie) -> Result<()> {
        sqlx::query(
            "UPDATE movies SET title = $2, release_date = $3, genre = $4, poster_url = $5 WHERE id = $1",
        )
        .bind(movie.id)
        .bind(&movie.title)
        .bind(movie.release_date)
        .bind(movie.genre.as_str())
        .bind(&movie.poster_url)
        .execute(&self.pool)
        .await
        .context("Failed to update movie")?;

        Ok(())
    }

    async fn delete_movie(&self, id: Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete movie")?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl CastStore for PostgresStore {
    async fn create_cast(&self, movie_id: Id, actor_id: Id) -> Result<Cast> {
        // unknown ids hit the foreign keys, duplicates hit the primary key;
        // either way the constraint failure surfaces to the caller
        sqlx::query("INSERT INTO casts (movie_id, actor_id) VALUES ($1, $2)")
            .bind(movie_id)
            .bind(actor_id)
            .execute(&self.pool)
            .await
            .context("Failed to insert cast")?;

        Ok(Cast { movie_id, actor_id })
    }

    async fn delete_cast(&self, movie_id: Id, actor_id: Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM casts WHERE movie_id = $1 AND actor_id = $2")
            .bind(movie_id)
            .bind(actor_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete cast")?;

        Ok(result.rows_affected() > 0)
    }
}
