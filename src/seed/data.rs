use anyhow::Result;
use chrono::NaiveDate;

use crate::logic::mutate::DATE_FORMAT;
use crate::model::{Gender, Genre, NewActor, NewMovie};
use crate::store::Store;

/// Load a small demo catalog for local development.
pub async fn load_seed_data<S: Store>(store: &S) -> Result<()> {
    let movies = [
        ("Apollo 13", Genre::ActionAndAdventure, Some("1995-06-30")),
        ("Contact", Genre::SciFi, Some("1997-07-11")),
        ("Black Panther", Genre::SciFi, Some("2018-02-16")),
        (
            "The Lord of the Rings: The Fellowship of the Ring",
            Genre::Fantasy,
            Some("2001-12-19"),
        ),
        ("Top Gun", Genre::ActionAndAdventure, Some("1986-05-16")),
    ];

    let actors = [
        ("Tom Hanks", 68, Some(Gender::Male)),
        ("Jodie Foster", 61, Some(Gender::Female)),
        ("Sigourney Weaver", 74, Some(Gender::Female)),
        ("Chadwick Boseman", 43, Some(Gender::Male)),
    ];

    let mut movie_ids = Vec::new();
    for (title, genre, release_date) in movies {
        let release_date = release_date
            .map(|raw| NaiveDate::parse_from_str(raw, DATE_FORMAT))
            .transpose()?;
        let movie = store
            .insert_movie(NewMovie {
                title: title.to_string(),
                release_date,
                genre,
                poster_url: None,
            })
            .await?;
        movie_ids.push(movie.id);
    }

    let mut actor_ids = Vec::new();
    for (name, age, gender) in actors {
        let actor = store
            .insert_actor(NewActor {
                name: name.to_string(),
                age,
                photo_url: None,
                gender,
            })
            .await?;
        actor_ids.push(actor.id);
    }

    // Apollo 13 / Tom Hanks, Contact / Jodie Foster, Black Panther / Chadwick Boseman
    store.create_cast(movie_ids[0], actor_ids[0]).await?;
    store.create_cast(movie_ids[1], actor_ids[1]).await?;
    store.create_cast(movie_ids[2], actor_ids[3]).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ActorStore, MemoryStore, MovieStore};

    #[tokio::test]
    async fn seed_loads_into_an_empty_store() {
        let store = MemoryStore::default();
        load_seed_data(&store).await.unwrap();

        let (_, total_movies) = store.search_movies("", 0).await.unwrap();
        let (_, total_actors) = store.search_actors("", 0).await.unwrap();
        assert_eq!(total_movies, 5);
        assert_eq!(total_actors, 4);
    }
}
