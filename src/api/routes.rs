use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::api::handlers::{self, AppState};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Actors
        .route("/actors", get(handlers::list_actors::<S>))
        .route("/actors", post(handlers::create_actor::<S>))
        .route("/actors/:actor_id", get(handlers::get_actor::<S>))
        .route("/actors/:actor_id", patch(handlers::update_actor::<S>))
        .route("/actors/:actor_id", delete(handlers::delete_actor::<S>))
        // Movies
        .route("/movies", get(handlers::list_movies::<S>))
        .route("/movies", post(handlers::create_movie::<S>))
        .route("/movies/:movie_id", get(handlers::get_movie::<S>))
        .route("/movies/:movie_id", patch(handlers::update_movie::<S>))
        .route("/movies/:movie_id", delete(handlers::delete_movie::<S>))
        // Casts
        .route("/casts", post(handlers::create_cast::<S>))
        .route(
            "/casts/movies/:movie_id/actors/:actor_id",
            delete(handlers::delete_cast::<S>),
        )
}
