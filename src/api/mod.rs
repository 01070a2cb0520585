pub mod auth_extractor;
pub mod handlers;
pub mod routes;

pub use auth_extractor::*;
pub use handlers::*;
pub use routes::*;
