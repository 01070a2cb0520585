pub mod actor;
pub mod cast;
pub mod common;
pub mod movie;

pub use actor::{Actor, Gender, NewActor};
pub use cast::Cast;
pub use common::Id;
pub use movie::{Genre, Movie, NewMovie};
