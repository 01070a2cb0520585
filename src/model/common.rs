/// Store-assigned integer identifier for actors and movies.
pub type Id = i64;
