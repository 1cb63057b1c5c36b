pub mod prelude;

pub mod actor_movie;
pub mod actors;
pub mod movies;
pub mod search_history;
