pub use super::actor_movie::Entity as ActorMovie;
pub use super::actors::Entity as Actors;
pub use super::movies::Entity as Movies;
pub use super::search_history::Entity as SearchHistory;
