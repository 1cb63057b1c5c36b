mod clean;
mod history;
mod init;
mod movie;
mod normalize;
mod search;
mod star;
mod star_movies;

pub use clean::cmd_clean;
pub use history::cmd_history;
pub use init::cmd_init;
pub use movie::cmd_movie;
pub use normalize::cmd_normalize;
pub use search::cmd_search;
pub use star::cmd_star;
pub use star_movies::cmd_star_movies;
