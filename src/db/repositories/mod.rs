pub mod actor;
pub mod maintenance;
pub mod movie;
pub mod search_history;
