pub mod candidates;
pub mod catalog_id;

pub use candidates::CandidateUrls;
pub use catalog_id::{IdMappings, IdNormalizer};
