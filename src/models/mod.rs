pub mod actor;
pub mod movie;

pub use actor::Actor;
pub use movie::{Genre, Magnet, Movie, MovieCard, MoviePage, Pagination, Publisher, Sample, StarRef};

use serde::{Deserialize, Deserializer};

/// Accepts a string, a number or null for free-text profile fields. The
/// catalog is not consistent about `"24"` vs `24`.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}
