use std::path::Path;

use crate::config::MappingStore;
use crate::parser::{CandidateUrls, IdNormalizer};

/// Needs only the mapping tables, not the database.
pub fn cmd_normalize(config_path: &Path, raw: &str) -> anyhow::Result<()> {
    let normalizer = IdNormalizer::new(MappingStore::new(config_path).load());
    let normalized = normalizer.normalize(raw);

    println!("Input:      {raw}");
    println!("Normalized: {normalized}");
    println!();
    println!("Candidate pages:");

    let urls = CandidateUrls::default().generate(&normalizer, raw, Some(&normalized));
    for url in urls {
        println!("  {url}");
    }

    Ok(())
}
