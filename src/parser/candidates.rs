use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use super::catalog_id::{IdNormalizer, clean_id};

/// Detail page templates, in probe order. `{}` is replaced by the content id.
pub const DETAIL_URL_TEMPLATES: [&str; 6] = [
    "https://www.dmm.co.jp/mono/dvd/-/detail/=/cid={}/",
    "https://www.dmm.co.jp/digital/videoa/-/detail/=/cid={}/",
    "https://www.dmm.co.jp/digital/videoc/-/detail/=/cid={}/",
    "https://www.dmm.co.jp/digital/anime/-/detail/=/cid={}/",
    "https://www.dmm.co.jp/mono/anime/-/detail/=/cid={}/",
    "https://www.dmm.co.jp/digital/nikkatsu/-/detail/=/cid={}/",
];

fn already_normalized() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z]+\d{3,}[a-z]?$").expect("Invalid regex pattern defined in code")
    })
}

fn unmapped_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z]+00\d{3,}").expect("Invalid regex pattern defined in code"))
}

/// Expands a catalog code into the ordered list of detail URLs to probe.
#[derive(Debug, Clone)]
pub struct CandidateUrls {
    templates: Vec<String>,
}

impl Default for CandidateUrls {
    fn default() -> Self {
        Self::new(DETAIL_URL_TEMPLATES.iter().map(ToString::to_string))
    }
}

impl CandidateUrls {
    pub fn new(templates: impl IntoIterator<Item = String>) -> Self {
        let templates: Vec<String> = templates.into_iter().collect();
        if templates.is_empty() {
            return Self::default();
        }
        Self { templates }
    }

    #[must_use]
    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    /// Candidate URLs for `raw`.
    ///
    /// With `pre_normalized` the id is used as given. Otherwise a mapped
    /// prefix is resolved exactly as [`IdNormalizer::mapped_prefix_id`] does,
    /// codes that already look like content ids are kept, and anything else is
    /// normalized. Unmapped `prefix00digits` ids try the second template first.
    #[must_use]
    pub fn generate(
        &self,
        normalizer: &IdNormalizer,
        raw: &str,
        pre_normalized: Option<&str>,
    ) -> Vec<String> {
        if pre_normalized.is_none()
            && let Some(mapped) = normalizer.mapped_prefix_id(&clean_id(raw))
        {
            debug!(raw, content_id = %mapped, "Candidate URLs from mapped prefix");
            return self.fill(&mapped);
        }

        let content_id = match pre_normalized {
            Some(id) => id.to_lowercase(),
            None => {
                let lowered = raw.trim().to_lowercase();
                if already_normalized().is_match(&lowered) {
                    lowered
                } else {
                    normalizer.normalize(raw)
                }
            }
        };

        let mut urls = self.fill(&content_id);
        if urls.len() > 1 && unmapped_shape().is_match(&content_id) {
            urls.swap(0, 1);
        }

        debug!(raw, content_id = %content_id, first = ?urls.first(), "Candidate URLs generated");
        urls
    }

    fn fill(&self, content_id: &str) -> Vec<String> {
        self.templates
            .iter()
            .map(|t| t.replacen("{}", content_id, 1))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::catalog_id::IdMappings;

    fn mapped(prefixes: &[(&str, &str)]) -> IdNormalizer {
        IdNormalizer::new(IdMappings::new(
            prefixes
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
            Vec::new(),
        ))
    }

    #[test]
    fn test_unmapped_raw_code_swaps_first_two() {
        let urls = CandidateUrls::default().generate(&IdNormalizer::default(), "ABC-012", None);
        assert_eq!(urls.len(), DETAIL_URL_TEMPLATES.len());
        assert_eq!(
            urls[0],
            "https://www.dmm.co.jp/digital/videoa/-/detail/=/cid=abc00012/"
        );
        assert_eq!(
            urls[1],
            "https://www.dmm.co.jp/mono/dvd/-/detail/=/cid=abc00012/"
        );
        assert!(urls[2..].iter().all(|u| u.contains("cid=abc00012/")));
    }

    #[test]
    fn test_mapped_prefix_keeps_declared_order() {
        let urls = CandidateUrls::default().generate(&mapped(&[("abp", "118abp")]), "ABP-1", None);
        assert_eq!(
            urls[0],
            "https://www.dmm.co.jp/mono/dvd/-/detail/=/cid=118abp001/"
        );
    }

    #[test]
    fn test_already_normalized_code_is_not_renormalized() {
        let urls = CandidateUrls::default().generate(&IdNormalizer::default(), "abc012", None);
        assert!(urls[0].contains("cid=abc012/"));
        assert!(urls[0].contains("mono/dvd"));
    }

    #[test]
    fn test_pre_normalized_skips_mapping() {
        let n = mapped(&[("abc", "zzz")]);
        let urls = CandidateUrls::default().generate(&n, "abc-1", Some("abc00001"));
        assert!(urls[0].contains("digital/videoa"));
        assert!(urls[0].contains("cid=abc00001/"));
    }

    #[test]
    fn test_never_empty() {
        let urls = CandidateUrls::default().generate(&IdNormalizer::default(), "--", None);
        assert_eq!(urls.len(), DETAIL_URL_TEMPLATES.len());
    }

    #[test]
    fn test_empty_template_list_falls_back_to_defaults() {
        let generator = CandidateUrls::new(Vec::new());
        assert_eq!(generator.templates().len(), DETAIL_URL_TEMPLATES.len());
    }
}
