//! Catalog code normalization.
//!
//! Users type codes like `ABC-012` or `abc 12`; the detail site expects its
//! own content id (`abc00012`, `118abc012`, ...). The rewrite is driven by two
//! user-editable tables: prefix -> target prefix, and prefix -> literal
//! suffix appended after the number.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::debug;

/// Minimum width of the numeric part. Longer runs are never truncated.
const MIN_NUMBER_WIDTH: usize = 3;

/// Separator the detail site puts between an unmapped prefix and the number.
const UNMAPPED_SEPARATOR: &str = "00";

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

fn letters_digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"^(?P<prefix>[a-z]+)(?P<number>\d+)$")
}

/// Anything with a `digits letters digits` run is already a content id.
fn content_id_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"\d+[a-z]+\d+")
}

fn with_tail() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(
        &RE,
        r"^(?P<lead>\d*)(?P<letters>[a-z]+)(?P<number>\d+)(?P<tail>.*)$",
    )
}

fn leading_digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"^\d+")
}

/// The two mapping tables backing the normalizer.
///
/// Keys are matched against the lowercased, cleaned code, so they are stored
/// lowercase. Values are opaque and keep their original case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdMappings {
    #[serde(default)]
    pub prefixes: BTreeMap<String, String>,
    #[serde(default)]
    pub suffixes: BTreeMap<String, String>,
}

impl IdMappings {
    pub fn new(
        prefixes: impl IntoIterator<Item = (String, String)>,
        suffixes: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
                .filter(|(k, v)| !k.is_empty() && !v.is_empty())
                .collect(),
            suffixes: suffixes
                .into_iter()
                .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
                .filter(|(k, _)| !k.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.suffixes.is_empty()
    }

    fn suffix_for(&self, prefix: &str) -> &str {
        self.suffixes.get(prefix).map_or("", String::as_str)
    }
}

/// Rewrites user-entered catalog codes into the detail site's content id.
#[derive(Debug, Clone, Default)]
pub struct IdNormalizer {
    mappings: IdMappings,
}

impl IdNormalizer {
    #[must_use]
    pub const fn new(mappings: IdMappings) -> Self {
        Self { mappings }
    }

    #[must_use]
    pub const fn mappings(&self) -> &IdMappings {
        &self.mappings
    }

    pub fn set_mappings(&mut self, mappings: IdMappings) {
        self.mappings = mappings;
    }

    /// Normalize a raw code. Never fails: codes that fit no known shape come
    /// back lowercased with separators stripped.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> String {
        let cleaned = clean_id(raw);

        // Mapped prefixes win over the generic split: some mapped prefixes
        // would otherwise be cut in the wrong place.
        if let Some(mapped) = self.mapped_prefix_id(&cleaned) {
            return mapped;
        }

        if let Some(caps) = letters_digits().captures(&cleaned) {
            let prefix = &caps["prefix"];
            let number = pad_number(&caps["number"]);
            let suffix = self.mappings.suffix_for(prefix);

            let result = match self.mappings.prefixes.get(prefix) {
                Some(target) => format!("{target}{number}{suffix}"),
                None => format!("{prefix}{UNMAPPED_SEPARATOR}{number}{suffix}"),
            };
            debug!(raw, normalized = %result, "Normalized catalog id");
            return result;
        }

        if content_id_shape().is_match(&cleaned) {
            debug!(raw, normalized = %cleaned, "Catalog id already in content id form");
            return cleaned;
        }

        // Codes with trailing text: insert the separator unless one is
        // already present anywhere in the code.
        if let Some(caps) = with_tail().captures(&cleaned)
            && !cleaned.contains(UNMAPPED_SEPARATOR)
        {
            let result = format!(
                "{}{}{UNMAPPED_SEPARATOR}{}{}",
                &caps["lead"],
                &caps["letters"],
                pad_number(&caps["number"]),
                &caps["tail"]
            );
            debug!(raw, normalized = %result, "Normalized catalog id with trailing text");
            return result;
        }

        debug!(raw, "Catalog id fits no known shape, using cleaned form");
        cleaned
    }

    /// The mapped-prefix rewrite on its own: `Some` only when the cleaned code
    /// starts with a mapped prefix that is immediately followed by digits.
    ///
    /// Shared with the candidate URL generator so both call sites agree.
    #[must_use]
    pub fn mapped_prefix_id(&self, cleaned: &str) -> Option<String> {
        self.mappings.prefixes.iter().find_map(|(prefix, target)| {
            let rest = cleaned.strip_prefix(prefix.as_str())?;
            let digits = leading_digits().find(rest)?;
            let suffix = self.mappings.suffix_for(prefix);
            let result = format!("{target}{}{suffix}", pad_number(digits.as_str()));
            debug!(prefix = %prefix, target = %target, normalized = %result, "Applied prefix mapping");
            Some(result)
        })
    }
}

/// Lowercase and strip everything outside `[a-z0-9]`.
#[must_use]
pub fn clean_id(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Zero-pad to at least three digits.
#[must_use]
pub fn pad_number(number: &str) -> String {
    format!("{number:0>width$}", width = MIN_NUMBER_WIDTH)
}
