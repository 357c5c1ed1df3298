//! Input normalization for state and free-text query
//!
//! Pure functions of their input; the state/FIPS tables are injected
//! configuration rather than module globals, so adding states means
//! extending [`StateLookup`], not editing the normalizer.

use std::collections::{HashMap, HashSet};

/// Outcome of state normalization.
///
/// `code` is the uppercased 2-letter code (or the uppercased raw input if
/// unknown); `fips_prefix` is the 2-digit state FIPS prefix when the code
/// resolves through the lookup table. An unknown code keeps `code` set so
/// candidate selection can fall back to a substring match against the
/// stored state column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateFilter {
    pub code: Option<String>,
    pub fips_prefix: Option<String>,
}

/// State code / FIPS / stop-word tables.
#[derive(Debug, Clone)]
pub struct StateLookup {
    code_to_fips: HashMap<String, String>,
    name_to_code: HashMap<String, String>,
    state_words: HashSet<String>,
    noise_words: HashSet<String>,
}

impl Default for StateLookup {
    /// The shipped dataset covers Virginia only; expand as states are added.
    fn default() -> Self {
        let mut lookup = Self {
            code_to_fips: HashMap::new(),
            name_to_code: HashMap::new(),
            state_words: HashSet::new(),
            noise_words: ["county", "city", "parish", "borough", "va", "virginia"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        };
        lookup.add_state("VA", "virginia", "51");
        lookup
    }
}

impl StateLookup {
    pub fn add_state(&mut self, code: &str, full_name: &str, fips_prefix: &str) {
        self.code_to_fips
            .insert(code.to_string(), fips_prefix.to_string());
        self.name_to_code
            .insert(full_name.to_string(), code.to_string());
        self.state_words.insert(full_name.to_string());
        self.state_words.insert(code.to_lowercase());
    }

    /// Normalize a raw state input: 2-character values are treated as a
    /// state code, full names resolve through the name table, anything
    /// else is uppercased with no FIPS prefix.
    pub fn normalize_state(&self, raw: &str) -> StateFilter {
        let s = raw.trim();
        if s.is_empty() {
            return StateFilter::default();
        }
        if s.chars().count() == 2 {
            let code = s.to_uppercase();
            let fips_prefix = self.code_to_fips.get(&code).cloned();
            return StateFilter {
                code: Some(code),
                fips_prefix,
            };
        }
        let name = s.to_lowercase();
        if let Some(code) = self.name_to_code.get(&name) {
            return StateFilter {
                code: Some(code.clone()),
                fips_prefix: self.code_to_fips.get(code).cloned(),
            };
        }
        StateFilter {
            code: Some(s.to_uppercase()),
            fips_prefix: None,
        }
    }

    /// Normalize a free-text query: 'Charlotte, Virginia' -> 'charlotte'.
    ///
    /// Lowercases, splits on commas/slashes, drops a trailing state-word
    /// segment, then drops noise tokens ("county", "city", ...). May
    /// return an empty string, in which case no name filter applies.
    pub fn normalize_query(&self, raw: &str) -> String {
        let s = raw.trim().to_lowercase();
        if s.is_empty() {
            return String::new();
        }

        let mut segments: Vec<&str> = s
            .split([',', '/'])
            .map(str::trim)
            .filter(|seg| !seg.is_empty())
            .collect();
        if let Some(last) = segments.last() {
            if self.state_words.contains(*last) {
                segments.pop();
            }
        }

        segments
            .join(" ")
            .split_whitespace()
            .filter(|token| !self.noise_words.contains(*token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_code_and_full_name_normalize_the_same() {
        let lookup = StateLookup::default();

        let from_code = lookup.normalize_state("VA");
        let from_name = lookup.normalize_state("Virginia");
        let from_lower = lookup.normalize_state("virginia");

        assert_eq!(from_code.code.as_deref(), Some("VA"));
        assert_eq!(from_code.fips_prefix.as_deref(), Some("51"));
        assert_eq!(from_code, from_name);
        assert_eq!(from_code, from_lower);
    }

    #[test]
    fn unknown_state_keeps_code_without_prefix() {
        let lookup = StateLookup::default();

        let two_letter = lookup.normalize_state("md");
        assert_eq!(two_letter.code.as_deref(), Some("MD"));
        assert_eq!(two_letter.fips_prefix, None);

        let full = lookup.normalize_state("Maryland");
        assert_eq!(full.code.as_deref(), Some("MARYLAND"));
        assert_eq!(full.fips_prefix, None);
    }

    #[test]
    fn empty_state_yields_no_filter() {
        let lookup = StateLookup::default();
        assert_eq!(lookup.normalize_state(""), StateFilter::default());
        assert_eq!(lookup.normalize_state("   "), StateFilter::default());
    }

    #[test]
    fn query_strips_state_suffix_and_noise_words() {
        let lookup = StateLookup::default();

        assert_eq!(lookup.normalize_query("Charlotte, Virginia"), "charlotte");
        assert_eq!(lookup.normalize_query("Charlotte County, VA"), "charlotte");
        assert_eq!(lookup.normalize_query("charlotte"), "charlotte");
    }

    #[test]
    fn query_keeps_multi_token_names() {
        let lookup = StateLookup::default();
        assert_eq!(
            lookup.normalize_query("Prince William County / VA"),
            "prince william"
        );
    }

    #[test]
    fn query_of_only_noise_words_is_empty() {
        let lookup = StateLookup::default();
        assert_eq!(lookup.normalize_query("Virginia"), "");
        assert_eq!(lookup.normalize_query("county, va"), "");
        assert_eq!(lookup.normalize_query(""), "");
    }
}
