use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One substring → brand rule. Rule lists are ordered; the first match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRule {
    /// Substring searched for (case-insensitively) in a location label.
    #[serde(rename = "match")]
    pub match_substring: String,
    /// Display brand name produced when the rule matches.
    #[serde(rename = "brand")]
    pub canonical_brand: String,
}

impl AliasRule {
    #[must_use]
    pub fn new(match_substring: &str, canonical_brand: &str) -> Self {
        Self {
            match_substring: match_substring.to_string(),
            canonical_brand: canonical_brand.to_string(),
        }
    }

    /// Returns `true` when this rule's substring occurs in `lowered_label`.
    ///
    /// `lowered_label` must already be lower-cased. Blank substrings never match.
    #[must_use]
    pub fn matches_lowered(&self, lowered_label: &str) -> bool {
        let needle = self.match_substring.trim().to_lowercase();
        !needle.is_empty() && lowered_label.contains(&needle)
    }
}

#[derive(Debug, Deserialize)]
pub struct AliasRulesFile {
    pub rules: Vec<AliasRule>,
}

/// Built-in static rule table used when no override file or brand-config
/// response is available.
#[must_use]
pub fn default_alias_rules() -> Vec<AliasRule> {
    [
        ("western union", "Western Union"),
        ("moneygram", "MoneyGram"),
        ("money gram", "MoneyGram"),
        ("remitly", "Remitly"),
        ("transferwise", "Wise"),
        ("wise", "Wise"),
        ("worldremit", "WorldRemit"),
        ("world remit", "WorldRemit"),
        ("xoom", "Xoom"),
        ("ozforex", "OFX"),
        ("ofx", "OFX"),
        ("small world", "Small World"),
        ("walmart2walmart", "Walmart2Walmart"),
        ("walmart 2 walmart", "Walmart2Walmart"),
        ("finance connect", "Finance Connect"),
        ("ria", "Ria"),
    ]
    .into_iter()
    .map(|(needle, brand)| AliasRule::new(needle, brand))
    .collect()
}

/// Load and validate an alias rule table from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_alias_rules(path: &Path) -> Result<Vec<AliasRule>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::AliasFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: AliasRulesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::AliasFileParse)?;

    validate_alias_rules(&file.rules)?;

    Ok(file.rules)
}

fn validate_alias_rules(rules: &[AliasRule]) -> Result<(), ConfigError> {
    if rules.is_empty() {
        return Err(ConfigError::Validation(
            "alias rules file must contain at least one rule".to_string(),
        ));
    }

    let mut seen = HashSet::new();

    for rule in rules {
        if rule.match_substring.trim().is_empty() {
            return Err(ConfigError::Validation(
                "alias rule match substring must be non-empty".to_string(),
            ));
        }

        if rule.canonical_brand.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "alias rule '{}' has an empty brand",
                rule.match_substring
            )));
        }

        let lowered = rule.match_substring.trim().to_lowercase();
        if !seen.insert(lowered) {
            return Err(ConfigError::Validation(format!(
                "duplicate alias substring: '{}'",
                rule.match_substring
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "aliases_test.rs"]
mod tests;
