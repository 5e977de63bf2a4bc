//! Brand-from-label resolution against the alias rule table.

use remitfind_core::{default_alias_rules, AliasRule};

/// Ordered alias rules: operator-supplied dynamic rules first, then the
/// static fallback table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    dynamic: Vec<AliasRule>,
    fallback: Vec<AliasRule>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::new(default_alias_rules())
    }
}

impl AliasTable {
    /// Table with the given static fallback rules and no dynamic rules.
    #[must_use]
    pub fn new(fallback: Vec<AliasRule>) -> Self {
        Self {
            dynamic: Vec::new(),
            fallback,
        }
    }

    #[must_use]
    pub fn with_dynamic(mut self, dynamic: Vec<AliasRule>) -> Self {
        self.dynamic = dynamic;
        self
    }

    /// Replace the dynamic rules, leaving the static fallback untouched.
    pub fn set_dynamic(&mut self, dynamic: Vec<AliasRule>) {
        self.dynamic = dynamic;
    }

    #[must_use]
    pub fn dynamic(&self) -> &[AliasRule] {
        &self.dynamic
    }

    #[must_use]
    pub fn fallback(&self) -> &[AliasRule] {
        &self.fallback
    }

    /// Resolve a label to a display brand name. See [`resolve_brand`].
    #[must_use]
    pub fn resolve(&self, label: &str) -> Option<&str> {
        resolve_brand(label, &self.dynamic, &self.fallback)
    }

    /// Distinct display brand names known to the table, dynamic rules first,
    /// in first-seen order.
    #[must_use]
    pub fn known_brands(&self) -> Vec<String> {
        let mut brands: Vec<String> = Vec::new();
        for rule in self.dynamic.iter().chain(&self.fallback) {
            let brand = rule.canonical_brand.trim();
            if !brand.is_empty() && !brands.iter().any(|b| b.eq_ignore_ascii_case(brand)) {
                brands.push(brand.to_string());
            }
        }
        brands
    }
}

/// Resolve the display brand for a free-form label.
///
/// Dynamic rules are tested first in order, then the static fallback rules in
/// declared order; the first rule whose substring occurs in the label
/// (case-insensitively) wins.
#[must_use]
pub fn resolve_brand<'a>(
    label: &str,
    dynamic: &'a [AliasRule],
    fallback: &'a [AliasRule],
) -> Option<&'a str> {
    let lowered = label.to_lowercase();
    dynamic
        .iter()
        .chain(fallback)
        .find(|rule| rule.matches_lowered(&lowered))
        .map(|rule| rule.canonical_brand.as_str())
}
