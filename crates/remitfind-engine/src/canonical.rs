//! Brand canonicalization: any free-form brand or channel label to one of a
//! fixed set of lower-case keys used internally for matching.

/// Synonym → canonical key. Order matters: the first synonym found in the
/// label wins, so the short `ria` needle is tested last.
const SYNONYMS: &[(&str, &str)] = &[
    ("western union", "western union"),
    ("moneygram", "moneygram"),
    ("money gram", "moneygram"),
    ("remitly", "remitly"),
    ("transferwise", "wise"),
    ("wise", "wise"),
    ("worldremit", "worldremit"),
    ("world remit", "worldremit"),
    ("xoom", "xoom"),
    ("ozforex", "ofx"),
    ("ofx", "ofx"),
    ("small world", "small world"),
    ("walmart2walmart", "walmart2walmart"),
    ("walmart 2 walmart", "walmart2walmart"),
    ("finance connect", "finance connect"),
    ("ria", "ria"),
];

/// Canonical keys in the order they are first produced by [`SYNONYMS`].
pub const CANONICAL_BRANDS: &[&str] = &[
    "western union",
    "moneygram",
    "remitly",
    "wise",
    "worldremit",
    "xoom",
    "ofx",
    "small world",
    "walmart2walmart",
    "finance connect",
    "ria",
];

/// Map a label to its canonical brand key.
///
/// Case-insensitive substring test against the synonym table; the first
/// synonym contained in the label wins. Blank or unrecognised labels yield
/// `None`.
#[must_use]
pub fn canonicalize(label: &str) -> Option<&'static str> {
    let lowered = label.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    SYNONYMS
        .iter()
        .find(|(synonym, _)| lowered.contains(synonym))
        .map(|&(_, key)| key)
}
