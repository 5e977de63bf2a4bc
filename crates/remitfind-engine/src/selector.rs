//! Nearest-channel selection with a single fallback substitution.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::canonical::canonicalize;
use crate::types::{AnnotatedLocation, RecommendationOption};

/// Which brand to highlight and which location represents it on the map.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SelectionResult {
    pub best_brand: Option<String>,
    pub best_location_id: Option<String>,
    /// The originally recommended brand when a fallback brand was substituted.
    pub fallback_from: Option<String>,
}

/// Select the nearest location for `best_brand`, substituting the
/// best-paying physically present brand from `options` when the recommended
/// brand has no location.
///
/// Fallback is attempted at most once.
#[must_use]
pub fn select_nearest(
    best_brand: Option<&str>,
    annotated: &[AnnotatedLocation],
    options: &[RecommendationOption],
) -> SelectionResult {
    let tried = best_brand.and_then(canonicalize);

    if let Some(key) = tried {
        if let Some(location) = nearest_for(key, annotated) {
            return SelectionResult {
                best_brand: best_brand.map(str::to_string),
                best_location_id: Some(location.location.id.clone()),
                fallback_from: None,
            };
        }
    }

    let unmatched = SelectionResult {
        best_brand: best_brand.map(str::to_string),
        best_location_id: None,
        fallback_from: None,
    };

    if options.is_empty() {
        return unmatched;
    }

    let present = present_brands(annotated);
    let Some((fallback, key)) = best_present_option(options, &present, tried) else {
        tracing::debug!(
            best_brand,
            "no physically present fallback brand among advisor options"
        );
        return unmatched;
    };

    match nearest_for(key, annotated) {
        Some(location) => {
            tracing::debug!(
                best_brand,
                fallback = %fallback.brand_name,
                location_id = %location.location.id,
                "substituted nearest present brand"
            );
            SelectionResult {
                best_brand: Some(fallback.brand_name.clone()),
                best_location_id: Some(location.location.id.clone()),
                fallback_from: best_brand.map(str::to_string),
            }
        }
        None => unmatched,
    }
}

/// Canonical brand key of a location, from its priced channel or detected brand.
#[must_use]
pub fn location_brand_key(location: &AnnotatedLocation) -> Option<&'static str> {
    location.brand_label().and_then(canonicalize)
}

/// Canonical brands that have at least one location in `annotated`.
#[must_use]
pub fn present_brands(annotated: &[AnnotatedLocation]) -> BTreeSet<&'static str> {
    annotated.iter().filter_map(location_brand_key).collect()
}

/// Location of brand `key` with the smallest distance. A missing distance
/// counts as infinitely far; ties keep the earliest location.
fn nearest_for<'a>(key: &str, annotated: &'a [AnnotatedLocation]) -> Option<&'a AnnotatedLocation> {
    let mut best: Option<(&AnnotatedLocation, f64)> = None;
    for location in annotated {
        if location_brand_key(location) != Some(key) {
            continue;
        }
        let distance = location
            .location
            .distance_km
            .filter(|d| d.is_finite())
            .unwrap_or(f64::INFINITY);
        match best {
            Some((_, current)) if distance >= current => {}
            _ => best = Some((location, distance)),
        }
    }
    best.map(|(location, _)| location)
}

/// Highest-paying option whose brand is present and differs from `tried`.
fn best_present_option<'a>(
    options: &'a [RecommendationOption],
    present: &BTreeSet<&'static str>,
    tried: Option<&'static str>,
) -> Option<(&'a RecommendationOption, &'static str)> {
    let mut ranked: Vec<&RecommendationOption> = options.iter().collect();
    // Stable sort: equal payouts keep advisor order; non-finite payouts sink.
    ranked.sort_by(|a, b| rank_value(b.recipient_gets).total_cmp(&rank_value(a.recipient_gets)));

    ranked.into_iter().find_map(|option| {
        let key = canonicalize(&option.brand_name)?;
        (present.contains(key) && Some(key) != tried).then_some((option, key))
    })
}

fn rank_value(recipient_gets: f64) -> f64 {
    if recipient_gets.is_finite() {
        recipient_gets
    } else {
        f64::NEG_INFINITY
    }
}

#[cfg(test)]
#[path = "selector_test.rs"]
mod tests;
