//! Advisor request construction and reconciliation of the advisor's reply
//! with locally derived brand and distance context.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

use crate::canonical::canonicalize;
use crate::distance::estimate_travel_minutes;
use crate::error::EngineError;
use crate::selector::{select_nearest, SelectionResult};
use crate::types::{
    AdvisorRequest, AdvisorResponse, AnnotatedLocation, PricingRequest, RecommendationOption,
};

/// A validated amount and currency pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferQuery {
    pub amount: f64,
    pub from_currency: String,
    pub to_currency: String,
}

impl TransferQuery {
    /// Validate and normalise a transfer query.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidAmount`] unless `amount` is finite and
    /// greater than zero, and [`EngineError::InvalidCurrency`] unless both
    /// codes are three ASCII letters.
    pub fn new(amount: f64, from_currency: &str, to_currency: &str) -> Result<Self, EngineError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(EngineError::InvalidAmount(amount));
        }
        Ok(Self {
            amount,
            from_currency: normalize_currency(from_currency)?,
            to_currency: normalize_currency(to_currency)?,
        })
    }
}

fn normalize_currency(code: &str) -> Result<String, EngineError> {
    let trimmed = code.trim();
    if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(trimmed.to_ascii_uppercase())
    } else {
        Err(EngineError::InvalidCurrency(code.to_string()))
    }
}

/// Brand and proximity context sent to the advisor.
///
/// Brands are grouped by canonical key but named by display label, the
/// priced channel's name when there is one, so the advisor can match them
/// against its own channel names.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AdvisorHints {
    /// Display names of brands with at least one location, in canonical order.
    pub available_brands: Vec<String>,
    /// Minimum known distance per brand, keyed by display name.
    pub brand_distances_km: BTreeMap<String, f64>,
}

impl AdvisorHints {
    /// Distance hint for `brand`, matched by canonical key.
    #[must_use]
    pub fn distance_for(&self, brand: &str) -> Option<f64> {
        let key = canonicalize(brand)?;
        self.brand_distances_km
            .iter()
            .find(|(name, _)| canonicalize(name) == Some(key))
            .map(|(_, distance)| *distance)
    }
}

/// Derive the present-brand set and per-brand minimum distance from the
/// annotated locations. Each canonical brand keeps the first label seen.
/// Locations without a finite distance contribute to the brand set only.
#[must_use]
pub fn derive_hints(annotated: &[AnnotatedLocation]) -> AdvisorHints {
    let mut groups: BTreeMap<&'static str, (&str, Option<f64>)> = BTreeMap::new();

    for location in annotated {
        let Some(label) = location.brand_label() else {
            continue;
        };
        let Some(key) = canonicalize(label) else {
            continue;
        };
        let distance = location.location.distance_km.filter(|d| d.is_finite());
        let (_, nearest) = groups.entry(key).or_insert((label, None));
        *nearest = match (*nearest, distance) {
            (Some(current), Some(d)) => Some(current.min(d)),
            (current, d) => current.or(d),
        };
    }

    let mut hints = AdvisorHints::default();
    for (label, nearest) in groups.into_values() {
        hints.available_brands.push(label.to_string());
        if let Some(distance) = nearest {
            hints.brand_distances_km.insert(label.to_string(), distance);
        }
    }
    hints
}

/// Advisor request for `query`, carrying hints derived from `annotated`.
/// Empty hints are omitted from the request entirely.
#[must_use]
pub fn build_advisor_request(
    query: &TransferQuery,
    annotated: &[AnnotatedLocation],
    competitor_data: Option<Value>,
) -> AdvisorRequest {
    let hints = derive_hints(annotated);
    let brand_distances_km =
        (!hints.brand_distances_km.is_empty()).then_some(hints.brand_distances_km);
    let available_brands = (!hints.available_brands.is_empty()).then_some(hints.available_brands);

    AdvisorRequest {
        amount: query.amount,
        from_currency: query.from_currency.clone(),
        to_currency: query.to_currency.clone(),
        competitor_data,
        available_brands,
        brand_distances_km,
    }
}

/// Pricing request for `query`. The stores are the distinct display brands
/// detected among `annotated` in first-seen order, or `configured_brands`
/// when no location carries a brand.
#[must_use]
pub fn build_pricing_request(
    query: &TransferQuery,
    annotated: &[AnnotatedLocation],
    configured_brands: &[String],
) -> PricingRequest {
    let mut stores: Vec<String> = Vec::new();
    let mut seen: BTreeSet<&'static str> = BTreeSet::new();
    for location in annotated {
        let Some(brand) = location.detected_brand.as_deref() else {
            continue;
        };
        if let Some(key) = canonicalize(brand) {
            if seen.insert(key) {
                stores.push(brand.to_string());
            }
        }
    }
    if stores.is_empty() {
        stores = configured_brands.to_vec();
    }

    PricingRequest {
        amount: query.amount,
        from_currency: query.from_currency.clone(),
        to_currency: query.to_currency.clone(),
        stores,
    }
}

/// Structured advisor pick adopted as the current recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredRecommendation {
    pub best_brand: String,
    pub currency: String,
    pub market_rate: Option<f64>,
    pub our_rate: Option<f64>,
    pub options: Vec<RecommendationOption>,
    pub text: Option<String>,
}

/// The outcome of an advisor call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    Structured(StructuredRecommendation),
    /// Text only: no brand to highlight and no options.
    Degraded { text: Option<String> },
}

impl Recommendation {
    #[must_use]
    pub fn best_brand(&self) -> Option<&str> {
        match self {
            Self::Structured(s) => Some(s.best_brand.as_str()),
            Self::Degraded { .. } => None,
        }
    }

    #[must_use]
    pub fn options(&self) -> &[RecommendationOption] {
        match self {
            Self::Structured(s) => &s.options,
            Self::Degraded { .. } => &[],
        }
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Structured(s) => s.text.as_deref(),
            Self::Degraded { text } => text.as_deref(),
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Turn an advisor reply into a [`Recommendation`].
///
/// The reply is structured only when it has both a `best` pick and a
/// currency. Options without a travel time whose brand appears in
/// `hints.brand_distances_km` get the distance and estimated time filled in.
#[must_use]
pub fn reconcile(
    response: &AdvisorResponse,
    hints: &AdvisorHints,
    travel_speed_kmh: f64,
) -> Recommendation {
    let (Some(best), Some(currency)) = (response.best.as_ref(), response.currency.as_ref()) else {
        tracing::debug!(
            has_best = response.best.is_some(),
            has_currency = response.currency.is_some(),
            "advisor reply is text only"
        );
        return Recommendation::Degraded {
            text: response.recommendation.clone(),
        };
    };

    let options = response
        .options
        .iter()
        .map(|option| fill_travel(option, hints, travel_speed_kmh))
        .collect();

    Recommendation::Structured(StructuredRecommendation {
        best_brand: best.name.clone(),
        currency: currency.clone(),
        market_rate: response.market_rate,
        our_rate: response.our_rate,
        options,
        text: response.recommendation.clone(),
    })
}

fn fill_travel(
    option: &RecommendationOption,
    hints: &AdvisorHints,
    travel_speed_kmh: f64,
) -> RecommendationOption {
    let mut filled = option.clone();
    if filled.time_min.is_some() {
        return filled;
    }
    let Some(hint) = hints.distance_for(&option.brand_name) else {
        return filled;
    };
    let distance = filled.distance_km.filter(|d| d.is_finite()).unwrap_or(hint);
    filled.distance_km = Some(distance);
    filled.time_min = estimate_travel_minutes(distance, travel_speed_kmh);
    filled
}

/// Reconcile an advisor reply and select the location to highlight.
///
/// A degraded reply never highlights a location.
#[must_use]
pub fn fuse(
    response: &AdvisorResponse,
    annotated: &[AnnotatedLocation],
    hints: &AdvisorHints,
    travel_speed_kmh: f64,
) -> (Recommendation, SelectionResult) {
    let recommendation = reconcile(response, hints, travel_speed_kmh);
    let selection = match &recommendation {
        Recommendation::Structured(s) => {
            select_nearest(Some(s.best_brand.as_str()), annotated, &s.options)
        }
        Recommendation::Degraded { .. } => SelectionResult::default(),
    };
    (recommendation, selection)
}

#[cfg(test)]
#[path = "fusion_test.rs"]
mod tests;
