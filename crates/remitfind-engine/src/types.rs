//! Domain and wire types shared by the engine, the service clients and the CLI.
//!
//! Wire field names follow the services' snake_case. The camelCase spellings
//! are accepted as aliases on input so either flavour of backend decodes.
//!
//! Response bodies are decoded entry by entry (see [`AdvisorResponse::from_value`]
//! and [`parse_pricing_channels`]): a malformed list entry is dropped on its own
//! and never fails the whole response.

use std::collections::BTreeMap;
use std::fmt;

use remitfind_core::AliasRule;
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// `true` when both components are finite and inside their valid ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

/// A point of interest as produced by the places provider for one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLocation {
    pub id: String,
    pub display_text: String,
    #[serde(default)]
    pub address: String,
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// A priced remittance channel returned by the pricing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedChannel {
    #[serde(rename = "name", alias = "brand_name", alias = "brandName")]
    pub brand_name: String,
    pub fee: f64,
    #[serde(alias = "recipientGets")]
    pub recipient_gets: f64,
}

/// A [`RawLocation`] with its detected brand and matching priced channel.
///
/// `detected_brand` is either `None` or a name that canonicalizes;
/// `priced_channel` is only set when a channel of the same brand exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedLocation {
    #[serde(flatten)]
    pub location: RawLocation,
    pub detected_brand: Option<String>,
    pub priced_channel: Option<PricedChannel>,
}

impl AnnotatedLocation {
    /// Brand label used for selection: the priced channel's name, falling
    /// back to the detected brand.
    #[must_use]
    pub fn brand_label(&self) -> Option<&str> {
        self.priced_channel
            .as_ref()
            .map(|c| c.brand_name.as_str())
            .or(self.detected_brand.as_deref())
    }
}

/// One ranked option from the advisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationOption {
    #[serde(rename = "name", alias = "brand_name", alias = "brandName")]
    pub brand_name: String,
    #[serde(alias = "recipientGets")]
    pub recipient_gets: f64,
    #[serde(default)]
    pub fee: f64,
    #[serde(default, alias = "feePercent")]
    pub fee_percent: String,
    #[serde(default, alias = "exchangeRate", skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<f64>,
    #[serde(default, alias = "distanceKm")]
    pub distance_km: Option<f64>,
    #[serde(default, alias = "timeMin")]
    pub time_min: Option<f64>,
}

/// The advisor's structured primary pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorBest {
    pub name: String,
    #[serde(alias = "recipientGets")]
    pub recipient_gets: f64,
    #[serde(default, alias = "distanceKm")]
    pub distance_km: Option<f64>,
    #[serde(default, alias = "timeMin")]
    pub time_min: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingRequest {
    pub amount: f64,
    pub from_currency: String,
    pub to_currency: String,
    pub stores: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisorRequest {
    pub amount: f64,
    pub from_currency: String,
    pub to_currency: String,
    pub competitor_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_brands: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_distances_km: Option<BTreeMap<String, f64>>,
}

/// Advisor reply after lenient decoding.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AdvisorResponse {
    pub best: Option<AdvisorBest>,
    pub currency: Option<String>,
    pub market_rate: Option<f64>,
    pub our_rate: Option<f64>,
    pub options: Vec<RecommendationOption>,
    pub recommendation: Option<String>,
}

impl AdvisorResponse {
    /// Decode an advisor body field by field.
    ///
    /// Returns `None` only when `value` is not a JSON object. A malformed
    /// `best` is treated as absent; malformed options are skipped.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let best = obj
            .get("best")
            .filter(|v| !v.is_null())
            .and_then(|v| decode_one::<AdvisorBest>(v, "advisor best pick"));

        Some(Self {
            best,
            currency: string_field(obj, &["currency"]),
            market_rate: number_field(obj, &["market_rate", "marketRate"]),
            our_rate: number_field(obj, &["our_rate", "ourRate"]),
            options: decode_entries(obj.get("options"), "advisor option"),
            recommendation: string_field(obj, &["recommendation"]),
        })
    }
}

/// Decode the `channels` list of a pricing response.
///
/// Returns `None` when `value` is not an object; a missing `channels` key
/// yields an empty list.
#[must_use]
pub fn parse_pricing_channels(value: &Value) -> Option<Vec<PricedChannel>> {
    let obj = value.as_object()?;
    let channels: Vec<PricedChannel> = decode_entries(obj.get("channels"), "priced channel");
    Some(
        channels
            .into_iter()
            .filter(|c| !c.brand_name.trim().is_empty() && c.recipient_gets.is_finite())
            .collect(),
    )
}

/// Brand recognition overrides served by the brand-configuration service.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct BrandConfigOverride {
    #[serde(default)]
    pub brands: Vec<String>,
    /// Substring → display brand, in document order.
    #[serde(default, deserialize_with = "deserialize_ordered_aliases")]
    pub aliases: Vec<AliasRule>,
    #[serde(default, rename = "searchTerms", alias = "search_terms")]
    pub search_terms: Vec<String>,
}

impl BrandConfigOverride {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brands.is_empty() && self.aliases.is_empty()
    }
}

/// Deserialize a `{substring: brand}` object into rules, keeping the order
/// the entries appear in the document.
fn deserialize_ordered_aliases<'de, D>(deserializer: D) -> Result<Vec<AliasRule>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedAliases;

    impl<'de> Visitor<'de> for OrderedAliases {
        type Value = Vec<AliasRule>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of substring to brand name")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut rules = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((needle, brand)) = map.next_entry::<String, String>()? {
                rules.push(AliasRule {
                    match_substring: needle,
                    canonical_brand: brand,
                });
            }
            Ok(rules)
        }
    }

    deserializer.deserialize_any(OrderedAliases)
}

fn decode_one<T: DeserializeOwned>(value: &Value, what: &str) -> Option<T> {
    match T::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring malformed {what}");
            None
        }
    }
}

fn decode_entries<T: DeserializeOwned>(value: Option<&Value>, what: &str) -> Vec<T> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match T::deserialize(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::debug!(index, error = %e, "skipping malformed {what}");
                None
            }
        })
        .collect()
}

fn string_field(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn number_field(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_f64))
}
