//! Pairs places with priced channels by brand.

use crate::canonical::canonicalize;
use crate::resolve::AliasTable;
use crate::types::{AnnotatedLocation, PricedChannel, RawLocation};

/// Annotate every location with its detected brand and matching priced channel.
///
/// The output has the same length and order as `locations`; nothing is
/// dropped. A resolved brand that does not canonicalize is discarded so that
/// `detected_brand` is always either `None` or a recognised brand.
#[must_use]
pub fn annotate_locations(
    locations: &[RawLocation],
    channels: &[PricedChannel],
    aliases: &AliasTable,
) -> Vec<AnnotatedLocation> {
    locations
        .iter()
        .map(|location| {
            let label = location_label(location);
            let detected_brand = aliases
                .resolve(&label)
                .filter(|brand| {
                    let recognised = canonicalize(brand).is_some();
                    if !recognised {
                        tracing::debug!(
                            location_id = %location.id,
                            brand,
                            "alias resolved to an unrecognised brand; ignoring"
                        );
                    }
                    recognised
                })
                .map(str::to_string);

            let priced_channel = detected_brand
                .as_deref()
                .and_then(|brand| find_channel(brand, channels))
                .cloned();

            AnnotatedLocation {
                location: location.clone(),
                detected_brand,
                priced_channel,
            }
        })
        .collect()
}

/// Text the alias rules are matched against.
fn location_label(location: &RawLocation) -> String {
    format!("{} {}", location.display_text, location.address)
}

/// Find the priced channel for `brand`: an exact (trimmed, ASCII
/// case-insensitive) name match first, otherwise the first channel with the
/// same canonical key.
fn find_channel<'a>(brand: &str, channels: &'a [PricedChannel]) -> Option<&'a PricedChannel> {
    let wanted = brand.trim();
    if let Some(exact) = channels
        .iter()
        .find(|c| c.brand_name.trim().eq_ignore_ascii_case(wanted))
    {
        return Some(exact);
    }
    let key = canonicalize(wanted)?;
    channels
        .iter()
        .find(|c| canonicalize(&c.brand_name) == Some(key))
}
