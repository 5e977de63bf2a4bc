//! The `find` command: one end-to-end search.
//!
//! Collaborator failures never abort the search. They are folded into the
//! [`SearchState`] as notices and the remaining data is still reported.
//! Only caller errors (bad amount, currency or origin, unreadable alias file)
//! fail the command.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use remitfind_client::{AdvisorClient, BrandConfigClient, PricingClient};
use remitfind_core::{default_alias_rules, load_alias_rules, AppConfig};
use remitfind_engine::{
    build_advisor_request, build_pricing_request, canonicalize, parse_places, reduce, Action,
    AliasTable, Coordinates, OperationKind, PricingRequest, RequestSequencer, SearchState,
    TransferQuery,
};

#[derive(Debug, Clone)]
pub(crate) struct FindArgs {
    pub lon: f64,
    pub lat: f64,
    pub amount: f64,
    pub from_currency: String,
    pub to_currency: String,
    pub places: PathBuf,
}

/// Build the alias table from the configured YAML file, or the built-in
/// defaults when none is configured.
///
/// # Errors
///
/// Returns an error if the configured file cannot be read or fails validation.
pub(crate) fn alias_table(config: &AppConfig) -> anyhow::Result<AliasTable> {
    let rules = match config.aliases_path.as_deref() {
        Some(path) => load_alias_rules(path)
            .with_context(|| format!("loading alias rules from {}", path.display()))?,
        None => default_alias_rules(),
    };
    Ok(AliasTable::new(rules))
}

/// Run a search and return the final state.
///
/// # Errors
///
/// Returns an error for an invalid transfer query or origin, an unusable
/// alias file, or a service base URL that cannot be parsed.
pub(crate) async fn run_find(config: &AppConfig, args: &FindArgs) -> anyhow::Result<SearchState> {
    let query = TransferQuery::new(args.amount, &args.from_currency, &args.to_currency)?;
    let origin = Coordinates::new(args.lon, args.lat);
    if !origin.is_valid() {
        anyhow::bail!(
            "origin ({}, {}) is not a valid longitude/latitude pair",
            args.lon,
            args.lat
        );
    }

    let pricing = PricingClient::new(
        &config.api_base_url,
        config.request_timeout_secs,
        &config.user_agent,
    )?;
    let advisor = AdvisorClient::new(
        &config.advisor_base_url,
        config.request_timeout_secs,
        &config.user_agent,
    )?;
    let brand_config = config
        .brand_config_url
        .as_deref()
        .map(|url| BrandConfigClient::new(url, config.request_timeout_secs, &config.user_agent))
        .transpose()?;

    let sequencer = RequestSequencer::new();
    let mut state = SearchState::new(alias_table(config)?, config.travel_speed_kmh);
    state = reduce(state, Action::SearchStarted { origin: Some(origin) });

    tracing::info!(
        amount = query.amount,
        from = %query.from_currency,
        to = %query.to_currency,
        "starting search"
    );

    // Places
    let ticket = sequencer.begin(OperationKind::Places);
    state = reduce(state, Action::RequestStarted(ticket));
    state = match read_places(&args.places, origin).await {
        Ok(locations) => reduce(state, Action::LocationsLoaded { ticket, locations }),
        Err(e) => reduce(
            state,
            Action::RequestFailed {
                ticket,
                message: format!("{e:#}"),
            },
        ),
    };

    // Brand configuration and pricing overlap.
    let pricing_request = build_pricing_request(&query, &state.annotated, &state.configured_brands);
    let pricing_ticket = sequencer.begin(OperationKind::Pricing);
    state = reduce(state, Action::RequestStarted(pricing_ticket));
    let config_ticket = brand_config
        .as_ref()
        .map(|_| sequencer.begin(OperationKind::BrandConfig));
    if let Some(ticket) = config_ticket {
        state = reduce(state, Action::RequestStarted(ticket));
    }

    let (priced, fetched_config) = tokio::join!(pricing.quote(&pricing_request), async {
        match &brand_config {
            Some(client) => Some(client.fetch().await),
            None => None,
        }
    });

    if let (Some(ticket), Some(result)) = (config_ticket, fetched_config) {
        state = match result {
            Ok(config) => reduce(state, Action::BrandConfigLoaded { ticket, config }),
            Err(e) => reduce(
                state,
                Action::RequestFailed {
                    ticket,
                    message: e.to_string(),
                },
            ),
        };
    }

    // Brands recognised only through the dynamic aliases were not in the
    // first quote. Re-price under a newer ticket so the first quote is dropped.
    let repricing = build_pricing_request(&query, &state.annotated, &state.configured_brands);
    let (priced, pricing_ticket) = if adds_brands(&pricing_request, &repricing) {
        tracing::info!(
            stores = ?repricing.stores,
            "brand configuration added brands; re-pricing"
        );
        let ticket = sequencer.begin(OperationKind::Pricing);
        state = reduce(state, Action::RequestStarted(ticket));
        (pricing.quote(&repricing).await, ticket)
    } else {
        (priced, pricing_ticket)
    };

    state = match priced {
        Ok(channels) => reduce(
            state,
            Action::ChannelsPriced {
                ticket: pricing_ticket,
                channels,
            },
        ),
        Err(e) => reduce(
            state,
            Action::RequestFailed {
                ticket: pricing_ticket,
                message: format!("pricing unavailable: {e}"),
            },
        ),
    };

    // Advisor, with hints from whatever the earlier stages produced.
    let advisor_request = build_advisor_request(&query, &state.annotated, None);
    let ticket = sequencer.begin(OperationKind::Advisor);
    state = reduce(state, Action::RequestStarted(ticket));
    state = match advisor.optimize(&advisor_request).await {
        Ok(response) => reduce(state, Action::AdvisorResponded { ticket, response }),
        Err(e) => reduce(
            state,
            Action::RequestFailed {
                ticket,
                message: format!("advisor unavailable: {e}"),
            },
        ),
    };

    tracing::info!(
        locations = state.annotated.len(),
        best_brand = state.selection.best_brand.as_deref(),
        best_location_id = state.selection.best_location_id.as_deref(),
        notices = state.notices.len(),
        "search finished"
    );

    Ok(state)
}

/// `true` when `next` names a brand that `sent` did not already price.
fn adds_brands(sent: &PricingRequest, next: &PricingRequest) -> bool {
    let priced: BTreeSet<&str> = sent.stores.iter().filter_map(|s| canonicalize(s)).collect();
    next.stores
        .iter()
        .filter_map(|s| canonicalize(s))
        .any(|key| !priced.contains(key))
}

async fn read_places(
    path: &Path,
    origin: Coordinates,
) -> anyhow::Result<Vec<remitfind_engine::RawLocation>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading places file {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("parsing places file {}", path.display()))?;
    let parsed = parse_places(&value, Some(origin));
    if parsed.skipped > 0 {
        tracing::warn!(
            skipped = parsed.skipped,
            kept = parsed.locations.len(),
            "skipped places without display text or coordinates"
        );
    }
    Ok(parsed.locations)
}

#[cfg(test)]
#[path = "find_test.rs"]
mod tests;
