//! Rendering of a finished search to stdout.

use remitfind_engine::{
    AnnotatedLocation, Notice, Recommendation, RecommendationOption, SearchState, SelectionResult,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct Report<'a> {
    pub selection: &'a SelectionResult,
    pub recommendation: Option<&'a Recommendation>,
    pub locations: &'a [AnnotatedLocation],
    pub notices: &'a [Notice],
}

impl<'a> Report<'a> {
    pub(crate) fn from_state(state: &'a SearchState) -> Self {
        Self {
            selection: &state.selection,
            recommendation: state.recommendation.as_ref(),
            locations: &state.annotated,
            notices: &state.notices,
        }
    }
}

/// # Errors
///
/// Returns an error if the report cannot be serialized.
pub(crate) fn print_json(state: &SearchState) -> anyhow::Result<()> {
    let report = Report::from_state(state);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(crate) fn print_table(state: &SearchState) {
    for notice in &state.notices {
        eprintln!("warning: {}", notice.message);
    }

    match state.recommendation.as_ref() {
        Some(Recommendation::Structured(s)) => {
            println!("Recommended: {} ({})", s.best_brand, s.currency);
            if let (Some(market), Some(ours)) = (s.market_rate, s.our_rate) {
                println!("Market rate: {market:.4}   Our rate: {ours:.4}");
            }
        }
        Some(Recommendation::Degraded { .. }) => println!("Recommended: no structured pick"),
        None => println!("Recommended: unavailable"),
    }

    let selection = &state.selection;
    if let Some(from) = selection.fallback_from.as_deref() {
        println!(
            "No {from} location nearby; using {}",
            selection.best_brand.as_deref().unwrap_or("-")
        );
    }
    match selected_location(state) {
        Some(location) => println!(
            "Nearest location: {} ({}) {}",
            location.location.display_text,
            fmt_km(location.location.distance_km),
            location.location.address
        ),
        None => println!("Nearest location: none found"),
    }

    if let Some(text) = state.recommendation.as_ref().and_then(Recommendation::text) {
        println!();
        println!("{text}");
    }

    let options = state
        .recommendation
        .as_ref()
        .map(Recommendation::options)
        .unwrap_or_default();
    if !options.is_empty() {
        println!();
        print_options(options, selection.best_brand.as_deref());
    }
}

fn print_options(options: &[RecommendationOption], highlighted: Option<&str>) {
    println!(
        "  {:<32}{:>14}{:>10}{:>9}{:>11}{:>10}",
        "CHANNEL", "RECIPIENT GETS", "FEE", "FEE %", "DISTANCE", "TIME"
    );
    for option in options {
        let marker = if highlighted == Some(option.brand_name.as_str()) {
            '*'
        } else {
            ' '
        };
        println!(
            "{marker} {:<32}{:>14.2}{:>10.2}{:>9}{:>11}{:>10}",
            option.brand_name,
            option.recipient_gets,
            option.fee,
            if option.fee_percent.is_empty() {
                "-"
            } else {
                option.fee_percent.as_str()
            },
            fmt_km(option.distance_km),
            option
                .time_min
                .map_or_else(|| "-".to_string(), |t| format!("{t:.1} min")),
        );
    }
}

pub(crate) fn selected_location(state: &SearchState) -> Option<&AnnotatedLocation> {
    let id = state.selection.best_location_id.as_deref()?;
    state.annotated.iter().find(|a| a.location.id == id)
}

fn fmt_km(distance_km: Option<f64>) -> String {
    distance_km.map_or_else(|| "-".to_string(), |d| format!("{d:.2} km"))
}
