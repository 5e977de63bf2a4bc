use serde_json::json;

use super::*;
use crate::matcher::annotate_locations;
use crate::resolve::AliasTable;
use crate::types::{AdvisorBest, Coordinates, PricedChannel, RawLocation};

fn raw(id: &str, display_text: &str, distance_km: Option<f64>) -> RawLocation {
    RawLocation {
        id: id.to_string(),
        display_text: display_text.to_string(),
        address: "Makati City".to_string(),
        coordinates: Coordinates::new(121.02, 14.55),
        distance_km,
    }
}

fn option(name: &str, recipient_gets: f64) -> RecommendationOption {
    RecommendationOption {
        brand_name: name.to_string(),
        recipient_gets,
        fee: 0.0,
        fee_percent: String::new(),
        exchange_rate: None,
        distance_km: None,
        time_min: None,
    }
}

fn structured_response(best: &str, options: Vec<RecommendationOption>) -> AdvisorResponse {
    AdvisorResponse {
        best: Some(AdvisorBest {
            name: best.to_string(),
            recipient_gets: options
                .iter()
                .find(|o| o.brand_name == best)
                .map_or(0.0, |o| o.recipient_gets),
            distance_km: None,
            time_min: None,
        }),
        currency: Some("PHP".to_string()),
        market_rate: Some(56.5),
        our_rate: Some(55.65),
        options,
        recommendation: Some("Closest good option.".to_string()),
    }
}

fn manila_annotated() -> Vec<AnnotatedLocation> {
    let locations = vec![
        raw("mg-makati", "MoneyGram Agent", Some(1.2)),
        raw("wu-makati", "Western Union - Glorietta", Some(0.5)),
        raw("cafe", "Coffee Shop", Some(0.1)),
    ];
    let channels = vec![
        PricedChannel {
            brand_name: "MoneyGram".to_string(),
            fee: 9.79,
            recipient_gets: 4853.55,
        },
        PricedChannel {
            brand_name: "Western Union".to_string(),
            fee: 11.49,
            recipient_gets: 4726.12,
        },
    ];
    annotate_locations(&locations, &channels, &AliasTable::default())
}

#[test]
fn query_validates_amount() {
    assert_eq!(
        TransferQuery::new(0.0, "USD", "PHP"),
        Err(EngineError::InvalidAmount(0.0))
    );
    assert!(TransferQuery::new(-5.0, "USD", "PHP").is_err());
    assert!(TransferQuery::new(f64::NAN, "USD", "PHP").is_err());
}

#[test]
fn query_uppercases_currencies() {
    let query = TransferQuery::new(100.0, " usd", "php ").unwrap();
    assert_eq!(query.from_currency, "USD");
    assert_eq!(query.to_currency, "PHP");
}

#[test]
fn query_rejects_malformed_currency() {
    assert_eq!(
        TransferQuery::new(100.0, "US", "PHP"),
        Err(EngineError::InvalidCurrency("US".to_string()))
    );
    assert!(TransferQuery::new(100.0, "USD", "P1P").is_err());
}

#[test]
fn hints_keep_minimum_distance_per_canonical_brand() {
    let locations = vec![
        raw("a", "Ria Money Transfer", Some(3.5)),
        raw("b", "RIA kiosk", Some(1.2)),
        raw("c", "Remitly office", None),
    ];
    let annotated = annotate_locations(&locations, &[], &AliasTable::default());
    let hints = derive_hints(&annotated);
    assert_eq!(hints.available_brands, vec!["Remitly", "Ria"]);
    assert_eq!(hints.brand_distances_km.get("Ria"), Some(&1.2));
    assert!(!hints.brand_distances_km.contains_key("Remitly"));
    assert_eq!(hints.distance_for("RIA Money Transfer"), Some(1.2));
}

#[test]
fn advisor_request_carries_hints() {
    let query = TransferQuery::new(100.0, "usd", "php").unwrap();
    let request = build_advisor_request(&query, &manila_annotated(), None);
    assert_eq!(request.from_currency, "USD");
    assert_eq!(
        request.available_brands,
        Some(vec!["MoneyGram".to_string(), "Western Union".to_string()])
    );
    let distances = request.brand_distances_km.unwrap();
    assert!(distances.contains_key("Western Union"));
    assert_eq!(distances.get("Western Union"), Some(&0.5));
    assert_eq!(distances.get("MoneyGram"), Some(&1.2));
}

#[test]
fn hints_use_priced_channel_name_over_detected_brand() {
    let locations = vec![raw("wise", "Wise office", Some(2.4))];
    let channels = vec![PricedChannel {
        brand_name: "Wise (TransferWise)".to_string(),
        fee: 4.14,
        recipient_gets: 5561.75,
    }];
    let annotated = annotate_locations(&locations, &channels, &AliasTable::default());

    let hints = derive_hints(&annotated);

    assert_eq!(hints.available_brands, vec!["Wise (TransferWise)"]);
    assert_eq!(hints.brand_distances_km.get("Wise (TransferWise)"), Some(&2.4));
}

#[test]
fn advisor_request_omits_empty_hints() {
    let query = TransferQuery::new(100.0, "USD", "MXN").unwrap();
    let request = build_advisor_request(&query, &[], Some(json!({"source": "static"})));
    assert!(request.available_brands.is_none());
    assert!(request.brand_distances_km.is_none());

    let body = serde_json::to_value(&request).unwrap();
    assert!(body.get("available_brands").is_none());
    assert_eq!(body["competitor_data"], json!({"source": "static"}));
}

#[test]
fn pricing_request_lists_detected_brands_once() {
    let locations = vec![
        raw("1", "MoneyGram Agent", None),
        raw("2", "Money Gram at CVS", None),
        raw("3", "Western Union", None),
    ];
    let annotated = annotate_locations(&locations, &[], &AliasTable::default());
    let query = TransferQuery::new(250.0, "USD", "PHP").unwrap();
    let request = build_pricing_request(&query, &annotated, &[]);
    assert_eq!(request.stores, vec!["MoneyGram", "Western Union"]);
}

#[test]
fn pricing_request_falls_back_to_configured_brands() {
    let query = TransferQuery::new(250.0, "USD", "PHP").unwrap();
    let configured = vec!["Remitly".to_string(), "Wise".to_string()];
    let request = build_pricing_request(&query, &[], &configured);
    assert_eq!(request.stores, configured);
}

#[test]
fn end_to_end_highlights_nearest_recommended_brand() {
    let annotated = manila_annotated();
    let hints = derive_hints(&annotated);
    let response = structured_response(
        "Western Union",
        vec![option("MoneyGram", 4853.55), option("Western Union", 4726.12)],
    );

    let (recommendation, selection) = fuse(&response, &annotated, &hints, 40.0);

    assert_eq!(recommendation.best_brand(), Some("Western Union"));
    assert_eq!(selection.best_location_id.as_deref(), Some("wu-makati"));
    assert!(selection.fallback_from.is_none());
}

#[test]
fn fusion_is_idempotent() {
    let annotated = manila_annotated();
    let hints = derive_hints(&annotated);
    let response = structured_response(
        "Xoom",
        vec![option("Xoom", 1062.0), option("MoneyGram", 1055.0)],
    );

    let first = fuse(&response, &annotated, &hints, 40.0);
    let second = fuse(&response, &annotated, &hints, 40.0);
    assert_eq!(first, second);
    assert_eq!(first.1.best_brand.as_deref(), Some("MoneyGram"));
    assert_eq!(first.1.best_location_id.as_deref(), Some("mg-makati"));
}

#[test]
fn reply_without_currency_is_degraded() {
    let mut response = structured_response("Western Union", vec![option("Western Union", 1.0)]);
    response.currency = None;

    let (recommendation, selection) = fuse(&response, &manila_annotated(), &AdvisorHints::default(), 40.0);

    assert!(recommendation.is_degraded());
    assert!(recommendation.options().is_empty());
    assert_eq!(recommendation.text(), Some("Closest good option."));
    assert_eq!(selection, SelectionResult::default());
}

#[test]
fn reply_without_best_is_degraded() {
    let response = AdvisorResponse {
        currency: Some("PHP".to_string()),
        options: vec![option("Remitly", 5000.0)],
        recommendation: Some("Try Remitly.".to_string()),
        ..AdvisorResponse::default()
    };
    let recommendation = reconcile(&response, &AdvisorHints::default(), 40.0);
    assert!(recommendation.best_brand().is_none());
    assert!(recommendation.options().is_empty());
}

#[test]
fn options_get_travel_time_from_hints() {
    let annotated = manila_annotated();
    let hints = derive_hints(&annotated);
    let mut timed = option("Western Union", 4726.12);
    timed.distance_km = Some(0.5);
    timed.time_min = Some(2.0);
    let response = structured_response(
        "MoneyGram",
        vec![option("MoneyGram", 4853.55), timed, option("Remitly", 4900.0)],
    );

    let recommendation = reconcile(&response, &hints, 40.0);
    let options = recommendation.options();

    assert_eq!(options[0].distance_km, Some(1.2));
    assert_eq!(options[0].time_min, Some(1.8));
    // An advisor-supplied time is left alone.
    assert_eq!(options[1].time_min, Some(2.0));
    // No location for this brand, nothing to fill.
    assert_eq!(options[2].distance_km, None);
    assert_eq!(options[2].time_min, None);
}
