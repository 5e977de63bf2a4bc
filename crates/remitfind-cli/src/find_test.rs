use std::path::PathBuf;

use remitfind_core::Environment;
use remitfind_engine::NoticeKind;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

const MAKATI: (f64, f64) = (121.0244, 14.5547);

fn test_config(base_url: &str, brand_config_url: Option<String>) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        log_level: "debug".to_string(),
        api_base_url: base_url.to_string(),
        advisor_base_url: base_url.to_string(),
        brand_config_url,
        aliases_path: None,
        request_timeout_secs: 5,
        user_agent: "remitfind-test".to_string(),
        travel_speed_kmh: 40.0,
    }
}

fn write_places(name: &str, body: &serde_json::Value) -> PathBuf {
    let path = std::env::temp_dir().join(format!("remitfind-{}-{name}.json", std::process::id()));
    std::fs::write(&path, body.to_string()).expect("write places fixture");
    path
}

fn args(places: PathBuf) -> FindArgs {
    FindArgs {
        lon: MAKATI.0,
        lat: MAKATI.1,
        amount: 100.0,
        from_currency: "usd".to_string(),
        to_currency: "php".to_string(),
        places,
    }
}

fn manila_places() -> serde_json::Value {
    // Roughly 0.5 km and 1.2 km east of the origin.
    serde_json::json!([
        {"id": "mg-1", "name": "MoneyGram Agent", "address": "Ayala Ave",
         "coordinates": [MAKATI.0 + 0.0111, MAKATI.1]},
        {"id": "wu-1", "name": "Western Union", "address": "Glorietta",
         "coordinates": [MAKATI.0 + 0.00464, MAKATI.1]},
        {"id": "cafe", "name": "Coffee Shop", "coordinates": [MAKATI.0, MAKATI.1]},
        {"name": "no coordinates"}
    ])
}

async fn mount_pricing(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/pricing/quote"))
        .and(body_partial_json(serde_json::json!({
            "from_currency": "USD",
            "stores": ["MoneyGram", "Western Union"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "channels": [
                {"name": "MoneyGram", "fee": 9.79, "recipient_gets": 4853.55},
                {"name": "Western Union", "fee": 11.49, "recipient_gets": 4726.12}
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn find_highlights_nearest_recommended_location() {
    let server = MockServer::start().await;
    mount_pricing(&server).await;
    Mock::given(method("POST"))
        .and(path("/ai/optimize"))
        .and(body_partial_json(serde_json::json!({
            "available_brands": ["MoneyGram", "Western Union"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "recommendation": "Western Union is closest.",
            "currency": "PHP",
            "market_rate": 56.5,
            "our_rate": 55.65,
            "options": [
                {"name": "MoneyGram", "fee": 9.79, "recipient_gets": 4853.55},
                {"name": "Western Union", "fee": 11.49, "recipient_gets": 4726.12}
            ],
            "best": {"name": "Western Union", "recipient_gets": 4726.12}
        })))
        .mount(&server)
        .await;

    let places = write_places("highlight", &manila_places());
    let state = run_find(&test_config(&server.uri(), None), &args(places))
        .await
        .expect("search should succeed");

    assert_eq!(state.annotated.len(), 3);
    assert_eq!(state.selection.best_location_id.as_deref(), Some("wu-1"));
    assert!(state.notices.is_empty());
    let options = state.recommendation.as_ref().unwrap().options();
    assert!(options.iter().all(|o| o.time_min.is_some()));

    let requests = server.received_requests().await.unwrap_or_default();
    let advisor_body: serde_json::Value = requests
        .iter()
        .find(|r| r.url.path() == "/ai/optimize")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .unwrap();
    let distances = &advisor_body["brand_distances_km"];
    assert!(distances.get("Western Union").is_some());
    assert!(distances.get("MoneyGram").is_some());
}

#[tokio::test]
async fn advisor_outage_keeps_priced_locations() {
    let server = MockServer::start().await;
    mount_pricing(&server).await;
    Mock::given(method("POST"))
        .and(path("/ai/optimize"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let places = write_places("advisor-outage", &manila_places());
    let state = run_find(&test_config(&server.uri(), None), &args(places))
        .await
        .expect("collaborator failures are not fatal");

    assert!(state.recommendation.is_none());
    assert!(state.selection.best_location_id.is_none());
    assert!(state.annotated.iter().any(|a| a.priced_channel.is_some()));
    assert_eq!(state.notices.len(), 1);
    assert_eq!(state.notices[0].kind, NoticeKind::NetworkFailure);
}

#[tokio::test]
async fn brand_config_aliases_apply_to_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/brands/config"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"brands": ["MoneyGram"], "aliases": {"7-eleven": "MoneyGram"}}"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/pricing/quote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "channels": [{"name": "MoneyGram", "fee": 9.79, "recipient_gets": 4853.55}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ai/optimize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "currency": "PHP",
            "options": [{"name": "MoneyGram", "recipient_gets": 4853.55}],
            "best": {"name": "MoneyGram", "recipient_gets": 4853.55}
        })))
        .mount(&server)
        .await;

    let places = write_places(
        "brand-config",
        &serde_json::json!([
            {"id": "store", "name": "7-Eleven", "coordinates": [MAKATI.0, MAKATI.1 + 0.01]}
        ]),
    );
    let config = test_config(&server.uri(), Some(server.uri()));
    let state = run_find(&config, &args(places)).await.unwrap();

    assert_eq!(state.annotated[0].detected_brand.as_deref(), Some("MoneyGram"));
    assert_eq!(state.selection.best_location_id.as_deref(), Some("store"));
}

#[tokio::test]
async fn brands_added_by_brand_config_are_priced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/brands/config"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"aliases": {"cvs": "MoneyGram"}}"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/pricing/quote"))
        .and(body_partial_json(serde_json::json!({"stores": ["Western Union"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "channels": [{"name": "Western Union", "fee": 11.49, "recipient_gets": 4726.12}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/pricing/quote"))
        .and(body_partial_json(serde_json::json!({
            "stores": ["MoneyGram", "Western Union"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "channels": [
                {"name": "MoneyGram", "fee": 9.79, "recipient_gets": 4853.55},
                {"name": "Western Union", "fee": 11.49, "recipient_gets": 4726.12}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ai/optimize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "currency": "PHP",
            "options": [{"name": "MoneyGram", "recipient_gets": 4853.55}],
            "best": {"name": "MoneyGram", "recipient_gets": 4853.55}
        })))
        .mount(&server)
        .await;

    let places = write_places(
        "reprice",
        &serde_json::json!([
            {"id": "cvs", "name": "CVS Pharmacy", "coordinates": [MAKATI.0, MAKATI.1 + 0.01]},
            {"id": "wu", "name": "Western Union", "coordinates": [MAKATI.0 + 0.01, MAKATI.1]}
        ]),
    );
    let config = test_config(&server.uri(), Some(server.uri()));
    let state = run_find(&config, &args(places)).await.unwrap();

    let cvs = &state.annotated[0];
    assert_eq!(cvs.detected_brand.as_deref(), Some("MoneyGram"));
    assert_eq!(
        cvs.priced_channel.as_ref().map(|c| c.brand_name.as_str()),
        Some("MoneyGram")
    );
    assert_eq!(state.selection.best_location_id.as_deref(), Some("cvs"));
    let pricing_calls = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == "/pricing/quote")
        .count();
    assert_eq!(pricing_calls, 2);
}

#[test]
fn repricing_only_when_new_brands_appear() {
    let request = |stores: &[&str]| PricingRequest {
        amount: 100.0,
        from_currency: "USD".to_string(),
        to_currency: "PHP".to_string(),
        stores: stores.iter().map(|s| (*s).to_string()).collect(),
    };
    let sent = request(&["Western Union", "Wise"]);

    assert!(!adds_brands(&sent, &request(&["western union"])));
    assert!(!adds_brands(&sent, &request(&["Wise (TransferWise)"])));
    assert!(adds_brands(&sent, &request(&["MoneyGram", "Western Union"])));
}

#[tokio::test]
async fn missing_places_file_degrades_to_no_locations() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pricing/quote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"channels": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ai/optimize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "recommendation": "No nearby agents found."
        })))
        .mount(&server)
        .await;

    let missing = std::env::temp_dir().join("remitfind-does-not-exist.json");
    let state = run_find(&test_config(&server.uri(), None), &args(missing))
        .await
        .unwrap();

    assert!(state.annotated.is_empty());
    let kinds: Vec<NoticeKind> = state.notices.iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![NoticeKind::NetworkFailure, NoticeKind::AdvisorDegraded]
    );
}

#[tokio::test]
async fn invalid_amount_fails_before_any_request() {
    let server = MockServer::start().await;
    let mut bad = args(PathBuf::from("unused.json"));
    bad.amount = 0.0;

    let err = run_find(&test_config(&server.uri(), None), &bad)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("amount"));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn invalid_origin_is_rejected() {
    let server = MockServer::start().await;
    let mut bad = args(PathBuf::from("unused.json"));
    bad.lat = 95.0;

    assert!(run_find(&test_config(&server.uri(), None), &bad).await.is_err());
}
