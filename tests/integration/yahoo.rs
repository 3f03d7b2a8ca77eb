//! Integration tests for the Yahoo chart provider and the API stack on top of it.

#[path = "api_server/test_utils.rs"]
mod test_utils;

use std::sync::Arc;

use levelscan::models::MarketQuery;
use levelscan::services::market_data::{MarketDataError, MarketDataProvider};
use levelscan::services::yahoo::YahooMarketDataProvider;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use test_utils::{level_form, TestApiServer};

fn chart_body() -> Value {
    json!({
        "chart": {
            "result": [{
                "meta": { "symbol": "7203.T", "currency": "JPY" },
                "timestamp": [1704067200, 1704153600, 1704240000, 1704326400],
                "indicators": {
                    "quote": [{
                        "open":  [110.0, 101.0, 112.0, null],
                        "high":  [120.0, 125.0, 125.0, 130.0],
                        "low":   [100.0, 100.0, 105.0, 110.0],
                        "close": [102.0, 115.0, 106.0, 121.0],
                        "volume": [1000, 1100, 1200, 1300]
                    }]
                }
            }],
            "error": null
        }
    })
}

fn provider(server: &MockServer) -> YahooMarketDataProvider {
    YahooMarketDataProvider::with_client(server.uri(), reqwest::Client::new()).with_max_retries(1)
}

#[tokio::test]
async fn fetches_bars_with_range_and_interval() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/7203.T"))
        .and(query_param("range", "6mo"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .expect(1)
        .mount(&server)
        .await;

    let query = MarketQuery::new("7203.T").with_period("6mo");
    let bars = provider(&server).get_bars(&query).await.expect("bars");

    // the row with a null open is dropped
    assert_eq!(bars.len(), 3);
    assert_eq!(bars[0].low, 100.0);
    assert_eq!(bars[2].high, 125.0);
}

#[tokio::test]
async fn query_components_are_sent_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/7203.T"))
        .and(query_param("range", "1mo&interval=1m"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .expect(1)
        .mount(&server)
        .await;

    let query = MarketQuery::new("7203.T").with_period("1mo&interval=1m");
    let bars = provider(&server).get_bars(&query).await.expect("bars");
    assert_eq!(bars.len(), 3);
}

#[tokio::test]
async fn unknown_symbol_yields_empty_series() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/NOPE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        })))
        .mount(&server)
        .await;

    let bars = provider(&server)
        .get_bars(&MarketQuery::new("NOPE"))
        .await
        .expect("empty series");
    assert!(bars.is_empty());
}

#[tokio::test]
async fn server_errors_are_retried_then_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/AAPL"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let result = provider(&server).get_bars(&MarketQuery::new("AAPL")).await;
    assert!(matches!(result, Err(MarketDataError::Request(_))));
}

#[tokio::test]
async fn api_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/AAPL"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "chart": {
                "result": null,
                "error": { "code": "Unprocessable Entity", "description": "Invalid range" }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = provider(&server).get_bars(&MarketQuery::new("AAPL")).await;
    assert!(matches!(result, Err(MarketDataError::Api { .. })));
}

#[tokio::test]
async fn api_server_detects_levels_from_yahoo_bars() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/7203.T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .mount(&server)
        .await;

    let app = TestApiServer::with_provider(Arc::new(provider(&server)));
    let response = app.server.post("/api/levels").form(&level_form("7203.T")).await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["report"]["bar_count"], 3);
    assert_eq!(body["report"]["support"]["levels"][0]["price"], 100.0);
    assert_eq!(body["report"]["support"]["levels"][0]["count"], 2);
}

#[tokio::test]
async fn api_server_maps_provider_failure_to_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let app = TestApiServer::with_provider(Arc::new(provider(&server)));
    let response = app.server.post("/api/levels").form(&level_form("7203.T")).await;
    assert_eq!(response.status_code(), 502);

    let body: Value = response.json();
    assert_eq!(body["error"], "market_data");
}
