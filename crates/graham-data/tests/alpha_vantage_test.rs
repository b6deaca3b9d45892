//! Alpha Vantage provider against a local mock server.

use graham_data::{
    AlphaVantageProvider, DataError, DataProvider, KeyRotation, NyseListing, RotationStrategy,
};
use graham_valuation::{StatementKind, line_items};
use serde_json::json;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn provider(server: &MockServer, keys: KeyRotation) -> AlphaVantageProvider {
    AlphaVantageProvider::new(keys)
        .unwrap()
        .with_base_url(format!("{}/query", server.uri()))
        .with_retry_pause(Duration::ZERO)
}

fn ok_json(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

#[tokio::test]
async fn test_profile_and_price() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("function", "OVERVIEW"))
        .and(query_param("symbol", "IBM"))
        .respond_with(ok_json(json!({
            "Symbol": "IBM",
            "Name": "International Business Machines",
            "Sector": "TECHNOLOGY",
            "Industry": "COMPUTER & OFFICE EQUIPMENT",
            "MarketCapitalization": "158000000000"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("function", "GLOBAL_QUOTE"))
        .respond_with(ok_json(json!({"Global Quote": {"05. price": "182.52"}})))
        .mount(&server)
        .await;

    let av = provider(&server, KeyRotation::single("k1"));
    let profile = av.company_profile("IBM").await.unwrap().unwrap();
    assert_eq!(profile.sector, "TECHNOLOGY");
    assert_eq!(profile.market_cap, Some(158_000_000_000.0));
    assert_eq!(av.stock_price("IBM").await.unwrap(), Some(182.52));
    assert_eq!(av.request_count(), 2);
}

#[tokio::test]
async fn test_statements_from_all_three_endpoints() {
    let server = MockServer::start().await;
    let reports = |field: &str| {
        json!({"annualReports": [
            {"fiscalDateEnding": "2023-12-31", (field): "100"},
            {"fiscalDateEnding": "2022-12-31", (field): "90"},
            {"fiscalDateEnding": "2021-12-31", (field): "80"}
        ]})
    };
    for (function, field) in [
        ("INCOME_STATEMENT", line_items::NET_INCOME),
        ("BALANCE_SHEET", line_items::TOTAL_CURRENT_ASSETS),
        ("CASH_FLOW", line_items::OPERATING_CASHFLOW),
    ] {
        Mock::given(method("GET"))
            .and(query_param("function", function))
            .respond_with(ok_json(reports(field)))
            .mount(&server)
            .await;
    }

    let av = provider(&server, KeyRotation::single("k1"));
    let statements = av.financial_statements("IBM", 2).await.unwrap();

    assert_eq!(statements.len(), 6);
    let kinds: Vec<StatementKind> = statements.iter().map(|s| s.kind).collect();
    assert_eq!(kinds[0], StatementKind::Income);
    assert_eq!(kinds[5], StatementKind::CashFlow);
    assert!(statements.iter().all(|s| s.fiscal_year >= 2022));
}

#[tokio::test]
async fn test_failed_statement_kind_is_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("function", "INCOME_STATEMENT"))
        .respond_with(ok_json(json!({"annualReports": [
            {"fiscalDateEnding": "2023-12-31", "netIncome": "100"}
        ]})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("function", "BALANCE_SHEET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("function", "CASH_FLOW"))
        .respond_with(ok_json(json!({"Error Message": "Invalid API call."})))
        .mount(&server)
        .await;

    let av = provider(&server, KeyRotation::single("k1"));
    let statements = av.financial_statements("IBM", 7).await.unwrap();
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].kind, StatementKind::Income);
}

#[tokio::test]
async fn test_rate_limit_rotates_to_next_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("apikey", "first"))
        .respond_with(ok_json(json!({
            "Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("apikey", "second"))
        .respond_with(ok_json(json!({"Global Quote": {"05. price": "10.00"}})))
        .expect(1)
        .mount(&server)
        .await;

    let keys = KeyRotation::new(["first", "second"], RotationStrategy::RoundRobin);
    let av = provider(&server, keys);
    assert_eq!(av.stock_price("XYZ").await.unwrap(), Some(10.0));
}

#[tokio::test]
async fn test_rate_limit_exhausted_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok_json(json!({
            "Information": "You have reached the rate limit for this key."
        })))
        .expect(4)
        .mount(&server)
        .await;

    let av = provider(&server, KeyRotation::single("only"));
    let err = av.stock_price("XYZ").await.unwrap_err();
    assert!(matches!(err, DataError::RateLimitExhausted { attempts: 4 }));
}

#[tokio::test]
async fn test_error_message_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok_json(json!({"Error Message": "Invalid API call."})))
        .mount(&server)
        .await;

    let av = provider(&server, KeyRotation::single("k1"));
    let err = av.company_profile("NOPE").await.unwrap_err();
    assert!(matches!(err, DataError::Api { provider: "Alpha Vantage", .. }));
}

#[tokio::test]
async fn test_listing_falls_back_on_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/otherlisted.txt"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let listing = NyseListing::new()
        .unwrap()
        .with_url(format!("{}/otherlisted.txt", server.uri()));
    let av = provider(&server, KeyRotation::single("k1")).with_listing(listing);
    assert_eq!(
        av.listed_tickers().await.unwrap(),
        vec!["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA"]
    );
}

#[tokio::test]
async fn test_listing_parses_download() {
    let server = MockServer::start().await;
    let body = "ACT Symbol|Security Name|Exchange|CQS Symbol|ETF|Round Lot Size|Test Issue|NASDAQ Symbol\n\
                KO|Coca-Cola Company (The) Common Stock|N|KO|N|100|N|KO\n\
                SPY|SPDR S&P 500|P|SPY|Y|100|N|SPY\n\
                File Creation Time: 1018202518:30|||||||\n";
    Mock::given(method("GET"))
        .and(path("/otherlisted.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let listing = NyseListing::new()
        .unwrap()
        .with_url(format!("{}/otherlisted.txt", server.uri()));
    assert_eq!(listing.fetch().await.unwrap(), vec!["KO"]);
}
