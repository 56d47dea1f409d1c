//! End-to-end tests: the full router against a mocked shop API.

pub mod entities;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::errors::NETWORK_ERROR_MESSAGE;
use crate::test_utils::{authed, create_test_app};

/// Register a GET mock answering with `body`.
pub(crate) async fn mock_get(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn dashboard_payloads() -> (serde_json::Value, serde_json::Value) {
    (
        json!({"success": true, "stats": {"total_sales": 42, "total_revenue": 1500, "low_stock_count": 3}}),
        json!({"success": true, "metrics": {"revenue": 1500, "previous_revenue": 1200, "transactions": 4}}),
    )
}

#[test_log::test(tokio::test)]
async fn test_missing_credentials_redirect_to_login() {
    let shop = MockServer::start().await;
    let app = create_test_app(&shop.uri());

    let response = app.get("/brands").add_query_param("page", "2").await;

    assert_eq!(response.status_code().as_u16(), 303);
    assert_eq!(response.header("location"), "/login?next=%2Fbrands%3Fpage%3D2");
    assert!(shop.received_requests().await.unwrap_or_default().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_expired_upstream_session_redirects_to_login() {
    let shop = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"success": false, "error": "Token expired"})))
        .mount(&shop)
        .await;
    let app = create_test_app(&shop.uri());

    let response = authed(app.get("/")).await;

    assert_eq!(response.status_code().as_u16(), 303);
    assert_eq!(response.header("location"), "/login?next=%2F");
}

#[test_log::test(tokio::test)]
async fn test_dashboard_forwards_credentials() {
    let shop = MockServer::start().await;
    let (stats, metrics) = dashboard_payloads();
    Mock::given(method("GET"))
        .and(path("/api/dashboard/stats"))
        .and(header("authorization", "Bearer tok-123"))
        .and(header("cookie", "session=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats))
        .expect(1)
        .mount(&shop)
        .await;
    mock_get(&shop, "/api/dashboard/sales-metrics", metrics).await;
    let app = create_test_app(&shop.uri());

    let response = authed(app.get("/")).await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("<title>Dashboard | ShopDesk</title>"));
    assert!(html.contains("₵1,500.00"));
    assert!(html.contains("+25.00%"));
}

#[test_log::test(tokio::test)]
async fn test_token_cookie_is_accepted() {
    let shop = MockServer::start().await;
    let (stats, metrics) = dashboard_payloads();
    Mock::given(method("GET"))
        .and(path("/api/dashboard/stats"))
        .and(header("authorization", "Bearer from-cookie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats))
        .expect(1)
        .mount(&shop)
        .await;
    mock_get(&shop, "/api/dashboard/sales-metrics", metrics).await;
    let app = create_test_app(&shop.uri());

    let response = app.get("/").add_header("cookie", "token=from-cookie").await;

    response.assert_status_ok();
}

#[test_log::test(tokio::test)]
async fn test_unreachable_shop_api_shows_network_error() {
    // nothing listens on the discard port
    let app = create_test_app("http://127.0.0.1:9");

    let response = authed(app.get("/brands")).await;

    assert_eq!(response.status_code().as_u16(), 502);
    assert!(response.text().contains(NETWORK_ERROR_MESSAGE));
}

#[test_log::test(tokio::test)]
async fn test_healthz_and_static_need_no_credentials() {
    let shop = MockServer::start().await;
    let app = create_test_app(&shop.uri());

    let response = app.get("/healthz").await;
    response.assert_status_ok();
    response.assert_text("OK");

    let response = app.get("/static/app.css").await;
    response.assert_status_ok();
    assert!(response.text().contains(".banner-error"));
}

#[test_log::test(tokio::test)]
async fn test_unknown_entity_is_not_found() {
    let shop = MockServer::start().await;
    let app = create_test_app(&shop.uri());

    let response = authed(app.get("/spaceships")).await;

    assert_eq!(response.status_code().as_u16(), 404);
    assert!(response.text().contains("Page with ID &#x2f;spaceships not found"));
}
