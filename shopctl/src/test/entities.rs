//! Generic CRUD pages against a mocked shop API.

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::mock_get;
use crate::test_utils::{authed, create_test_app};

#[test_log::test(tokio::test)]
async fn test_list_renders_rows_without_pager_on_single_page() {
    let shop = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/brands"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "items": [
                {"id": 1, "name": "Samsung", "description": "Phones & tablets", "created_at": "2024-01-02T08:00:00Z"},
                {"id": 2, "name": "Tecno", "description": null}
            ],
            "pagination": {"page": 1, "per_page": 10, "total": 2, "total_pages": 1}
        })))
        .expect(1)
        .mount(&shop)
        .await;
    let app = create_test_app(&shop.uri());

    let response = authed(app.get("/brands")).await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("Samsung"));
    assert!(html.contains("Phones &amp; tablets"));
    assert!(html.contains("2024-01-02 08:00"));
    assert!(html.contains("href=\"/brands/2/edit\""));
    assert!(!html.contains("class=\"pager\""));
}

#[test_log::test(tokio::test)]
async fn test_list_empty_state_and_search_forwarded() {
    let shop = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/suppliers"))
        .and(query_param("search", "kofi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "items": []})))
        .expect(1)
        .mount(&shop)
        .await;
    let app = create_test_app(&shop.uri());

    let response = authed(app.get("/suppliers").add_query_param("search", " kofi ")).await;

    response.assert_status_ok();
    assert!(response.text().contains("No suppliers found."));
}

#[test_log::test(tokio::test)]
async fn test_list_shows_pager_and_keeps_search() {
    let shop = MockServer::start().await;
    mock_get(
        &shop,
        "/api/brands",
        json!({
            "success": true,
            "items": [{"id": 11, "name": "Itel"}],
            "pagination": {"page": 2, "per_page": 10, "total": 25, "total_pages": 3}
        }),
    )
    .await;
    let app = create_test_app(&shop.uri());

    let response = authed(app.get("/brands").add_query_param("page", "2").add_query_param("search", "it")).await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("class=\"pager\""));
    assert!(html.contains("search=it&amp;page=3"));
}

#[test_log::test(tokio::test)]
async fn test_create_posts_form_as_json_and_redirects() {
    let shop = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/brands"))
        .and(body_json(json!({"name": "Samsung", "description": null})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "item": {"id": 5}})))
        .expect(1)
        .mount(&shop)
        .await;
    let app = create_test_app(&shop.uri());

    let response = authed(app.post("/brands"))
        .form(&[("name", " Samsung "), ("description", "")])
        .await;

    assert_eq!(response.status_code().as_u16(), 303);
    assert_eq!(response.header("location"), "/brands?success=Brand+created.");
}

#[test_log::test(tokio::test)]
async fn test_create_with_money_and_reference_fields() {
    let shop = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/purchase-orders"))
        .and(body_json(json!({
            "supplier_id": 3,
            "reference": "PO-0042",
            "order_date": "2024-05-01",
            "expected_date": null,
            "status": "ordered",
            "total_amount": 1250.5,
            "notes": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "message": "Purchase order saved"})))
        .expect(1)
        .mount(&shop)
        .await;
    let app = create_test_app(&shop.uri());

    let response = authed(app.post("/purchase-orders"))
        .form(&[
            ("supplier_id", "3"),
            ("reference", "PO-0042"),
            ("order_date", "2024-05-01"),
            ("expected_date", ""),
            ("status", "ordered"),
            ("total_amount", "1250.50"),
            ("notes", ""),
        ])
        .await;

    assert_eq!(response.status_code().as_u16(), 303);
    assert_eq!(response.header("location"), "/purchase-orders?success=Purchase+order+saved");
}

#[test_log::test(tokio::test)]
async fn test_invalid_form_is_rendered_again_without_calling_api() {
    let shop = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&shop)
        .await;
    let app = create_test_app(&shop.uri());

    let response = authed(app.post("/staff"))
        .form(&[("full_name", ""), ("email", "not-an-email"), ("role", "owner")])
        .await;

    assert_eq!(response.status_code().as_u16(), 400);
    let html = response.text();
    assert!(html.contains("Full name is required."));
    assert!(html.contains("Email must be a valid email address."));
    assert!(html.contains("Role has an invalid choice."));
    // submitted values survive
    assert!(html.contains("value=\"not-an-email\""));
}

#[test_log::test(tokio::test)]
async fn test_api_rejection_is_shown_on_the_form() {
    let shop = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/brands/7/update"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"success": false, "error": "A brand with this name already exists"})),
        )
        .expect(1)
        .mount(&shop)
        .await;
    let app = create_test_app(&shop.uri());

    let response = authed(app.post("/brands/7")).form(&[("name", "Samsung")]).await;

    assert_eq!(response.status_code().as_u16(), 400);
    let html = response.text();
    assert!(html.contains("A brand with this name already exists"));
    assert!(html.contains("value=\"Samsung\""));
}

#[test_log::test(tokio::test)]
async fn test_detail_resolves_reference_names() {
    let shop = MockServer::start().await;
    mock_get(
        &shop,
        "/api/subcategories/4",
        json!({"success": true, "item": {"id": 4, "name": "Chargers", "category_id": 2, "category_name": "Accessories"}}),
    )
    .await;
    let app = create_test_app(&shop.uri());

    let response = authed(app.get("/subcategories/4")).await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("<title>Subcategory: Chargers | ShopDesk</title>"));
    assert!(html.contains("Accessories"));
}

#[test_log::test(tokio::test)]
async fn test_missing_record_is_not_found() {
    let shop = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/brands/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"success": false, "error": "Not found"})))
        .mount(&shop)
        .await;
    let app = create_test_app(&shop.uri());

    let response = authed(app.get("/brands/99")).await;

    assert_eq!(response.status_code().as_u16(), 404);
    assert!(response.text().contains("brands with ID 99 not found"));
}

#[test_log::test(tokio::test)]
async fn test_delete_redirects_with_banner() {
    let shop = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/categories/3/delete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&shop)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/categories/4/delete"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"success": false, "error": "Category has subcategories"})),
        )
        .expect(1)
        .mount(&shop)
        .await;
    let app = create_test_app(&shop.uri());

    let response = authed(app.post("/categories/3/delete")).await;
    assert_eq!(response.header("location"), "/categories?success=Category+deleted.");

    let response = authed(app.post("/categories/4/delete")).await;
    assert_eq!(response.header("location"), "/categories?error=Category+has+subcategories");
}

#[test_log::test(tokio::test)]
async fn test_new_form_loads_reference_options() {
    let shop = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "items": [{"id": 2, "name": "Accessories"}, {"id": 3, "name": "Phones"}]
        })))
        .expect(1)
        .mount(&shop)
        .await;
    let app = create_test_app(&shop.uri());

    let response = authed(app.get("/subcategories/new")).await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("<option value=\"2\""));
    assert!(html.contains("Phones"));
}
