//! Black-box tests driving the axum router.

mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use stockflow_api::middleware_helpers::REQUEST_ID_HEADER;

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        other => Decimal::from_str(&other.to_string()).unwrap(),
    }
}

async fn create_supplier(app: &TestApp) -> String {
    let response = app
        .request(
            Method::POST,
            "/api/v1/suppliers",
            Some(json!({ "company_name": "Acme Trading", "email": "buy@acme.test" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn create_product(app: &TestApp, name: &str, quantity: i32, unit_price: &str) -> Value {
    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "name": name, "quantity": quantity, "unit_price": unit_price })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await
}

#[tokio::test]
async fn health_endpoints_report_up() {
    let app = TestApp::new().await;

    let live = app.request(Method::GET, "/health", None).await;
    assert_eq!(live.status(), StatusCode::OK);
    assert_eq!(response_json(live).await["status"], "up");

    let ready = app.request(Method::GET, "/health/ready", None).await;
    assert_eq!(ready.status(), StatusCode::OK);
    assert_eq!(response_json(ready).await["database"], "up");
}

#[tokio::test]
async fn product_receipts_upsert_by_name() {
    let app = TestApp::new().await;

    let first = create_product(&app, "Copper wire", 10, "100").await;
    let second = create_product(&app, "Copper wire", 5, "200").await;

    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["quantity"], 15);
    let cost = decimal(&second["cost_per_unit"]);
    assert!((cost - Decimal::new(13333, 2)).abs() < Decimal::new(1, 2));

    let by_name = app
        .request(Method::GET, "/api/v1/products/by-name/Copper%20wire", None)
        .await;
    assert_eq!(by_name.status(), StatusCode::OK);
    assert_eq!(response_json(by_name).await["id"], first["id"]);
}

#[tokio::test]
async fn invalid_product_body_is_a_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "name": "", "quantity": -2, "unit_price": "1" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delivered_order_flow_over_http() {
    let app = TestApp::new().await;
    let supplier_id = create_supplier(&app).await;
    let product = create_product(&app, "Widget", 50, "10").await;
    let product_id = product["id"].as_str().unwrap();

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "supplier_id": supplier_id,
                "status": "DELIVERED",
                "lines": [{ "product_id": product_id, "quantity": 10 }]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let order = response_json(response).await;
    assert_eq!(order["status"], "DELIVERED");
    assert_eq!(order["stock_applied"], true);
    assert_eq!(order["lines"].as_array().unwrap().len(), 1);
    let order_id = order["id"].as_str().unwrap();

    let product = response_json(
        app.request(Method::GET, &format!("/api/v1/products/{product_id}"), None)
            .await,
    )
    .await;
    assert_eq!(product["quantity"], 40);

    let movements = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/orders/{order_id}/movements"),
            None,
        )
        .await,
    )
    .await;
    let movements = movements.as_array().unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0]["quantity"], 10);
    assert_eq!(movements[0]["movement_type"], "OUT");

    let total = app
        .request(Method::GET, "/api/v1/stock-movements/total", None)
        .await;
    assert_eq!(total.status(), StatusCode::OK);
    assert_eq!(response_json(total).await, json!({ "total": 10 }));
}

#[tokio::test]
async fn insufficient_stock_is_a_conflict_with_error_body() {
    let app = TestApp::new().await;
    let supplier_id = create_supplier(&app).await;
    let product = create_product(&app, "Widget", 5, "10").await;
    let product_id = product["id"].as_str().unwrap();

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "supplier_id": supplier_id,
                "status": "VALIDATED",
                "lines": [{ "product_id": product_id, "quantity": 10 }]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let order_id = response_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/orders/{order_id}"),
            Some(json!({ "status": "DELIVERED" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    let body = response_json(response).await;
    assert_eq!(body["error"], "Conflict");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("requested 10, available 5"));
    assert_eq!(body["shortfall"], 5);
    assert!(body["request_id"].is_string());

    let product = response_json(
        app.request(Method::GET, &format!("/api/v1/products/{product_id}"), None)
            .await,
    )
    .await;
    assert_eq!(product["quantity"], 5);
}

#[tokio::test]
async fn backwards_transition_is_a_bad_request() {
    let app = TestApp::new().await;
    let supplier_id = create_supplier(&app).await;

    let order = response_json(
        app.request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({ "supplier_id": supplier_id, "status": "VALIDATED" })),
        )
        .await,
    )
    .await;
    let order_id = order["id"].as_str().unwrap();

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/orders/{order_id}"),
            Some(json!({ "status": "PENDING" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_supplier_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({ "supplier_id": uuid::Uuid::new_v4() })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Not Found");

    let orders = response_json(app.request(Method::GET, "/api/v1/orders", None).await).await;
    assert_eq!(orders["pagination"]["total"], 0);
}

#[tokio::test]
async fn movement_with_bad_date_is_rejected_and_explicit_date_kept() {
    let app = TestApp::new().await;
    let supplier_id = create_supplier(&app).await;
    let product = create_product(&app, "Widget", 50, "10").await;

    let order = response_json(
        app.request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "supplier_id": supplier_id,
                "lines": [
                    { "product_id": product["id"], "quantity": 10 },
                    { "product_id": product["id"], "quantity": 5 }
                ]
            })),
        )
        .await,
    )
    .await;

    let bad = app
        .request(
            Method::POST,
            "/api/v1/stock-movements",
            Some(json!({
                "order_id": order["id"],
                "movement_type": "IN",
                "movement_date": "31/12/2023"
            })),
        )
        .await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

    let good = app
        .request(
            Method::POST,
            "/api/v1/stock-movements",
            Some(json!({
                "order_id": order["id"],
                "movement_type": "IN",
                "movement_date": "2023-12-31",
                "quantity": 999
            })),
        )
        .await;
    assert_eq!(good.status(), StatusCode::CREATED);
    let movement = response_json(good).await;
    assert_eq!(movement["quantity"], 15);
    assert_eq!(movement["movement_date"], "2023-12-31");

    let fetched = app
        .request(
            Method::GET,
            &format!("/api/v1/stock-movements/{}", movement["id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(fetched.status(), StatusCode::OK);
}

#[tokio::test]
async fn list_pagination_is_capped() {
    let app = TestApp::new().await;
    for i in 0..3 {
        create_product(&app, &format!("Part {i}"), 1, "1").await;
    }

    let page = response_json(
        app.request(Method::GET, "/api/v1/products?page=2&per_page=2", None)
            .await,
    )
    .await;
    assert_eq!(page["data"].as_array().unwrap().len(), 1);
    assert_eq!(
        page["pagination"],
        json!({ "page": 2, "per_page": 2, "total": 3, "total_pages": 2 })
    );

    let capped = response_json(
        app.request(Method::GET, "/api/v1/products?per_page=10000", None)
            .await,
    )
    .await;
    assert_eq!(capped["pagination"]["per_page"], 50);
}

#[tokio::test]
async fn page_number_beyond_any_offset_returns_an_empty_page() {
    let app = TestApp::new().await;
    create_product(&app, "Part A", 1, "1").await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/products?page=18446744073709551615&per_page=50",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn supplier_crud_round() {
    let app = TestApp::new().await;
    let supplier_id = create_supplier(&app).await;

    let updated = app
        .request(
            Method::PUT,
            &format!("/api/v1/suppliers/{supplier_id}"),
            Some(json!({ "company_name": "Acme Holdings", "city": "Lyon" })),
        )
        .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let body = response_json(updated).await;
    assert_eq!(body["company_name"], "Acme Holdings");
    assert_eq!(body["email"], Value::Null);

    let deleted = app
        .request(
            Method::DELETE,
            &format!("/api/v1/suppliers/{supplier_id}"),
            None,
        )
        .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let missing = app
        .request(
            Method::GET,
            &format!("/api/v1/suppliers/{supplier_id}"),
            None,
        )
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api-docs/openapi.json", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = response_json(response).await;
    assert!(doc["paths"]["/api/v1/orders/{id}"].is_object());
}
