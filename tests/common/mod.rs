#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use rust_decimal::Decimal;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::Value;
use stockflow_api::{
    config::AppConfig,
    db,
    entities::{product, stock_movement, supplier},
    services::{products::ReceiveStock, suppliers::SupplierInput},
    AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

/// Helper harness for spinning up an application state backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.api_default_page_size = 20;
        cfg.api_max_page_size = 50;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = stockflow_api::app(state.clone());
        Self { router, state }
    }

    /// Send a request against the router.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn seed_supplier(&self, company_name: &str) -> supplier::Model {
        self.state
            .services
            .suppliers
            .create_supplier(SupplierInput {
                company_name: company_name.to_string(),
                city: Some("Lyon".to_string()),
                ..Default::default()
            })
            .await
            .expect("seed supplier")
    }

    /// Receives `quantity` units of `name` at `unit_price`, creating the product if needed.
    pub async fn seed_product(&self, name: &str, quantity: i32, unit_price: Decimal) -> product::Model {
        self.state
            .services
            .products
            .receive_stock(ReceiveStock {
                name: name.to_string(),
                description: None,
                category: Some("hardware".to_string()),
                quantity,
                unit_price,
            })
            .await
            .expect("seed product")
    }

    pub async fn product(&self, id: Uuid) -> product::Model {
        self.state
            .services
            .products
            .get_product(id)
            .await
            .expect("product exists")
    }

    pub async fn movement_count(&self) -> u64 {
        stock_movement::Entity::find()
            .count(self.state.db.as_ref())
            .await
            .expect("count movements")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Decimals round-trip through SQLite as REAL, so compare within a tolerance.
pub fn assert_close(actual: Decimal, expected: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= Decimal::new(1, 2),
        "expected {expected}, got {actual}"
    );
}
