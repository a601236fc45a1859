//! Stockflow API Library
//!
//! Suppliers, products, purchase orders and stock movements, with weighted
//! average cost valuation and all-or-nothing order delivery.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::Router;
use std::sync::Arc;

use crate::{config::AppConfig, db::DbPool, handlers::common::PaginationParams};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: Arc<AppConfig>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, config: AppConfig) -> Self {
        let services = handlers::AppServices::new(db.clone());
        Self {
            db,
            config: Arc::new(config),
            services,
        }
    }

    /// Page and page size for a list request, bounded by configuration
    pub fn page_bounds(&self, params: &PaginationParams) -> (u64, u64) {
        params.resolve(
            self.config.api_default_page_size,
            self.config.api_max_page_size,
        )
    }
}

/// Every versioned resource route, to be nested under `/api/v1`
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::suppliers::supplier_routes())
        .merge(handlers::products::product_routes())
        .merge(handlers::orders::order_routes())
        .merge(handlers::stock_movements::stock_movement_routes())
}

/// Full application router: health, versioned API and docs, with request ids and HTTP tracing
pub fn app(state: AppState) -> Router {
    Router::<AppState>::new()
        .merge(health::health_routes())
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}
