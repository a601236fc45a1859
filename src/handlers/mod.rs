pub mod common;
pub mod orders;
pub mod products;
pub mod stock_movements;
pub mod suppliers;

use crate::{
    db::DbPool,
    services::{
        orders::OrderService, products::ProductService, stock_movements::StockMovementService,
        suppliers::SupplierService,
    },
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub suppliers: Arc<SupplierService>,
    pub products: Arc<ProductService>,
    pub orders: Arc<OrderService>,
    pub stock_movements: Arc<StockMovementService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            suppliers: Arc::new(SupplierService::new(db_pool.clone())),
            products: Arc::new(ProductService::new(db_pool.clone())),
            orders: Arc::new(OrderService::new(db_pool.clone())),
            stock_movements: Arc::new(StockMovementService::new(db_pool)),
        }
    }
}
