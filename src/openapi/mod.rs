use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockflow API",
        version = "1.0.0",
        description = r#"
# Stockflow Inventory API

Suppliers, products, purchase orders and stock movements for a small trading operation.

- **Products** keep a quantity on hand and a weighted average unit cost, recomputed on every receipt.
- **Orders** move PENDING -> VALIDATED -> DELIVERED. Delivery checks every line against stock,
  depletes all of them or none, and records one OUT stock movement.
- **Stock movements** take their quantity from the lines of their order.

## Errors

```json
{
  "error": "Conflict",
  "message": "Insufficient stock for product ...: requested 10, available 5",
  "request_id": "req-abc123xyz",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

## Pagination

List endpoints accept `page` (1-based) and `per_page`, and answer
`{ "data": [...], "pagination": { "page", "per_page", "total", "total_pages" } }`.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Suppliers", description = "Supplier reference data"),
        (name = "Products", description = "Product ledger: stock receipts and valuation"),
        (name = "Orders", description = "Purchase orders and fulfillment"),
        (name = "Stock Movements", description = "Stock movement ledger"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        // Suppliers
        crate::handlers::suppliers::list_suppliers,
        crate::handlers::suppliers::create_supplier,
        crate::handlers::suppliers::get_supplier,
        crate::handlers::suppliers::update_supplier,
        crate::handlers::suppliers::delete_supplier,

        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::create_product,
        crate::handlers::products::get_product,
        crate::handlers::products::get_product_by_name,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,

        // Orders
        crate::handlers::orders::list_orders,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_order,
        crate::handlers::orders::delete_order,
        crate::handlers::orders::list_order_lines,
        crate::handlers::orders::add_order_line,
        crate::handlers::orders::list_order_movements,

        // Stock movements
        crate::handlers::stock_movements::list_movements,
        crate::handlers::stock_movements::record_movement,
        crate::handlers::stock_movements::total_movement_quantity,
        crate::handlers::stock_movements::get_movement,

        // Health
        crate::health::health_check,
        crate::health::readiness_check,
    ),
    components(
        schemas(
            crate::entities::OrderStatus,
            crate::entities::MovementType,
            crate::handlers::common::PaginationMeta,
            crate::health::HealthStatus,
            crate::health::HealthInfo,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_resource() {
        let doc = ApiDocV1::openapi();
        for path in [
            "/api/v1/suppliers/{id}",
            "/api/v1/products/by-name/{name}",
            "/api/v1/orders/{id}/lines",
            "/api/v1/stock-movements/total",
            "/health/ready",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
