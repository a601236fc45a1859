use super::common::{
    created_response, no_content_response, success_response, validate_input, PaginatedResponse,
    PaginationParams,
};
use crate::{
    dto::products::{CreateProductRequest, ProductResponse, UpdateProductRequest},
    errors::ApiError,
    handlers::AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use uuid::Uuid;

/// Receive stock for a product, creating it on first receipt of its name
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "Products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Stock received; product created or updated", body = ProductResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let product = state.services.products.receive_stock(payload.into()).await?;
    Ok(created_response(ProductResponse::from(product)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.services.products.get_product(product_id).await?;
    Ok(success_response(ProductResponse::from(product)))
}

/// Look a product up by its unique name
#[utoipa::path(
    get,
    path = "/api/v1/products/by-name/{name}",
    tag = "Products",
    params(("name" = String, Path, description = "Product name")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_product_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.services.products.get_product_by_name(&name).await?;
    Ok(success_response(ProductResponse::from(product)))
}

/// Edit a product directly; the weighted average cost is left as is
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Name already taken", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let product = state
        .services
        .products
        .update_product(product_id, payload.into())
        .await?;
    Ok(success_response(ProductResponse::from(product)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Product referenced by order lines", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.services.products.delete_product(product_id).await?;
    Ok(no_content_response())
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "Products",
    params(PaginationParams),
    responses(
        (status = 200, description = "Products page", body = PaginatedResponse<ProductResponse>),
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, per_page) = state.page_bounds(&pagination);
    let (products, total) = state.services.products.list_products(page, per_page).await?;

    let data: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
    Ok(success_response(PaginatedResponse::new(
        data, page, per_page, total,
    )))
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/by-name/:name", get(get_product_by_name))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}
