use super::common::{
    created_response, no_content_response, success_response, validate_input, PaginatedResponse,
    PaginationParams,
};
use crate::{
    dto::suppliers::{SupplierRequest, SupplierResponse},
    errors::ApiError,
    handlers::AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use tracing::info;
use uuid::Uuid;

/// Create a new supplier
#[utoipa::path(
    post,
    path = "/api/v1/suppliers",
    tag = "Suppliers",
    request_body = SupplierRequest,
    responses(
        (status = 201, description = "Supplier created", body = SupplierResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    Json(payload): Json<SupplierRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let supplier = state
        .services
        .suppliers
        .create_supplier(payload.into())
        .await?;

    info!(supplier_id = %supplier.id, "Supplier created");
    Ok(created_response(SupplierResponse::from(supplier)))
}

/// Get a supplier by ID
#[utoipa::path(
    get,
    path = "/api/v1/suppliers/{id}",
    tag = "Suppliers",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier found", body = SupplierResponse),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let supplier = state.services.suppliers.get_supplier(supplier_id).await?;
    Ok(success_response(SupplierResponse::from(supplier)))
}

/// Update a supplier; every field is overwritten
#[utoipa::path(
    put,
    path = "/api/v1/suppliers/{id}",
    tag = "Suppliers",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    request_body = SupplierRequest,
    responses(
        (status = 200, description = "Supplier updated", body = SupplierResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
    Json(payload): Json<SupplierRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let supplier = state
        .services
        .suppliers
        .update_supplier(supplier_id, payload.into())
        .await?;

    Ok(success_response(SupplierResponse::from(supplier)))
}

/// Delete a supplier
#[utoipa::path(
    delete,
    path = "/api/v1/suppliers/{id}",
    tag = "Suppliers",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 204, description = "Supplier deleted"),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Supplier still referenced by orders", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.services.suppliers.delete_supplier(supplier_id).await?;
    Ok(no_content_response())
}

/// List suppliers with pagination
#[utoipa::path(
    get,
    path = "/api/v1/suppliers",
    tag = "Suppliers",
    params(PaginationParams),
    responses(
        (status = 200, description = "Suppliers page", body = PaginatedResponse<SupplierResponse>),
    )
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, per_page) = state.page_bounds(&pagination);
    let (suppliers, total) = state
        .services
        .suppliers
        .list_suppliers(page, per_page)
        .await?;

    let data: Vec<SupplierResponse> = suppliers.into_iter().map(SupplierResponse::from).collect();
    Ok(success_response(PaginatedResponse::new(
        data, page, per_page, total,
    )))
}

/// Creates the router for supplier endpoints
pub fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/suppliers/:id",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
}
