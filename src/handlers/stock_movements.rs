use super::common::{
    created_response, success_response, validate_input, PaginatedResponse, PaginationParams,
};
use crate::{
    dto::stock_movements::{MovementTotalResponse, RecordMovementRequest, StockMovementResponse},
    errors::ApiError,
    handlers::AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use tracing::debug;
use uuid::Uuid;

/// Record a movement for an order; its quantity is the sum of the order's lines
#[utoipa::path(
    post,
    path = "/api/v1/stock-movements",
    tag = "Stock Movements",
    request_body = RecordMovementRequest,
    responses(
        (status = 201, description = "Movement recorded", body = StockMovementResponse),
        (status = 400, description = "Unparseable movement date", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn record_movement(
    State(state): State<AppState>,
    Json(payload): Json<RecordMovementRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    if let Some(ignored) = payload.quantity {
        debug!(ignored, "Caller-supplied movement quantity is replaced by the order line sum");
    }

    let movement = state
        .services
        .stock_movements
        .record_movement(payload.order_id, payload.movement_type, payload.movement_date)
        .await?;
    Ok(created_response(StockMovementResponse::from(movement)))
}

/// Sum of quantities across all movements, both directions counted positively
#[utoipa::path(
    get,
    path = "/api/v1/stock-movements/total",
    tag = "Stock Movements",
    responses((status = 200, description = "Total moved quantity", body = MovementTotalResponse))
)]
pub async fn total_movement_quantity(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let total = state
        .services
        .stock_movements
        .total_movement_quantity()
        .await?;
    Ok(success_response(MovementTotalResponse { total }))
}

#[utoipa::path(
    get,
    path = "/api/v1/stock-movements/{id}",
    tag = "Stock Movements",
    params(("id" = Uuid, Path, description = "Movement ID")),
    responses(
        (status = 200, description = "Movement found", body = StockMovementResponse),
        (status = 404, description = "Movement not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_movement(
    State(state): State<AppState>,
    Path(movement_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let movement = state
        .services
        .stock_movements
        .get_movement(movement_id)
        .await?;
    Ok(success_response(StockMovementResponse::from(movement)))
}

#[utoipa::path(
    get,
    path = "/api/v1/stock-movements",
    tag = "Stock Movements",
    params(PaginationParams),
    responses(
        (status = 200, description = "Movements page", body = PaginatedResponse<StockMovementResponse>),
    )
)]
pub async fn list_movements(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, per_page) = state.page_bounds(&pagination);
    let (movements, total) = state
        .services
        .stock_movements
        .list_movements(page, per_page)
        .await?;

    let data: Vec<StockMovementResponse> = movements
        .into_iter()
        .map(StockMovementResponse::from)
        .collect();
    Ok(success_response(PaginatedResponse::new(
        data, page, per_page, total,
    )))
}

pub fn stock_movement_routes() -> Router<AppState> {
    Router::new()
        .route("/stock-movements", get(list_movements).post(record_movement))
        .route("/stock-movements/total", get(total_movement_quantity))
        .route("/stock-movements/:id", get(get_movement))
}
