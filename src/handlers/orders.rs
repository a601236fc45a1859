use super::common::{
    created_response, no_content_response, success_response, validate_input, PaginatedResponse,
    PaginationParams,
};
use crate::{
    dto::{
        orders::{
            CreateOrderRequest, OrderDetailsResponse, OrderLineRequest, OrderLineResponse,
            OrderResponse, UpdateOrderRequest,
        },
        stock_movements::StockMovementResponse,
    },
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

/// Create an order with optional lines.
///
/// Creating an order directly as DELIVERED depletes stock for its lines and
/// records an OUT movement in the same transaction.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "Orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderDetailsResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supplier or product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Insufficient stock for delivery", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let details = state.services.orders.create_order(payload.into()).await?;
    Ok(created_response(OrderDetailsResponse::from(details)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with its lines", body = OrderDetailsResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let details = state.services.orders.get_order(order_id).await?;
    Ok(success_response(OrderDetailsResponse::from(details)))
}

/// Update status, supplier or business date; status only moves forward
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Backward status transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order or supplier not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Insufficient stock for delivery", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let order = state
        .services
        .orders
        .update_order(order_id, payload.into())
        .await?;
    Ok(success_response(OrderResponse::from(order)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order already depleted stock", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.services.orders.delete_order(order_id).await?;
    Ok(no_content_response())
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    tag = "Orders",
    params(PaginationParams),
    responses(
        (status = 200, description = "Orders page", body = PaginatedResponse<OrderResponse>),
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, per_page) = state.page_bounds(&pagination);
    let (orders, total) = state.services.orders.list_orders(page, per_page).await?;

    let data: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(success_response(PaginatedResponse::new(
        data, page, per_page, total,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/lines",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Lines of the order", body = Vec<OrderLineResponse>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_order_lines(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let lines = state.services.orders.order_lines(order_id).await?;
    let lines: Vec<OrderLineResponse> = lines.into_iter().map(Into::into).collect();
    Ok(success_response(lines))
}

/// Attach a line to an order that is not yet delivered
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/lines",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = OrderLineRequest,
    responses(
        (status = 201, description = "Line added", body = OrderLineResponse),
        (status = 400, description = "Invalid quantity or order already delivered", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order or product not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn add_order_line(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<OrderLineRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let line = state
        .services
        .orders
        .add_order_line(order_id, payload.into())
        .await?;
    Ok(created_response(OrderLineResponse::from(line)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/movements",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Stock movements of the order", body = Vec<StockMovementResponse>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_order_movements(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let movements = state
        .services
        .stock_movements
        .movements_for_order(order_id)
        .await?;
    let movements: Vec<StockMovementResponse> = movements.into_iter().map(Into::into).collect();
    Ok(success_response(movements))
}

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route(
            "/orders/:id/lines",
            get(list_order_lines).post(add_order_line),
        )
        .route("/orders/:id/movements", get(list_order_movements))
}
