use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{order_line, purchase_order, OrderStatus},
    services::orders::{CreateOrder, NewOrderLine, OrderDetails, UpdateOrder},
};

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Validate, ToSchema)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    #[schema(example = 10)]
    pub quantity: i32,
}

impl From<OrderLineRequest> for NewOrderLine {
    fn from(req: OrderLineRequest) -> Self {
        NewOrderLine {
            product_id: req.product_id,
            quantity: req.quantity,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub supplier_id: Uuid,
    /// Defaults to PENDING; DELIVERED fulfils the order immediately
    pub status: Option<OrderStatus>,
    /// Business date of the order; defaults to now
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate]
    pub lines: Vec<OrderLineRequest>,
}

impl From<CreateOrderRequest> for CreateOrder {
    fn from(req: CreateOrderRequest) -> Self {
        CreateOrder {
            supplier_id: req.supplier_id,
            status: req.status,
            created_on: req.created_on,
            lines: req.lines.into_iter().map(NewOrderLine::from).collect(),
        }
    }
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,
    pub supplier_id: Option<Uuid>,
    pub created_on: Option<DateTime<Utc>>,
}

impl From<UpdateOrderRequest> for UpdateOrder {
    fn from(req: UpdateOrderRequest) -> Self {
        UpdateOrder {
            status: req.status,
            supplier_id: req.supplier_id,
            created_on: req.created_on,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderLineResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<order_line::Model> for OrderLineResponse {
    fn from(model: order_line::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            unit_price: model.unit_price,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub created_on: DateTime<Utc>,
    pub status: OrderStatus,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    /// Whether delivery has already depleted stock
    pub stock_applied: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<purchase_order::Model> for OrderResponse {
    fn from(model: purchase_order::Model) -> Self {
        Self {
            id: model.id,
            supplier_id: model.supplier_id,
            created_on: model.created_on,
            status: model.status,
            total_amount: model.total_amount,
            stock_applied: model.stock_applied,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// An order with its lines
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDetailsResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub lines: Vec<OrderLineResponse>,
}

impl From<OrderDetails> for OrderDetailsResponse {
    fn from(details: OrderDetails) -> Self {
        Self {
            order: details.order.into(),
            lines: details.lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_defaults_to_no_lines() {
        let req: CreateOrderRequest = serde_json::from_value(json!({
            "supplier_id": Uuid::nil(),
            "status": "VALIDATED"
        }))
        .unwrap();
        assert!(req.lines.is_empty());
        assert_eq!(req.status, Some(OrderStatus::Validated));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn nested_line_quantity_is_validated() {
        let req: CreateOrderRequest = serde_json::from_value(json!({
            "supplier_id": Uuid::nil(),
            "lines": [{ "product_id": Uuid::nil(), "quantity": 0 }]
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn unknown_status_does_not_deserialize() {
        let parsed = serde_json::from_value::<UpdateOrderRequest>(json!({ "status": "SHIPPED" }));
        assert!(parsed.is_err());
    }
}
