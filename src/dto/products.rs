use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::validate_non_negative;
use crate::{
    entities::product,
    services::products::{ProductUpdate, ReceiveStock},
};

/// Receipt of stock; creates the product on first receipt of its name
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255))]
    #[schema(example = "Copper wire 2.5mm")]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(custom = "validate_non_negative")]
    #[schema(value_type = String, example = "200.00")]
    pub unit_price: Decimal,
    #[validate(range(min = 0))]
    #[schema(example = 5)]
    pub quantity: i32,
}

impl From<CreateProductRequest> for ReceiveStock {
    fn from(req: CreateProductRequest) -> Self {
        ReceiveStock {
            name: req.name,
            description: req.description,
            category: req.category,
            quantity: req.quantity,
            unit_price: req.unit_price,
        }
    }
}

/// Direct edit of a product; the weighted average cost is not recomputed
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(custom = "validate_non_negative")]
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    #[validate(range(min = 0))]
    pub quantity: i32,
}

impl From<UpdateProductRequest> for ProductUpdate {
    fn from(req: UpdateProductRequest) -> Self {
        ProductUpdate {
            name: req.name,
            description: req.description,
            category: req.category,
            unit_price: req.unit_price,
            quantity: req.quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Price of the latest receipt
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    /// Quantity on hand
    pub quantity: i32,
    /// Weighted average unit cost
    #[schema(value_type = String)]
    pub cost_per_unit: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            category: model.category,
            unit_price: model.unit_price,
            quantity: model.quantity,
            cost_per_unit: model.cost_per_unit,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
