use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::{stock_movement, MovementType};

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct RecordMovementRequest {
    pub order_id: Uuid,
    pub movement_type: MovementType,
    /// ISO-8601 calendar date; today when absent or blank
    #[validate(length(max = 64))]
    #[schema(example = "2024-05-01")]
    pub movement_date: Option<String>,
    /// Accepted for compatibility and ignored; the quantity is derived from the order lines
    #[serde(default)]
    pub quantity: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockMovementResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub movement_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<stock_movement::Model> for StockMovementResponse {
    fn from(model: stock_movement::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            movement_type: model.movement_type,
            quantity: model.quantity,
            movement_date: model.movement_date,
            created_at: model.created_at,
        }
    }
}

/// Sum of quantities over all movements
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MovementTotalResponse {
    #[schema(example = 15)]
    pub total: i64,
}
