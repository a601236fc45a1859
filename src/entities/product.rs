use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Primary key
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Business key, unique across products
    #[sea_orm(unique)]
    pub name: String,

    pub description: Option<String>,

    pub category: Option<String>,

    /// Current purchase price, overwritten on every receipt
    pub unit_price: Decimal,

    /// Quantity on hand, never negative
    pub quantity: i32,

    /// Weighted average unit cost over all receipts
    pub cost_per_unit: Decimal,

    pub created_at: DateTime<Utc>,

    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLines,
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLines.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        if let ActiveValue::Set(quantity) = active_model.quantity {
            if quantity < 0 {
                return Err(DbErr::Custom(format!(
                    "Validation error: product quantity cannot be negative ({})",
                    quantity
                )));
            }
        }

        if insert {
            active_model.created_at = Set(Utc::now());
        }
        active_model.updated_at = Set(Some(Utc::now()));

        Ok(active_model)
    }
}
