//! Product ledger: quantity on hand and weighted average cost.
//!
//! Stock receipts upsert by product name and fold the incoming lot into the
//! running average cost. Depletion goes through [`ProductService::adjust_on_hand_with`],
//! which the fulfillment flow calls inside its own transaction.

use crate::{
    db::DbPool,
    entities::{order_line, product},
    errors::{EntityKind, ServiceError},
};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    DbErr, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Decimal places kept for the weighted average cost
pub const COST_SCALE: u32 = 4;

/// Incoming lot of stock for a product identified by name
#[derive(Debug, Clone)]
pub struct ReceiveStock {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Direct edit of a product; bypasses cost recalculation
#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i32,
}

/// Quantity-weighted mean of the stock already held and an incoming lot.
///
/// Returns `None` when the combined quantity is zero or the arithmetic overflows.
pub fn weighted_average_cost(
    on_hand: i32,
    current_cost: Decimal,
    incoming: i32,
    incoming_price: Decimal,
) -> Option<Decimal> {
    let combined = i64::from(on_hand) + i64::from(incoming);
    if combined == 0 {
        return None;
    }
    let held_value = Decimal::from(on_hand).checked_mul(current_cost)?;
    let incoming_value = Decimal::from(incoming).checked_mul(incoming_price)?;
    held_value
        .checked_add(incoming_value)?
        .checked_div(Decimal::from(combined))
        .map(|cost| cost.round_dp(COST_SCALE))
}

fn validate_stock_fields(name: &str, quantity: i32, unit_price: Decimal) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "product name must not be blank".to_string(),
        ));
    }
    if quantity < 0 {
        return Err(ServiceError::InvalidInput(format!(
            "quantity must not be negative, got {}",
            quantity
        )));
    }
    if unit_price < Decimal::ZERO {
        return Err(ServiceError::InvalidInput(format!(
            "unit price must not be negative, got {}",
            unit_price
        )));
    }
    Ok(())
}

/// Service for the product ledger
#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Receives stock into the product named `input.name`, creating it on first receipt
    #[instrument(skip(self, input), fields(name = %input.name, quantity = input.quantity))]
    pub async fn receive_stock(&self, input: ReceiveStock) -> Result<product::Model, ServiceError> {
        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for stock receipt");
            ServiceError::DatabaseError(e)
        })?;

        let product = Self::receive_stock_with(&txn, input).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, product_id = %product.id, "Failed to commit stock receipt");
            ServiceError::DatabaseError(e)
        })?;

        Ok(product)
    }

    /// Receipt logic on a caller-supplied connection or transaction
    pub async fn receive_stock_with<C: ConnectionTrait>(
        conn: &C,
        input: ReceiveStock,
    ) -> Result<product::Model, ServiceError> {
        let name = input.name.trim().to_string();
        validate_stock_fields(&name, input.quantity, input.unit_price)?;

        let existing = product::Entity::find()
            .filter(product::Column::Name.eq(name.as_str()))
            .lock_exclusive()
            .one(conn)
            .await?;

        let saved = match existing {
            None => {
                let model = product::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    name: Set(name.clone()),
                    description: Set(input.description),
                    category: Set(input.category),
                    unit_price: Set(input.unit_price),
                    quantity: Set(input.quantity),
                    cost_per_unit: Set(input.unit_price),
                    ..Default::default()
                }
                .insert(conn)
                .await
                .map_err(|e| name_taken(e, &name))?;
                info!(product_id = %model.id, quantity = model.quantity, "Created product from first receipt");
                model
            }
            Some(current) => {
                let new_quantity = current.quantity.checked_add(input.quantity).ok_or_else(|| {
                    ServiceError::InvalidInput(format!(
                        "receiving {} units would overflow the quantity of product {}",
                        input.quantity, current.id
                    ))
                })?;
                let new_cost = if new_quantity == 0 {
                    current.cost_per_unit
                } else {
                    weighted_average_cost(
                        current.quantity,
                        current.cost_per_unit,
                        input.quantity,
                        input.unit_price,
                    )
                    .ok_or_else(|| {
                        ServiceError::InvalidInput(format!(
                            "weighted average cost overflow for product {}",
                            current.id
                        ))
                    })?
                };

                let product_id = current.id;
                let mut active = current.into_active_model();
                active.quantity = Set(new_quantity);
                active.cost_per_unit = Set(new_cost);
                active.unit_price = Set(input.unit_price);
                if input.description.is_some() {
                    active.description = Set(input.description);
                }
                if input.category.is_some() {
                    active.category = Set(input.category);
                }
                let model = active.update(conn).await?;
                info!(
                    product_id = %product_id,
                    quantity = model.quantity,
                    cost_per_unit = %model.cost_per_unit,
                    "Received stock into existing product"
                );
                model
            }
        };

        counter!("stockflow.stock.receipts", 1);
        Ok(saved)
    }

    /// Adds `delta` to the quantity on hand of a product
    #[instrument(skip(self))]
    pub async fn adjust_on_hand(
        &self,
        product_id: Uuid,
        delta: i32,
    ) -> Result<product::Model, ServiceError> {
        let txn = self.db_pool.begin().await?;
        let product = Self::adjust_on_hand_with(&txn, product_id, delta).await?;
        txn.commit().await?;
        Ok(product)
    }

    /// Adjustment on a caller-supplied connection; the product row is locked for the update
    pub async fn adjust_on_hand_with<C: ConnectionTrait>(
        conn: &C,
        product_id: Uuid,
        delta: i32,
    ) -> Result<product::Model, ServiceError> {
        let current = product::Entity::find_by_id(product_id)
            .lock_exclusive()
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Product, product_id))?;

        let new_quantity = current
            .quantity
            .checked_add(delta)
            .filter(|quantity| *quantity >= 0);
        let Some(new_quantity) = new_quantity else {
            if delta < 0 {
                warn!(
                    product_id = %product_id,
                    requested = -i64::from(delta),
                    available = current.quantity,
                    "Rejected stock adjustment"
                );
                return Err(ServiceError::InsufficientStock {
                    product_id,
                    requested: delta.saturating_neg(),
                    available: current.quantity,
                });
            }
            return Err(ServiceError::InvalidInput(format!(
                "adjustment of {} would overflow the quantity of product {}",
                delta, product_id
            )));
        };

        let mut active = current.into_active_model();
        active.quantity = Set(new_quantity);
        let model = active.update(conn).await?;
        info!(product_id = %product_id, delta, quantity = model.quantity, "Adjusted quantity on hand");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(product_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Product, product_id))
    }

    #[instrument(skip(self))]
    pub async fn get_product_by_name(&self, name: &str) -> Result<product::Model, ServiceError> {
        product::Entity::find()
            .filter(product::Column::Name.eq(name.trim()))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Product, name))
    }

    /// Lists products in creation order; `page` is 1-based
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<product::Model>, u64), ServiceError> {
        let paginator = product::Entity::find()
            .order_by_asc(product::Column::CreatedAt)
            .order_by_asc(product::Column::Id)
            .paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Overwrites the editable fields of a product; cost per unit is left untouched
    #[instrument(skip(self, update), fields(product_id = %product_id))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        update: ProductUpdate,
    ) -> Result<product::Model, ServiceError> {
        let name = update.name.trim().to_string();
        validate_stock_fields(&name, update.quantity, update.unit_price)?;

        let txn = self.db_pool.begin().await?;

        let current = product::Entity::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Product, product_id))?;

        if current.name != name {
            let clash = product::Entity::find()
                .filter(product::Column::Name.eq(name.as_str()))
                .filter(product::Column::Id.ne(product_id))
                .count(&txn)
                .await?;
            if clash > 0 {
                return Err(ServiceError::Conflict(format!(
                    "a product named '{}' already exists",
                    name
                )));
            }
        }

        let mut active = current.into_active_model();
        active.name = Set(name.clone());
        active.description = Set(update.description);
        active.category = Set(update.category);
        active.unit_price = Set(update.unit_price);
        active.quantity = Set(update.quantity);
        let model = active.update(&txn).await.map_err(|e| name_taken(e, &name))?;

        txn.commit().await?;
        info!(product_id = %product_id, "Product updated");
        Ok(model)
    }

    /// Deletes a product that no order line references
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;

        let product = product::Entity::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Product, product_id))?;

        let references = order_line::Entity::find()
            .filter(order_line::Column::ProductId.eq(product_id))
            .count(&txn)
            .await?;
        if references > 0 {
            return Err(ServiceError::Conflict(format!(
                "product {} is referenced by {} order line(s)",
                product_id, references
            )));
        }

        product::Entity::delete_by_id(product.id).exec(&txn).await?;
        txn.commit().await?;
        info!(product_id = %product_id, "Product deleted");
        Ok(())
    }
}

/// Maps a unique-index hit on `products.name` to `Conflict`; a concurrent
/// first receipt of the same name loses the race here.
fn name_taken(err: DbErr, name: &str) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            warn!(product_name = %name, "Product name already taken");
            ServiceError::Conflict(format!("a product named '{}' already exists", name))
        }
        _ => ServiceError::DatabaseError(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn new_product(name: &str) -> product::ActiveModel {
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            unit_price: Set(dec!(2)),
            quantity: Set(3),
            cost_per_unit: Set(dec!(2)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn duplicate_name_insert_is_a_conflict_not_a_storage_error() {
        let pool = db::establish_connection("sqlite::memory:").await.unwrap();
        db::run_migrations(&pool).await.unwrap();

        new_product("Hex nut").insert(&pool).await.unwrap();

        // A receipt that missed the lookup lands on the unique index.
        let err = new_product("Hex nut")
            .insert(&pool)
            .await
            .map_err(|e| name_taken(e, "Hex nut"))
            .unwrap_err();
        assert_matches!(err, ServiceError::Conflict(msg) if msg.contains("Hex nut"));

        let other = name_taken(DbErr::Custom("boom".into()), "Hex nut");
        assert_matches!(other, ServiceError::DatabaseError(_));
    }

    #[test]
    fn weighted_average_matches_worked_example() {
        let cost = weighted_average_cost(10, dec!(100.0), 5, dec!(200.0)).unwrap();
        assert_eq!(cost, dec!(133.3333));
    }

    #[test]
    fn first_lot_into_empty_stock_takes_incoming_price() {
        let cost = weighted_average_cost(0, dec!(0), 8, dec!(12.5)).unwrap();
        assert_eq!(cost, dec!(12.5));
    }

    #[test]
    fn zero_combined_quantity_yields_none() {
        assert!(weighted_average_cost(0, dec!(40), 0, dec!(99)).is_none());
    }

    #[test]
    fn zero_incoming_keeps_existing_cost() {
        let cost = weighted_average_cost(7, dec!(3.25), 0, dec!(1000)).unwrap();
        assert_eq!(cost, dec!(3.25));
    }

    #[test]
    fn rejects_negative_fields() {
        assert!(validate_stock_fields("bolt", -1, dec!(1)).is_err());
        assert!(validate_stock_fields("bolt", 1, dec!(-0.01)).is_err());
        assert!(validate_stock_fields("   ", 1, dec!(1)).is_err());
        assert!(validate_stock_fields("bolt", 0, dec!(0)).is_ok());
    }
}
