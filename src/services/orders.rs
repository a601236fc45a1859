//! Order fulfillment.
//!
//! Orders move PENDING -> VALIDATED -> DELIVERED. Reaching DELIVERED depletes
//! stock for every line and records one OUT movement, all inside the
//! transaction that changed the status. `stock_applied` is flipped in that same
//! transaction so a second delivery of the same order touches nothing.

use crate::{
    db::DbPool,
    entities::{order_line, product, purchase_order, stock_movement, supplier, MovementType, OrderStatus},
    errors::{EntityKind, ServiceError},
    services::{products::ProductService, stock_movements::StockMovementService},
};
use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::{collections::BTreeMap, sync::Arc};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// A line requested on order creation or added afterwards
#[derive(Debug, Clone, Copy)]
pub struct NewOrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub supplier_id: Uuid,
    pub status: Option<OrderStatus>,
    pub created_on: Option<DateTime<Utc>>,
    pub lines: Vec<NewOrderLine>,
}

/// Fields an update may change; `None` leaves the stored value alone
#[derive(Debug, Clone, Default)]
pub struct UpdateOrder {
    pub status: Option<OrderStatus>,
    pub supplier_id: Option<Uuid>,
    pub created_on: Option<DateTime<Utc>>,
}

/// An order together with its lines
#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub order: purchase_order::Model,
    pub lines: Vec<order_line::Model>,
}

#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Creates an order with its lines; a DELIVERED order is fulfilled before commit
    #[instrument(skip(self, input), fields(supplier_id = %input.supplier_id, lines = input.lines.len()))]
    pub async fn create_order(&self, input: CreateOrder) -> Result<OrderDetails, ServiceError> {
        let status = input.status.unwrap_or_default();

        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for order creation");
            ServiceError::DatabaseError(e)
        })?;

        ensure_supplier_exists(&txn, input.supplier_id).await?;

        let order = purchase_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            supplier_id: Set(input.supplier_id),
            created_on: Set(input.created_on.unwrap_or_else(Utc::now)),
            status: Set(status),
            total_amount: Set(Decimal::ZERO),
            stock_applied: Set(false),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for requested in &input.lines {
            lines.push(insert_line(&txn, order.id, *requested).await?);
        }

        let mut order = if lines.is_empty() {
            order
        } else {
            let total = line_total(&lines)?;
            let mut active = order.into_active_model();
            active.total_amount = Set(total);
            active.update(&txn).await?
        };

        if status == OrderStatus::Delivered {
            order = Self::deliver(&txn, order).await?;
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order.id, "Failed to commit order creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order.id, status = %order.status, total_amount = %order.total_amount, "Order created");
        Ok(OrderDetails { order, lines })
    }

    /// Applies an update; moving to DELIVERED fulfils the order unless stock was already applied
    #[instrument(skip(self, update), fields(order_id = %order_id))]
    pub async fn update_order(
        &self,
        order_id: Uuid,
        update: UpdateOrder,
    ) -> Result<purchase_order::Model, ServiceError> {
        let txn = self.db_pool.begin().await?;

        let current = purchase_order::Entity::find_by_id(order_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Order, order_id))?;

        let target = update.status.unwrap_or(current.status);
        if !current.status.can_transition_to(target) {
            return Err(ServiceError::InvalidInput(format!(
                "order {} cannot move from {} back to {}",
                order_id, current.status, target
            )));
        }

        if let Some(supplier_id) = update.supplier_id {
            ensure_supplier_exists(&txn, supplier_id).await?;
        }

        let previous = current.status;
        let mut active = current.into_active_model();
        active.status = Set(target);
        if let Some(supplier_id) = update.supplier_id {
            active.supplier_id = Set(supplier_id);
        }
        if let Some(created_on) = update.created_on {
            active.created_on = Set(created_on);
        }
        let mut order = active.update(&txn).await?;

        if target == OrderStatus::Delivered {
            order = Self::deliver(&txn, order).await?;
        }

        txn.commit().await?;
        info!(order_id = %order_id, from = %previous, to = %target, "Order updated");
        Ok(order)
    }

    /// Attaches a line to an order that has not been delivered yet
    #[instrument(skip(self))]
    pub async fn add_order_line(
        &self,
        order_id: Uuid,
        line: NewOrderLine,
    ) -> Result<order_line::Model, ServiceError> {
        let txn = self.db_pool.begin().await?;

        let order = purchase_order::Entity::find_by_id(order_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Order, order_id))?;

        if order.status == OrderStatus::Delivered {
            return Err(ServiceError::InvalidInput(format!(
                "order {} is already delivered; its lines are frozen",
                order_id
            )));
        }

        let saved = insert_line(&txn, order_id, line).await?;
        let line_amount = amount_of(&saved)?;
        let total = order.total_amount.checked_add(line_amount).ok_or_else(|| {
            ServiceError::InvalidInput(format!("total amount of order {} overflows", order_id))
        })?;
        let mut active = order.into_active_model();
        active.total_amount = Set(total);
        active.update(&txn).await?;

        txn.commit().await?;
        info!(order_id = %order_id, line_id = %saved.id, product_id = %saved.product_id, quantity = saved.quantity, "Order line added");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderDetails, ServiceError> {
        let db = &*self.db_pool;
        let order = purchase_order::Entity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Order, order_id))?;
        let lines = lines_of(db, order_id).await?;
        Ok(OrderDetails { order, lines })
    }

    /// Lists orders newest first; `page` is 1-based
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<purchase_order::Model>, u64), ServiceError> {
        let paginator = purchase_order::Entity::find()
            .order_by_desc(purchase_order::Column::CreatedOn)
            .order_by_asc(purchase_order::Column::Id)
            .paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((orders, total))
    }

    #[instrument(skip(self))]
    pub async fn order_lines(&self, order_id: Uuid) -> Result<Vec<order_line::Model>, ServiceError> {
        let db = &*self.db_pool;
        purchase_order::Entity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Order, order_id))?;
        lines_of(db, order_id).await
    }

    /// Deletes an order whose stock has not been applied, along with its lines and movements
    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;

        let order = purchase_order::Entity::find_by_id(order_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Order, order_id))?;

        if order.stock_applied {
            return Err(ServiceError::Conflict(format!(
                "order {} has already depleted stock and cannot be deleted",
                order_id
            )));
        }

        stock_movement::Entity::delete_many()
            .filter(stock_movement::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        order_line::Entity::delete_many()
            .filter(order_line::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        purchase_order::Entity::delete_by_id(order_id)
            .exec(&txn)
            .await?;

        txn.commit().await?;
        info!(order_id = %order_id, "Order deleted");
        Ok(())
    }

    /// Depletes stock for every line of `order` and records the OUT movement.
    ///
    /// Every product is checked before any is touched, so a shortfall on one
    /// line leaves all products as they were. A no-op once `stock_applied` is set.
    pub async fn deliver<C: ConnectionTrait>(
        conn: &C,
        order: purchase_order::Model,
    ) -> Result<purchase_order::Model, ServiceError> {
        if order.stock_applied {
            info!(order_id = %order.id, "Stock already applied, skipping delivery");
            return Ok(order);
        }

        let lines = lines_of(conn, order.id).await?;
        let required = required_per_product(&lines);

        for (&product_id, &requested) in &required {
            let product = product::Entity::find_by_id(product_id)
                .lock_exclusive()
                .one(conn)
                .await?
                .ok_or_else(|| ServiceError::not_found(EntityKind::Product, product_id))?;

            if requested > i64::from(product.quantity) {
                warn!(
                    order_id = %order.id,
                    product_id = %product_id,
                    requested,
                    available = product.quantity,
                    "Rejected delivery for insufficient stock"
                );
                counter!("stockflow.orders.delivery_rejected", 1);
                return Err(ServiceError::InsufficientStock {
                    product_id,
                    requested: i32::try_from(requested).unwrap_or(i32::MAX),
                    available: product.quantity,
                });
            }
        }

        for (&product_id, &requested) in &required {
            // Bounded by the quantity checked above
            let delta = i32::try_from(requested).map_err(|_| {
                ServiceError::InternalError(format!("delivery quantity {} out of range", requested))
            })?;
            ProductService::adjust_on_hand_with(conn, product_id, -delta).await?;
        }

        let movement =
            StockMovementService::record_movement_with(conn, order.id, MovementType::Out, None)
                .await?;

        let order_id = order.id;
        let mut active = order.into_active_model();
        active.stock_applied = Set(true);
        let order = active.update(conn).await?;

        counter!("stockflow.orders.delivered", 1);
        info!(
            order_id = %order_id,
            movement_id = %movement.id,
            quantity = movement.quantity,
            products = required.len(),
            "Order delivered"
        );
        Ok(order)
    }
}

/// Sums line quantities per product
pub fn required_per_product(lines: &[order_line::Model]) -> BTreeMap<Uuid, i64> {
    let mut required = BTreeMap::new();
    for line in lines {
        *required.entry(line.product_id).or_insert(0_i64) += i64::from(line.quantity);
    }
    required
}

async fn ensure_supplier_exists<C: ConnectionTrait>(
    conn: &C,
    supplier_id: Uuid,
) -> Result<(), ServiceError> {
    supplier::Entity::find_by_id(supplier_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| ServiceError::not_found(EntityKind::Supplier, supplier_id))
}

async fn lines_of<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> Result<Vec<order_line::Model>, ServiceError> {
    Ok(order_line::Entity::find()
        .filter(order_line::Column::OrderId.eq(order_id))
        .order_by_asc(order_line::Column::CreatedAt)
        .order_by_asc(order_line::Column::Id)
        .all(conn)
        .await?)
}

/// Persists a line, capturing the product's current unit price
async fn insert_line<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    line: NewOrderLine,
) -> Result<order_line::Model, ServiceError> {
    if line.quantity <= 0 {
        return Err(ServiceError::InvalidInput(format!(
            "order line quantity must be positive, got {}",
            line.quantity
        )));
    }

    let product = product::Entity::find_by_id(line.product_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Product, line.product_id))?;

    Ok(order_line::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        product_id: Set(product.id),
        quantity: Set(line.quantity),
        unit_price: Set(product.unit_price),
        ..Default::default()
    }
    .insert(conn)
    .await?)
}

fn amount_of(line: &order_line::Model) -> Result<Decimal, ServiceError> {
    Decimal::from(line.quantity)
        .checked_mul(line.unit_price)
        .ok_or_else(|| ServiceError::InvalidInput(format!("amount of line {} overflows", line.id)))
}

fn line_total(lines: &[order_line::Model]) -> Result<Decimal, ServiceError> {
    lines.iter().try_fold(Decimal::ZERO, |acc, line| {
        acc.checked_add(amount_of(line)?)
            .ok_or_else(|| ServiceError::InvalidInput("order total overflows".to_string()))
    })
}
