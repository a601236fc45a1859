//! Stock movement recorder.
//!
//! A movement's quantity is always derived from the lines of its order at the
//! time it is recorded; the date is the caller's when it parses, today otherwise.

use crate::{
    db::DbPool,
    entities::{order_line, purchase_order, stock_movement, MovementType},
    errors::{EntityKind, ServiceError},
};
use chrono::{DateTime, NaiveDate, Utc};
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Resolves the date of a movement.
///
/// Absent or blank input falls back to `today`. Accepts `YYYY-MM-DD` and full
/// RFC 3339 timestamps (the calendar date part is kept); anything else is rejected.
pub fn resolve_movement_date(
    supplied: Option<&str>,
    today: NaiveDate,
) -> Result<NaiveDate, ServiceError> {
    let raw = match supplied.map(str::trim) {
        None | Some("") => return Ok(today),
        Some(raw) => raw,
    };

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| {
            ServiceError::InvalidInput(format!(
                "movement date '{}' is not a valid ISO-8601 date",
                raw
            ))
        })
}

/// Service recording and querying stock movements
#[derive(Clone)]
pub struct StockMovementService {
    db_pool: Arc<DbPool>,
}

impl StockMovementService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Records a movement for `order_id`; quantity is the sum of the order's lines
    #[instrument(skip(self))]
    pub async fn record_movement(
        &self,
        order_id: Uuid,
        movement_type: MovementType,
        supplied_date: Option<String>,
    ) -> Result<stock_movement::Model, ServiceError> {
        let txn = self.db_pool.begin().await?;
        let movement =
            Self::record_movement_with(&txn, order_id, movement_type, supplied_date.as_deref())
                .await?;
        txn.commit().await?;
        Ok(movement)
    }

    /// Recording logic on a caller-supplied connection or transaction
    pub async fn record_movement_with<C: ConnectionTrait>(
        conn: &C,
        order_id: Uuid,
        movement_type: MovementType,
        supplied_date: Option<&str>,
    ) -> Result<stock_movement::Model, ServiceError> {
        purchase_order::Entity::find_by_id(order_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Order, order_id))?;

        let movement_date = resolve_movement_date(supplied_date, Utc::now().date_naive())?;

        let lines = order_line::Entity::find()
            .filter(order_line::Column::OrderId.eq(order_id))
            .all(conn)
            .await?;
        let total: i64 = lines.iter().map(|line| i64::from(line.quantity)).sum();
        let quantity = i32::try_from(total).map_err(|_| {
            ServiceError::InvalidInput(format!(
                "order {} line quantities sum to {}, beyond the supported range",
                order_id, total
            ))
        })?;

        let movement = stock_movement::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            movement_type: Set(movement_type),
            quantity: Set(quantity),
            movement_date: Set(movement_date),
            created_at: Set(Utc::now()),
        }
        .insert(conn)
        .await?;

        counter!("stockflow.stock.movements_recorded", 1);
        info!(
            movement_id = %movement.id,
            order_id = %order_id,
            movement_type = %movement_type,
            quantity,
            movement_date = %movement_date,
            "Recorded stock movement"
        );
        Ok(movement)
    }

    /// Sum of `quantity` over every movement, IN and OUT alike
    #[instrument(skip(self))]
    pub async fn total_movement_quantity(&self) -> Result<i64, ServiceError> {
        let total: Option<Option<i64>> = stock_movement::Entity::find()
            .select_only()
            .column_as(stock_movement::Column::Quantity.sum(), "total")
            .into_tuple()
            .one(&*self.db_pool)
            .await?;
        Ok(total.flatten().unwrap_or(0))
    }

    #[instrument(skip(self))]
    pub async fn get_movement(
        &self,
        movement_id: Uuid,
    ) -> Result<stock_movement::Model, ServiceError> {
        stock_movement::Entity::find_by_id(movement_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::StockMovement, movement_id))
    }

    /// Lists movements newest first; `page` is 1-based
    #[instrument(skip(self))]
    pub async fn list_movements(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<stock_movement::Model>, u64), ServiceError> {
        let paginator = stock_movement::Entity::find()
            .order_by_desc(stock_movement::Column::CreatedAt)
            .order_by_asc(stock_movement::Column::Id)
            .paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    #[instrument(skip(self))]
    pub async fn movements_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<stock_movement::Model>, ServiceError> {
        let db = &*self.db_pool;
        purchase_order::Entity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Order, order_id))?;

        Ok(stock_movement::Entity::find()
            .filter(stock_movement::Column::OrderId.eq(order_id))
            .order_by_asc(stock_movement::Column::CreatedAt)
            .all(db)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn absent_or_blank_date_falls_back_to_today() {
        assert_eq!(resolve_movement_date(None, today()).unwrap(), today());
        assert_eq!(resolve_movement_date(Some("  "), today()).unwrap(), today());
    }

    #[test]
    fn supplied_date_is_kept_verbatim() {
        assert_eq!(
            resolve_movement_date(Some("2023-01-31"), today()).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 31).unwrap()
        );
    }

    #[test]
    fn timestamp_keeps_its_calendar_date() {
        assert_eq!(
            resolve_movement_date(Some("2023-03-05T23:10:00+02:00"), today()).unwrap(),
            NaiveDate::from_ymd_opt(2023, 3, 5).unwrap()
        );
    }

    #[test]
    fn unparseable_date_is_invalid_input() {
        assert_matches!(
            resolve_movement_date(Some("31/01/2023"), today()),
            Err(ServiceError::InvalidInput(_))
        );
        assert_matches!(
            resolve_movement_date(Some("2023-02-30"), today()),
            Err(ServiceError::InvalidInput(_))
        );
    }
}
