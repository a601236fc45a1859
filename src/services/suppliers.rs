use crate::{
    db::DbPool,
    entities::{purchase_order, supplier},
    errors::{EntityKind, ServiceError},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Supplier fields; used for both create and full overwrite on update
#[derive(Debug, Clone, Default)]
pub struct SupplierInput {
    pub company_name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub tax_code: Option<String>,
}

fn checked_company_name(input: &SupplierInput) -> Result<String, ServiceError> {
    let name = input.company_name.trim();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput(
            "supplier company name must not be blank".to_string(),
        ));
    }
    Ok(name.to_string())
}

/// Service for managing suppliers
#[derive(Clone)]
pub struct SupplierService {
    db_pool: Arc<DbPool>,
}

impl SupplierService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Creates a new supplier
    #[instrument(skip(self, input))]
    pub async fn create_supplier(
        &self,
        input: SupplierInput,
    ) -> Result<supplier::Model, ServiceError> {
        let company_name = checked_company_name(&input)?;
        let model = supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_name: Set(company_name),
            address: Set(input.address),
            contact: Set(input.contact),
            email: Set(input.email),
            phone: Set(input.phone),
            city: Set(input.city),
            tax_code: Set(input.tax_code),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(supplier_id = %model.id, "Supplier created");
        Ok(model)
    }

    /// Overwrites every mutable field of a supplier
    #[instrument(skip(self, input))]
    pub async fn update_supplier(
        &self,
        supplier_id: Uuid,
        input: SupplierInput,
    ) -> Result<supplier::Model, ServiceError> {
        let company_name = checked_company_name(&input)?;
        let current = self.get_supplier(supplier_id).await?;

        let mut active = current.into_active_model();
        active.company_name = Set(company_name);
        active.address = Set(input.address);
        active.contact = Set(input.contact);
        active.email = Set(input.email);
        active.phone = Set(input.phone);
        active.city = Set(input.city);
        active.tax_code = Set(input.tax_code);
        let model = active.update(&*self.db_pool).await?;

        info!(supplier_id = %supplier_id, "Supplier updated");
        Ok(model)
    }

    /// Deletes a supplier that no order references
    #[instrument(skip(self))]
    pub async fn delete_supplier(&self, supplier_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;

        supplier::Entity::find_by_id(supplier_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Supplier, supplier_id))?;

        let orders = purchase_order::Entity::find()
            .filter(purchase_order::Column::SupplierId.eq(supplier_id))
            .count(&txn)
            .await?;
        if orders > 0 {
            return Err(ServiceError::Conflict(format!(
                "supplier {} is referenced by {} order(s)",
                supplier_id, orders
            )));
        }

        supplier::Entity::delete_by_id(supplier_id).exec(&txn).await?;
        txn.commit().await?;
        info!(supplier_id = %supplier_id, "Supplier deleted");
        Ok(())
    }

    /// Gets a supplier by ID
    #[instrument(skip(self))]
    pub async fn get_supplier(&self, supplier_id: Uuid) -> Result<supplier::Model, ServiceError> {
        supplier::Entity::find_by_id(supplier_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Supplier, supplier_id))
    }

    /// Lists suppliers in creation order
    #[instrument(skip(self))]
    pub async fn list_suppliers(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<supplier::Model>, u64), ServiceError> {
        let paginator = supplier::Entity::find()
            .order_by_asc(supplier::Column::CreatedAt)
            .order_by_asc(supplier::Column::Id)
            .paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await?;
        let suppliers = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((suppliers, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_company_name_is_rejected() {
        let input = SupplierInput {
            company_name: "   ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            checked_company_name(&input),
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[test]
    fn company_name_is_trimmed() {
        let input = SupplierInput {
            company_name: " Acme Trading ".to_string(),
            ..Default::default()
        };
        assert_eq!(checked_company_name(&input).unwrap(), "Acme Trading");
    }
}
