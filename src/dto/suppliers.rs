use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{entities::supplier, services::suppliers::SupplierInput};

/// Body of supplier create and update; update overwrites every field
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct SupplierRequest {
    #[validate(length(min = 1, max = 255))]
    #[schema(example = "Acme Trading")]
    pub company_name: String,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 255))]
    pub contact: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 50))]
    pub tax_code: Option<String>,
}

impl From<SupplierRequest> for SupplierInput {
    fn from(req: SupplierRequest) -> Self {
        SupplierInput {
            company_name: req.company_name,
            address: req.address,
            contact: req.contact,
            email: req.email,
            phone: req.phone,
            city: req.city,
            tax_code: req.tax_code,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupplierResponse {
    pub id: Uuid,
    pub company_name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub tax_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<supplier::Model> for SupplierResponse {
    fn from(model: supplier::Model) -> Self {
        Self {
            id: model.id,
            company_name: model.company_name,
            address: model.address,
            contact: model.contact,
            email: model.email,
            phone: model.phone,
            city: model.city,
            tax_code: model.tax_code,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
