//! Wire types for the HTTP surface.
//!
//! Requests carry `validator` rules and convert into service inputs; responses
//! are built from entity models with ids flattened.

pub mod orders;
pub mod products;
pub mod stock_movements;
pub mod suppliers;

use rust_decimal::Decimal;
use validator::ValidationError;

pub(crate) fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}
