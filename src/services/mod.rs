// Core ledger and fulfillment
pub mod orders;
pub mod products;
pub mod stock_movements;

// Reference data
pub mod suppliers;
