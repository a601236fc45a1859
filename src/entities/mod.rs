pub mod order_line;
pub mod product;
pub mod purchase_order;
pub mod stock_movement;
pub mod supplier;

pub use purchase_order::OrderStatus;
pub use stock_movement::MovementType;
