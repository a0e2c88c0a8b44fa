pub mod product;
pub mod restock_event;
