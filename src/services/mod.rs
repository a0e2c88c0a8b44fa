pub mod analytics;
pub mod inventory;
