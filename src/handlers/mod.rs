pub mod analytics;
pub mod common;
pub mod dashboard;
pub mod products;
pub mod restocks;
