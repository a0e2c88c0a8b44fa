use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ConnectionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Product entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Primary key
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Product name
    #[validate(length(
        min = 1,
        max = 255,
        message = "Product name must be between 1 and 255 characters"
    ))]
    pub name: String,

    /// SKU (Stock Keeping Unit)
    #[validate(length(
        min = 1,
        max = 100,
        message = "SKU must be between 1 and 100 characters"
    ))]
    pub sku: String,

    /// Free-text category
    pub category: Option<String>,

    /// Selling price per unit
    pub price: Decimal,

    /// Unit cost (used for margin calculations)
    pub cost: Option<Decimal>,

    /// Current on-hand quantity, never negative
    #[validate(range(min = 0, message = "Stock level cannot be negative"))]
    pub stock_level: i32,

    /// Reorder trigger point
    #[validate(range(min = 1, message = "Low stock threshold must be positive"))]
    pub low_stock_threshold: i32,

    /// Product description
    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: Option<DateTime<Utc>>,
}

/// Product entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::restock_event::Entity")]
    RestockEvents,
}

impl Related<super::restock_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RestockEvents.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let model: Model = self.clone().try_into().map_err(|_| {
            DbErr::Custom("Failed to convert ActiveModel to Model for validation".to_string())
        })?;

        if let Err(err) = model.validate() {
            return Err(DbErr::Custom(format!("Validation error: {}", err)));
        }

        Ok(self)
    }
}

impl Model {
    /// Whether the product is at or below its reorder point.
    pub fn is_low_stock(&self) -> bool {
        self.stock_level <= self.low_stock_threshold
    }
}
