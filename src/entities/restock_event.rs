use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Restock event entity: an append-only audit record of a stock movement.
///
/// Rows are created exactly once when a restock or purchase succeeds and are
/// never mutated or deleted. There is intentionally no database-level foreign
/// key to `products` so that history survives product deletion.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "restock_events")]
pub struct Model {
    /// Primary key
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// The restocked product
    pub product_id: Uuid,

    /// Signed quantity delta: positive for restocks, negative for purchases
    pub quantity: i32,

    /// On-hand quantity captured immediately before the movement
    pub previous_stock: i32,

    /// On-hand quantity after the movement (`previous_stock + quantity`)
    pub new_stock: i32,

    /// Creation time, immutable
    pub timestamp: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
