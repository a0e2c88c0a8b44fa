use crate::{
    cache::{self, ViewCache},
    entities::{product, restock_event},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Input for creating a product. All required-field presence checks have
/// already happened at the wire boundary; values here are normalized.
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    /// Caller-supplied id; a fresh one is assigned when absent.
    pub id: Option<Uuid>,
    pub name: String,
    pub sku: String,
    pub category: Option<String>,
    pub price: Decimal,
    pub cost: Option<Decimal>,
    pub stock_level: i32,
    pub low_stock_threshold: i32,
    pub description: Option<String>,
}

/// Partial update: absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub stock_level: Option<i32>,
    pub low_stock_threshold: Option<i32>,
    pub description: Option<String>,
}

/// Sole owner of the Product and RestockEvent collections.
/// Every mutation goes through this service; reads observe committed state.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    cache: Arc<ViewCache>,
}

impl InventoryService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        cache: Arc<ViewCache>,
    ) -> Self {
        Self {
            db,
            event_sender,
            cache,
        }
    }

    /// Lists all products in insertion order.
    pub async fn list_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        let products = product::Entity::find()
            .order_by_asc(product::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(products)
    }

    /// Fetches a single product by id.
    pub async fn get_product(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }

    /// Creates a new product.
    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<product::Model, ServiceError> {
        if let Some(id) = input.id {
            if product::Entity::find_by_id(id).one(&*self.db).await?.is_some() {
                return Err(ServiceError::Conflict(format!(
                    "Product with id {} already exists",
                    id
                )));
            }
        }
        self.ensure_unique_sku(&input.sku).await?;

        let product_id = input.id.unwrap_or_else(Uuid::new_v4);
        let now = Utc::now();

        let product = product::ActiveModel {
            id: Set(product_id),
            name: Set(input.name),
            sku: Set(input.sku),
            category: Set(input.category),
            price: Set(input.price),
            cost: Set(input.cost),
            stock_level: Set(input.stock_level),
            low_stock_threshold: Set(input.low_stock_threshold),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(None),
        };

        let product = product.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductCreated(product_id))
            .await;
        self.cache.invalidate(cache::PRODUCT_MUTATION);

        info!("Created product: {}", product_id);
        Ok(product)
    }

    /// Merges the supplied fields into an existing product.
    ///
    /// SKU uniqueness is deliberately not re-checked here; only creation
    /// enforces it. Last write wins, there is no version tracking.
    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: Uuid,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let product = product::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))?;

        let mut active: product::ActiveModel = product.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(sku) = input.sku {
            active.sku = Set(sku);
        }
        if let Some(category) = input.category {
            active.category = Set(Some(category));
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(cost) = input.cost {
            active.cost = Set(Some(cost));
        }
        if let Some(stock_level) = input.stock_level {
            active.stock_level = Set(stock_level);
        }
        if let Some(low_stock_threshold) = input.low_stock_threshold {
            active.low_stock_threshold = Set(low_stock_threshold);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Some(Utc::now()));

        let product = active.update(&txn).await?;
        txn.commit().await?;

        self.event_sender.send_or_log(Event::ProductUpdated(id)).await;
        self.cache.invalidate(cache::PRODUCT_MUTATION);

        info!("Updated product: {}", id);
        Ok(product)
    }

    /// Removes a product. Historical restock events are retained for audit.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = product::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Product {} not found", id)));
        }

        self.event_sender.send_or_log(Event::ProductDeleted(id)).await;
        self.cache.invalidate(cache::PRODUCT_MUTATION);

        info!("Deleted product: {}", id);
        Ok(())
    }

    /// Increases a product's stock level and records a restock event.
    ///
    /// The read-modify-write runs in one transaction with the product row
    /// locked, so concurrent stock movements on the same product serialize
    /// instead of losing increments.
    #[instrument(skip(self))]
    pub async fn restock(
        &self,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<restock_event::Model, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "quantity must be a positive integer".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let product = product::Entity::find_by_id(product_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let previous_stock = product.stock_level;
        let new_stock = previous_stock.checked_add(quantity).ok_or_else(|| {
            ServiceError::ValidationError("quantity overflows the stock level".to_string())
        })?;

        let mut active: product::ActiveModel = product.into();
        active.stock_level = Set(new_stock);
        active.updated_at = Set(Some(Utc::now()));
        active.update(&txn).await?;

        let event = restock_event::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            quantity: Set(quantity),
            previous_stock: Set(previous_stock),
            new_stock: Set(new_stock),
            timestamp: Set(Utc::now()),
        };
        let event = event.insert(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::ProductRestocked {
                product_id,
                quantity,
                previous_stock,
                new_stock,
            })
            .await;
        self.cache.invalidate(cache::RESTOCK_MUTATION);

        info!(
            %product_id,
            quantity, previous_stock, new_stock,
            "Restocked product"
        );
        Ok(event)
    }

    /// Decreases a product's stock level for a sale.
    ///
    /// The movement is recorded in the restock log with a negative quantity,
    /// so event replay sees sales and restocks as one signed stream. Stock
    /// never goes below zero; an oversized purchase is rejected whole.
    #[instrument(skip(self))]
    pub async fn purchase(
        &self,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<restock_event::Model, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "quantity must be a positive integer".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let product = product::Entity::find_by_id(product_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let previous_stock = product.stock_level;
        if quantity > previous_stock {
            return Err(ServiceError::ValidationError("Not enough stock".to_string()));
        }
        let new_stock = previous_stock - quantity;

        let mut active: product::ActiveModel = product.into();
        active.stock_level = Set(new_stock);
        active.updated_at = Set(Some(Utc::now()));
        active.update(&txn).await?;

        let event = restock_event::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            quantity: Set(-quantity),
            previous_stock: Set(previous_stock),
            new_stock: Set(new_stock),
            timestamp: Set(Utc::now()),
        };
        let event = event.insert(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::ProductPurchased {
                product_id,
                quantity,
                previous_stock,
                new_stock,
            })
            .await;
        self.cache.invalidate(cache::RESTOCK_MUTATION);

        info!(
            %product_id,
            quantity, previous_stock, new_stock,
            "Recorded purchase"
        );
        Ok(event)
    }

    /// Lists products at or below their reorder threshold.
    pub async fn list_low_stock(&self) -> Result<Vec<product::Model>, ServiceError> {
        let products = product::Entity::find()
            .filter(
                Expr::col(product::Column::StockLevel)
                    .lte(Expr::col(product::Column::LowStockThreshold)),
            )
            .order_by_asc(product::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(products)
    }

    /// Lists restock events, most recent first, optionally truncated.
    pub async fn list_restocks(
        &self,
        limit: Option<u64>,
    ) -> Result<Vec<restock_event::Model>, ServiceError> {
        let mut query = restock_event::Entity::find()
            .order_by_desc(restock_event::Column::Timestamp);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        let events = query.all(&*self.db).await?;
        Ok(events)
    }

    async fn ensure_unique_sku(&self, sku: &str) -> Result<(), ServiceError> {
        let existing = product::Entity::find()
            .filter(product::Column::Sku.eq(sku))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Product with SKU '{}' already exists",
                sku
            )));
        }
        Ok(())
    }
}
