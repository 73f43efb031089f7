//! Stores backing the stall: catalog, categories, sales and product images.
//!
//! Every table store treats `deleted_at` as a tombstone: reads filter it and
//! deletes only set it. There is no purge path.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::aggregates::{Category, NewProduct, OrderSubmission, Product, ProductFilter, ProductPatch, SaleRecord};
use crate::domain::value_objects::ImagePath;

pub mod images;
pub mod memory;
pub mod postgres;

pub use images::LocalImageStore;
pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("record not found")]
    NotFound,
    #[error("record already exists")]
    Conflict,
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError>;
    /// `None` for unknown or deleted ids.
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, StoreError>;
    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError>;
    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Product, StoreError>;
    async fn soft_delete_product(&self, id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync + 'static {
    /// Non-deleted categories ordered by name.
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;
}

#[async_trait]
pub trait SalesStore: Send + Sync + 'static {
    /// Writes all records in one call; either every row lands or none does.
    async fn insert_batch(&self, records: Vec<OrderSubmission>) -> Result<(), StoreError>;
    /// Non-deleted sales, newest first.
    async fn list_sales(&self) -> Result<Vec<SaleRecord>, StoreError>;
    async fn soft_delete_sale(&self, id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ImageStore: Send + Sync + 'static {
    /// Stores `bytes` at `path` and returns its public URL. Existing objects are not replaced.
    async fn upload(&self, path: &ImagePath, bytes: Vec<u8>) -> Result<String, StoreError>;
    async fn remove(&self, path: &ImagePath) -> Result<(), StoreError>;
}

pub(crate) fn to_db_quantity(quantity: u32) -> Result<i32, StoreError> {
    i32::try_from(quantity).map_err(|_| StoreError::InvalidRecord(format!("quantity {quantity} out of range")))
}
