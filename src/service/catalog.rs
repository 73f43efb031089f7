//! Catalog view and editing.

use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::domain::aggregates::{Category, NewProduct, Product, ProductFilter, ProductPatch};
use crate::store::{CatalogStore, CategoryStore, StoreError};
use crate::{PosError, Result};

/// Selectable products. A failed read yields an empty view instead of an error.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CatalogView {
    pub products: Vec<Product>,
    pub fetch_failed: bool,
}

impl CatalogView {
    pub async fn load(store: &dyn CatalogStore, filter: ProductFilter) -> Self {
        match store.list_products(filter).await {
            Ok(products) => Self { products, fetch_failed: false },
            Err(e) => {
                tracing::warn!(error = %e, category = ?filter.category, "catalog fetch failed");
                Self { products: vec![], fetch_failed: true }
            }
        }
    }
}

/// Fetches one selectable product for a cart edit; read failures count as absent.
pub async fn lookup(store: &dyn CatalogStore, id: Uuid) -> Option<Product> {
    match store.get_product(id).await {
        Ok(product) => product,
        Err(e) => {
            tracing::warn!(error = %e, product_id = %id, "product lookup failed");
            None
        }
    }
}

pub async fn list_categories(store: &dyn CategoryStore) -> Vec<Category> {
    store.list_categories().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "category fetch failed");
        vec![]
    })
}

pub async fn create_product(store: &dyn CatalogStore, draft: NewProduct) -> Result<Product> {
    draft.validate()?;
    let product = store.insert_product(draft).await.map_err(logged("create"))?;
    tracing::info!(product_id = %product.id, name = %product.name, "product created");
    Ok(product)
}

pub async fn update_product(store: &dyn CatalogStore, id: Uuid, patch: ProductPatch) -> Result<Product> {
    patch.validate()?;
    store.update_product(id, patch).await.map_err(not_found_or(logged("update")))
}

pub async fn delete_product(store: &dyn CatalogStore, id: Uuid) -> Result<()> {
    store.soft_delete_product(id).await.map_err(not_found_or(logged("delete")))?;
    tracing::info!(product_id = %id, "product deleted");
    Ok(())
}

fn logged(op: &'static str) -> impl Fn(StoreError) -> PosError {
    move |e| {
        tracing::error!(error = %e, op, "catalog write failed");
        PosError::Storage(e)
    }
}

fn not_found_or(other: impl Fn(StoreError) -> PosError) -> impl Fn(StoreError) -> PosError {
    move |e| match e {
        StoreError::NotFound => PosError::ProductNotFound,
        e => other(e),
    }
}
