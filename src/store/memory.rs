//! In-process stores for running without a database, with failure injection for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{to_db_quantity, CatalogStore, CategoryStore, SalesStore, StoreError};
use crate::domain::aggregates::{Category, NewProduct, OrderSubmission, Product, ProductFilter, ProductPatch, SaleRecord};

#[derive(Debug, Default)]
struct Tables {
    products: Vec<Product>,
    categories: Vec<Category>,
    sales: Vec<SaleRecord>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    batch_writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub async fn add_category(&self, name: &str) -> Category {
        let category = Category { id: Uuid::now_v7(), name: name.to_string(), created_at: Utc::now(), deleted_at: None };
        self.tables.lock().await.categories.push(category.clone());
        category
    }

    pub fn fail_reads(&self, fail: bool) { self.fail_reads.store(fail, Ordering::SeqCst); }
    pub fn fail_writes(&self, fail: bool) { self.fail_writes.store(fail, Ordering::SeqCst); }

    /// Number of `insert_batch` calls received, failed ones included.
    pub fn batch_writes(&self) -> usize { self.batch_writes.load(Ordering::SeqCst) }

    /// Every sale row, tombstones included.
    pub async fn all_sales(&self) -> Vec<SaleRecord> { self.tables.lock().await.sales.clone() }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) { return Err(StoreError::Unavailable("reads disabled".into())); }
        Ok(())
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) { return Err(StoreError::Unavailable("writes disabled".into())); }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError> {
        self.check_reads()?;
        let mut products: Vec<Product> = self.tables.lock().await.products.iter().filter(|p| filter.matches(p)).cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(products)
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        self.check_reads()?;
        Ok(self.tables.lock().await.products.iter().find(|p| p.id == id && !p.is_deleted()).cloned())
    }

    async fn insert_product(&self, p: NewProduct) -> Result<Product, StoreError> {
        self.check_writes()?;
        let product = Product {
            id: Uuid::now_v7(), name: p.name, description: p.description, unit_price: p.unit_price,
            image_url: p.image_url, category_id: p.category_id, stock: p.stock, created_at: Utc::now(), deleted_at: None,
        };
        self.tables.lock().await.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Product, StoreError> {
        self.check_writes()?;
        let mut tables = self.tables.lock().await;
        let product = tables.products.iter_mut().find(|p| p.id == id && !p.is_deleted()).ok_or(StoreError::NotFound)?;
        patch.apply(product);
        Ok(product.clone())
    }

    async fn soft_delete_product(&self, id: Uuid) -> Result<(), StoreError> {
        self.check_writes()?;
        let mut tables = self.tables.lock().await;
        let product = tables.products.iter_mut().find(|p| p.id == id && !p.is_deleted()).ok_or(StoreError::NotFound)?;
        product.deleted_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.check_reads()?;
        let mut cats: Vec<Category> = self.tables.lock().await.categories.iter().filter(|c| c.deleted_at.is_none()).cloned().collect();
        cats.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cats)
    }
}

#[async_trait]
impl SalesStore for MemoryStore {
    async fn insert_batch(&self, records: Vec<OrderSubmission>) -> Result<(), StoreError> {
        self.batch_writes.fetch_add(1, Ordering::SeqCst);
        self.check_writes()?;
        let mut tables = self.tables.lock().await;
        let mut rows = Vec::with_capacity(records.len());
        for r in records {
            let product_name = tables.products.iter().find(|p| p.id == r.product_id).map(|p| p.name.clone()).unwrap_or_default();
            rows.push(SaleRecord {
                id: Uuid::now_v7(), product_id: r.product_id, product_name, quantity: to_db_quantity(r.quantity)?,
                line_total: r.line_total, created_at: r.created_at, deleted_at: None,
            });
        }
        tables.sales.extend(rows);
        Ok(())
    }

    async fn list_sales(&self) -> Result<Vec<SaleRecord>, StoreError> {
        self.check_reads()?;
        let mut sales: Vec<SaleRecord> = self.tables.lock().await.sales.iter().filter(|s| s.deleted_at.is_none()).cloned().collect();
        sales.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(sales)
    }

    async fn soft_delete_sale(&self, id: Uuid) -> Result<(), StoreError> {
        self.check_writes()?;
        let mut tables = self.tables.lock().await;
        let sale = tables.sales.iter_mut().find(|s| s.id == id && s.deleted_at.is_none()).ok_or(StoreError::NotFound)?;
        sale.deleted_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn new_product(name: &str, category_id: Option<Uuid>) -> NewProduct {
        NewProduct { name: name.into(), description: None, unit_price: Decimal::new(500, 2), image_url: "x.jpg".into(), category_id, stock: 1 }
    }

    #[tokio::test]
    async fn test_catalog_filters_tombstones_and_category() {
        let store = MemoryStore::new();
        let doces = store.add_category("Doces").await;
        let canjica = store.insert_product(new_product("Canjica", Some(doces.id))).await.unwrap();
        let pastel = store.insert_product(new_product("Pastel", None)).await.unwrap();
        store.soft_delete_product(pastel.id).await.unwrap();

        let all = store.list_products(ProductFilter::default()).await.unwrap();
        assert_eq!(all.iter().map(|p| p.id).collect::<Vec<_>>(), vec![canjica.id]);
        let sweets = store.list_products(ProductFilter { category: Some(doces.id) }).await.unwrap();
        assert_eq!(sweets.len(), 1);
        assert!(store.get_product(pastel.id).await.unwrap().is_none());
        assert!(matches!(store.soft_delete_product(pastel.id).await, Err(StoreError::NotFound)));
        assert!(matches!(store.update_product(pastel.id, ProductPatch::default()).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_failed_batch_writes_nothing() {
        let store = MemoryStore::new();
        store.fail_writes(true);
        let record = OrderSubmission { product_id: Uuid::nil(), quantity: 1, line_total: Decimal::ONE, created_at: Utc::now() };
        assert!(store.insert_batch(vec![record.clone(), record]).await.is_err());
        assert_eq!(store.batch_writes(), 1);
        store.fail_writes(false);
        assert!(store.list_sales().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sales_join_names_and_void() {
        let store = MemoryStore::new();
        let milho = store.insert_product(new_product("Milho", None)).await.unwrap();
        let record = OrderSubmission { product_id: milho.id, quantity: 2, line_total: Decimal::new(1000, 2), created_at: Utc::now() };
        store.insert_batch(vec![record]).await.unwrap();
        let sales = store.list_sales().await.unwrap();
        assert_eq!(sales[0].product_name, "Milho");
        store.soft_delete_sale(sales[0].id).await.unwrap();
        assert!(store.list_sales().await.unwrap().is_empty());
        assert_eq!(store.all_sales().await.len(), 1);
    }
}
