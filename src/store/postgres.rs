//! Postgres-backed stores.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{to_db_quantity, CatalogStore, CategoryStore, SalesStore, StoreError};
use crate::domain::aggregates::{Category, NewProduct, OrderSubmission, Product, ProductFilter, ProductPatch, SaleRecord};

#[derive(Clone, Debug)]
pub struct PgStore { pool: PgPool }

impl PgStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE deleted_at IS NULL AND ($1::uuid IS NULL OR category_id = $1) ORDER BY name, created_at")
            .bind(filter.category).fetch_all(&self.pool).await?;
        Ok(products)
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND deleted_at IS NULL")
            .bind(id).fetch_optional(&self.pool).await?;
        Ok(product)
    }

    async fn insert_product(&self, p: NewProduct) -> Result<Product, StoreError> {
        let product = sqlx::query_as::<_, Product>("INSERT INTO products (id, name, description, unit_price, image_url, category_id, stock, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, NOW()) RETURNING *")
            .bind(Uuid::now_v7()).bind(&p.name).bind(&p.description).bind(p.unit_price).bind(&p.image_url).bind(p.category_id).bind(p.stock)
            .fetch_one(&self.pool).await?;
        Ok(product)
    }

    async fn update_product(&self, id: Uuid, p: ProductPatch) -> Result<Product, StoreError> {
        sqlx::query_as::<_, Product>("UPDATE products SET name = COALESCE($2, name), description = COALESCE($3, description), unit_price = COALESCE($4, unit_price), image_url = COALESCE($5, image_url), category_id = COALESCE($6, category_id), stock = COALESCE($7, stock) WHERE id = $1 AND deleted_at IS NULL RETURNING *")
            .bind(id).bind(&p.name).bind(&p.description).bind(p.unit_price).bind(&p.image_url).bind(p.category_id).bind(p.stock)
            .fetch_optional(&self.pool).await?.ok_or(StoreError::NotFound)
    }

    async fn soft_delete_product(&self, id: Uuid) -> Result<(), StoreError> {
        let done = sqlx::query("UPDATE products SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL").bind(id).execute(&self.pool).await?;
        if done.rows_affected() == 0 { return Err(StoreError::NotFound); }
        Ok(())
    }
}

#[async_trait]
impl CategoryStore for PgStore {
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let cats = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE deleted_at IS NULL ORDER BY name").fetch_all(&self.pool).await?;
        Ok(cats)
    }
}

#[async_trait]
impl SalesStore for PgStore {
    async fn insert_batch(&self, records: Vec<OrderSubmission>) -> Result<(), StoreError> {
        if records.is_empty() { return Ok(()); }
        let rows = records
            .iter()
            .map(|r| Ok((Uuid::now_v7(), r, to_db_quantity(r.quantity)?)))
            .collect::<Result<Vec<_>, StoreError>>()?;
        // a single multi-row INSERT is atomic on its own
        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO sales (id, product_id, quantity, line_total, created_at) ");
        qb.push_values(rows, |mut b, (id, r, quantity)| {
            b.push_bind(id).push_bind(r.product_id).push_bind(quantity).push_bind(r.line_total).push_bind(r.created_at);
        });
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn list_sales(&self) -> Result<Vec<SaleRecord>, StoreError> {
        let sales = sqlx::query_as::<_, SaleRecord>("SELECT s.id, s.product_id, COALESCE(p.name, '') AS product_name, s.quantity, s.line_total, s.created_at, s.deleted_at FROM sales s LEFT JOIN products p ON p.id = s.product_id WHERE s.deleted_at IS NULL ORDER BY s.created_at DESC")
            .fetch_all(&self.pool).await?;
        Ok(sales)
    }

    async fn soft_delete_sale(&self, id: Uuid) -> Result<(), StoreError> {
        let done = sqlx::query("UPDATE sales SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL").bind(id).execute(&self.pool).await?;
        if done.rows_affected() == 0 { return Err(StoreError::NotFound); }
        Ok(())
    }
}
