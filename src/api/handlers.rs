use axum::{body::Bytes, extract::{Path, Query, State}, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;
use crate::domain::aggregates::{CartSnapshot, Category, NewProduct, Product, ProductFilter, ProductPatch, SaleRecord};
use crate::domain::value_objects::ImagePath;
use crate::service::{catalog, sales, CatalogView, ConfirmOutcome, DashboardView};
use crate::store::StoreError;
use crate::{PosError, Result};

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "service": "stall-pos"}))
}

pub async fn list_products(State(s): State<AppState>, Query(filter): Query<ProductFilter>) -> Json<CatalogView> {
    Json(CatalogView::load(s.catalog.as_ref(), filter).await)
}

pub async fn create_product(State(s): State<AppState>, Json(r): Json<NewProduct>) -> Result<(StatusCode, Json<Product>)> {
    let p = catalog::create_product(s.catalog.as_ref(), r).await?;
    Ok((StatusCode::CREATED, Json(p)))
}

pub async fn update_product(State(s): State<AppState>, Path(id): Path<Uuid>, Json(r): Json<ProductPatch>) -> Result<Json<Product>> {
    Ok(Json(catalog::update_product(s.catalog.as_ref(), id, r).await?))
}

pub async fn delete_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    catalog::delete_product(s.catalog.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_categories(State(s): State<AppState>) -> Json<Vec<Category>> {
    Json(catalog::list_categories(s.categories.as_ref()).await)
}

pub async fn get_cart(State(s): State<AppState>) -> Json<CartSnapshot> {
    Json(s.checkout.snapshot().await)
}

#[derive(Debug, Deserialize)] pub struct SetQuantityRequest { pub quantity: u32 }

pub async fn set_cart_quantity(State(s): State<AppState>, Path(product_id): Path<Uuid>, Json(r): Json<SetQuantityRequest>) -> Result<Json<CartSnapshot>> {
    let found = if r.quantity == 0 { None } else { catalog::lookup(s.catalog.as_ref(), product_id).await };
    Ok(Json(s.checkout.set_quantity(product_id, r.quantity, found.as_slice()).await?))
}

pub async fn remove_cart_line(State(s): State<AppState>, Path(product_id): Path<Uuid>) -> Result<Json<CartSnapshot>> {
    Ok(Json(s.checkout.remove_line(&product_id).await?))
}

pub async fn confirm_checkout(State(s): State<AppState>) -> Result<Json<ConfirmOutcome>> {
    Ok(Json(s.checkout.confirm_order().await?))
}

pub async fn dismiss_checkout(State(s): State<AppState>) -> Json<CartSnapshot> {
    Json(s.checkout.dismiss_confirmation().await)
}

pub async fn list_sales(State(s): State<AppState>) -> Json<Vec<SaleRecord>> {
    Json(sales::list_sales(s.sales.as_ref()).await)
}

pub async fn void_sale(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    sales::void_sale(s.sales.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn dashboard(State(s): State<AppState>) -> Json<DashboardView> {
    Json(DashboardView::load(s.sales.as_ref()).await)
}

pub async fn upload_image(State(s): State<AppState>, Path(path): Path<String>, body: Bytes) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let path = ImagePath::new(path)?;
    let url = s.images.upload(&path, body.to_vec()).await.map_err(|e| {
        tracing::error!(error = %e, path = %path, "image upload failed");
        PosError::from(e)
    })?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({"path": path, "url": url}))))
}

pub async fn remove_image(State(s): State<AppState>, Path(path): Path<String>) -> Result<StatusCode> {
    let path = ImagePath::new(path)?;
    match s.images.remove(&path).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(StoreError::NotFound) => Err(PosError::ImageNotFound),
        Err(e) => {
            tracing::error!(error = %e, path = %path, "image removal failed");
            Err(e.into())
        }
    }
}
