//! HTTP surface of the stall.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::domain::aggregates::CheckoutError;
use crate::service::CheckoutService;
use crate::store::{CatalogStore, CategoryStore, ImageStore, SalesStore, StoreError};
use crate::PosError;

pub mod auth;
mod handlers;

/// Store handles built once at startup and shared read-only by every request.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub sales: Arc<dyn SalesStore>,
    pub images: Arc<dyn ImageStore>,
    pub checkout: CheckoutService,
    pub password: Arc<str>,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/products", get(handlers::list_products).post(handlers::create_product))
        .route("/products/:id", put(handlers::update_product).delete(handlers::delete_product))
        .route("/categories", get(handlers::list_categories))
        .route("/cart", get(handlers::get_cart))
        .route("/cart/lines/:product_id", put(handlers::set_cart_quantity).delete(handlers::remove_cart_line))
        .route("/checkout", post(handlers::confirm_checkout))
        .route("/checkout/dismiss", post(handlers::dismiss_checkout))
        .route("/sales", get(handlers::list_sales))
        .route("/sales/:id", axum::routing::delete(handlers::void_sale))
        .route("/dashboard", get(handlers::dashboard))
        .route("/images/*path", put(handlers::upload_image).delete(handlers::remove_image))
        .route_layer(middleware::from_fn_with_state(state.password.clone(), auth::require_password));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

impl IntoResponse for PosError {
    fn into_response(self) -> Response {
        let status = match &self {
            PosError::ProductNotFound | PosError::SaleNotFound | PosError::ImageNotFound => StatusCode::NOT_FOUND,
            PosError::Validation(_) | PosError::ImagePath(_) | PosError::Checkout(CheckoutError::Pricing(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            PosError::Checkout(CheckoutError::Submission(_)) => StatusCode::BAD_GATEWAY,
            PosError::Checkout(_) | PosError::Storage(StoreError::Conflict) => StatusCode::CONFLICT,
            PosError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({"error": self.to_string()}))).into_response()
    }
}
