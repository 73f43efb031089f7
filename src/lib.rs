//! Stall POS
//!
//! Point-of-sale service for a seasonal food stall.
//!
//! ## Features
//! - Product catalog with soft-deleted entries
//! - Single-session cart and order confirmation
//! - Sales listing and dashboard metrics
//! - Product image storage
//! - Shared-password gate on the HTTP API

use thiserror::Error;

pub mod api;
pub mod config;
pub mod domain;
pub mod service;
pub mod store;

pub use config::Config;

use domain::aggregates::CheckoutError;
use domain::value_objects::ImagePathError;
use store::StoreError;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum PosError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Sale not found")]
    SaleNotFound,

    #[error("Image not found")]
    ImageNotFound,

    #[error("Invalid input: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid image path: {0}")]
    ImagePath(#[from] ImagePathError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, PosError>;
