//! Workflows over the stores: checkout, catalog and sales.
pub mod catalog;
pub mod checkout;
pub mod sales;

pub use catalog::CatalogView;
pub use checkout::{CheckoutService, ConfirmOutcome};
pub use sales::DashboardView;
