//! Aggregates module
pub mod cart;
pub mod category;
pub mod checkout;
pub mod product;
pub mod sale;

pub use cart::{Cart, CartLine};
pub use category::Category;
pub use checkout::{CartSnapshot, CheckoutError, CheckoutPhase, CheckoutSession, SubmissionError};
pub use product::{NewProduct, Product, ProductFilter, ProductLookup, ProductPatch};
pub use sale::{OrderSubmission, SaleRecord};
