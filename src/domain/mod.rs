//! Stall domain: catalog entities, the cart and checkout lifecycle, and sales metrics.
pub mod aggregates;
pub mod dashboard;
pub mod value_objects;
