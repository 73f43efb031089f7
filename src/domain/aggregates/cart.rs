//! Cart Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;
use crate::domain::aggregates::product::ProductLookup;
use crate::domain::aggregates::sale::OrderSubmission;
use crate::domain::value_objects::{Money, MoneyError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub image_url: String,
}

impl CartLine {
    /// Saturates rather than panics; a cart only admits lines whose totals fit.
    pub fn line_total(&self) -> Decimal { self.unit_price.saturating_mul(Decimal::from(self.quantity)) }
}

/// Sum of `unit_price * quantity` over `lines`; zero when empty.
pub fn total(lines: &[CartLine]) -> Decimal {
    lines.iter().fold(Decimal::ZERO, |acc, l| acc.saturating_add(l.line_total()))
}

/// Sum of quantities over `lines`; zero when empty.
pub fn count(lines: &[CartLine]) -> u32 {
    lines.iter().fold(0u32, |acc, l| acc.saturating_add(l.quantity))
}

/// Exact total of `lines`, failing instead of losing precision when out of range.
pub fn checked_total(lines: &[CartLine], currency: &str) -> Result<Money, MoneyError> {
    lines.iter().try_fold(Money::zero(currency), |acc, l| acc.add(&Money::new(l.unit_price, currency).multiply(l.quantity)?))
}

/// Pending order for the active checkout session. Lines keep insertion order
/// and are unique by product id; a line never holds quantity zero.
#[derive(Clone, Debug)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: String,
}

impl Cart {
    pub fn new(currency: &str) -> Self {
        Self { lines: vec![], currency: currency.to_string() }
    }

    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }
    pub fn total(&self) -> Money { Money::new(total(&self.lines), &self.currency) }
    pub fn item_count(&self) -> u32 { count(&self.lines) }

    /// Replaces the quantity for `product_id`. Zero removes the line; an
    /// unknown product with no existing line is ignored. An edit whose total
    /// would not fit is refused and the cart is left as it was.
    pub fn set_quantity<L>(&mut self, product_id: Uuid, quantity: u32, lookup: &L) -> Result<(), MoneyError>
    where
        L: ProductLookup + ?Sized,
    {
        if quantity == 0 {
            self.remove_line(&product_id);
            return Ok(());
        }
        let mut lines = self.lines.clone();
        if let Some(line) = lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
        } else if let Some(product) = lookup.find_product(&product_id) {
            lines.push(CartLine {
                product_id,
                name: product.name.clone(),
                unit_price: product.unit_price,
                quantity,
                image_url: product.image_url.clone(),
            });
        } else {
            return Ok(());
        }
        checked_total(&lines, &self.currency)?;
        self.lines = lines;
        Ok(())
    }

    /// Idempotent.
    pub fn remove_line(&mut self, product_id: &Uuid) {
        self.lines.retain(|l| &l.product_id != product_id);
    }

    pub fn clear(&mut self) { self.lines.clear(); }

    pub fn to_submission(&self, created_at: DateTime<Utc>) -> Vec<OrderSubmission> {
        self.lines
            .iter()
            .map(|l| OrderSubmission { product_id: l.product_id, quantity: l.quantity, line_total: l.line_total(), created_at })
            .collect()
    }
}
