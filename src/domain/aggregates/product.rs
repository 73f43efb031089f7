//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A catalog entry. Rows with `deleted_at` set are tombstones and never selectable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub image_url: String,
    pub category_id: Option<Uuid>,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn is_deleted(&self) -> bool { self.deleted_at.is_some() }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 120, message = "name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom = "valid_price")]
    pub unit_price: Decimal,
    #[validate(length(min = 1, message = "an image is required"))]
    pub image_url: String,
    pub category_id: Option<Uuid>,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub stock: i32,
}

/// Partial update; only the fields present are validated and written.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductPatch {
    #[validate(length(min = 1, max = 120, message = "name is required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "valid_price")]
    pub unit_price: Option<Decimal>,
    #[validate(length(min = 1, message = "an image is required"))]
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
}

impl ProductPatch {
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name { product.name = name.clone(); }
        if let Some(description) = &self.description { product.description = Some(description.clone()); }
        if let Some(price) = self.unit_price { product.unit_price = price; }
        if let Some(url) = &self.image_url { product.image_url = url.clone(); }
        if let Some(category) = self.category_id { product.category_id = Some(category); }
        if let Some(stock) = self.stock { product.stock = stock; }
    }
}

/// Prices must fit the `NUMERIC(10,2)` column exactly.
fn valid_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("negative_price"));
    }
    if price.normalize().scale() > 2 {
        return Err(ValidationError::new("price_precision"));
    }
    if *price > Decimal::new(9_999_999_999, 2) {
        return Err(ValidationError::new("price_too_large"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<Uuid>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        !product.is_deleted() && self.category.map_or(true, |c| product.category_id == Some(c))
    }
}

/// Source of selectable products for the cart.
pub trait ProductLookup {
    fn find_product(&self, id: &Uuid) -> Option<&Product>;
}

impl ProductLookup for [Product] {
    fn find_product(&self, id: &Uuid) -> Option<&Product> {
        self.iter().find(|p| &p.id == id && !p.is_deleted())
    }
}

#[cfg(test)]
pub(crate) fn sample(id: u128, name: &str, price: Decimal) -> Product {
    Product {
        id: Uuid::from_u128(id),
        name: name.into(),
        description: None,
        unit_price: price,
        image_url: format!("https://img.example/{id}.jpg"),
        category_id: None,
        stock: 10,
        created_at: Utc::now(),
        deleted_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NewProduct {
        NewProduct { name: "Pamonha".into(), description: None, unit_price: Decimal::new(800, 2), image_url: "pamonha.jpg".into(), category_id: None, stock: 3 }
    }

    #[test]
    fn test_new_product_validation() {
        assert!(draft().validate().is_ok());
        let errors = NewProduct { name: String::new(), image_url: String::new(), ..draft() }.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("image_url"));
        assert!(NewProduct { unit_price: Decimal::new(-1, 2), ..draft() }.validate().is_err());
        assert!(NewProduct { stock: -1, ..draft() }.validate().is_err());
    }

    #[test]
    fn test_price_must_fit_two_decimal_places() {
        assert!(NewProduct { unit_price: Decimal::new(6000, 3), ..draft() }.validate().is_ok());
        assert!(NewProduct { unit_price: Decimal::new(5999, 3), ..draft() }.validate().is_err());
        assert!(NewProduct { unit_price: Decimal::new(9_999_999_999, 2), ..draft() }.validate().is_ok());
        assert!(NewProduct { unit_price: Decimal::new(100_000_000, 0), ..draft() }.validate().is_err());
        assert!(ProductPatch { unit_price: Some(Decimal::new(5999, 3)), ..Default::default() }.validate().is_err());
    }

    #[test]
    fn test_patch_validates_present_fields_only() {
        assert!(ProductPatch::default().validate().is_ok());
        assert!(ProductPatch { name: Some(String::new()), ..Default::default() }.validate().is_err());
        let mut p = sample(1, "Quentão", Decimal::new(600, 2));
        ProductPatch { unit_price: Some(Decimal::new(700, 2)), ..Default::default() }.apply(&mut p);
        assert_eq!(p.unit_price, Decimal::new(700, 2));
        assert_eq!(p.name, "Quentão");
    }

    #[test]
    fn test_lookup_skips_tombstones() {
        let mut gone = sample(2, "Curau", Decimal::ONE);
        gone.deleted_at = Some(Utc::now());
        let products = vec![sample(1, "Canjica", Decimal::ONE), gone];
        assert!(products.as_slice().find_product(&Uuid::from_u128(1)).is_some());
        assert!(products.as_slice().find_product(&Uuid::from_u128(2)).is_none());
    }
}
