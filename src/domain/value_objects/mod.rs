//! Value Objects for the stall

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency { return Err(MoneyError::CurrencyMismatch); }
        let amount = self.amount.checked_add(other.amount).ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount, &self.currency))
    }
    pub fn multiply(&self, qty: u32) -> Result<Money, MoneyError> {
        let amount = self.amount.checked_mul(Decimal::from(qty)).ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount, &self.currency))
    }

    /// Amount rounded to cents. Only used for presentation; sums are never rounded.
    pub fn rounded(&self) -> Decimal {
        self.amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{} {:.2}", self.currency, self.rounded()) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("currency mismatch")]
    CurrencyMismatch,
    #[error("amount is out of range")]
    Overflow,
}

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Relative object path inside the image store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ImagePath(String);

impl ImagePath {
    pub fn new(value: impl Into<String>) -> Result<Self, ImagePathError> {
        let value = value.into().trim().trim_start_matches('/').to_string();
        if value.is_empty() { return Err(ImagePathError::Empty); }
        if value.len() > 255 { return Err(ImagePathError::TooLong); }
        if value.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..") {
            return Err(ImagePathError::InvalidSegment);
        }
        let extension = value.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
        match extension {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => Ok(Self(value)),
            _ => Err(ImagePathError::UnsupportedType),
        }
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ImagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImagePathError {
    #[error("image path is empty")]
    Empty,
    #[error("image path is too long")]
    TooLong,
    #[error("image path has an empty or relative segment")]
    InvalidSegment,
    #[error("only jpg, png, gif and webp images are accepted")]
    UnsupportedType,
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_money_add() {
        let a = Money::new(Decimal::new(599, 2), "BRL");
        let b = Money::new(Decimal::new(450, 2), "BRL");
        assert_eq!(a.add(&b).unwrap().amount(), Decimal::new(1049, 2));
        assert_eq!(a.add(&Money::new(Decimal::ONE, "USD")), Err(MoneyError::CurrencyMismatch));
    }
    #[test]
    fn test_money_arithmetic_is_checked() {
        let big = Money::new(Decimal::MAX, "BRL");
        assert_eq!(big.multiply(2), Err(MoneyError::Overflow));
        assert_eq!(big.add(&Money::new(Decimal::ONE, "BRL")), Err(MoneyError::Overflow));
        assert_eq!(Money::new(Decimal::new(599, 2), "BRL").multiply(2).unwrap().amount(), Decimal::new(1198, 2));
    }
    #[test]
    fn test_money_display_rounds_only_presentation() {
        let m = Money::new(Decimal::new(16485, 3), "BRL");
        assert_eq!(m.to_string(), "BRL 16.49");
        assert_eq!(m.amount(), Decimal::new(16485, 3));
    }
    #[test]
    fn test_image_path() {
        assert_eq!(ImagePath::new("/pastel.JPG").unwrap().as_str(), "pastel.JPG");
        assert_eq!(ImagePath::new("doces/canjica.webp").unwrap().as_str(), "doces/canjica.webp");
        assert_eq!(ImagePath::new("../etc/passwd.png"), Err(ImagePathError::InvalidSegment));
        assert_eq!(ImagePath::new("a//b.png"), Err(ImagePathError::InvalidSegment));
        assert_eq!(ImagePath::new("menu.pdf"), Err(ImagePathError::UnsupportedType));
        assert_eq!(ImagePath::new("  "), Err(ImagePathError::Empty));
    }
}
