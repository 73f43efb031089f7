//! Checkout session: the cart plus the order-submission lifecycle.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;
use crate::domain::aggregates::cart::{Cart, CartLine};
use crate::domain::aggregates::product::ProductLookup;
use crate::domain::aggregates::sale::OrderSubmission;
use crate::domain::value_objects::{Money, MoneyError};
use crate::store::StoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPhase { Empty, Building, Submitting, Confirmed }

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State { Open, Submitting, Confirmed { generation: u64 } }

#[derive(Clone, Debug)]
pub struct CheckoutSession {
    cart: Cart,
    state: State,
    generation: u64,
}

/// Serializable view of the session for callers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub total: Money,
    pub item_count: u32,
    pub phase: CheckoutPhase,
}

impl CheckoutSession {
    pub fn new(currency: &str) -> Self {
        Self { cart: Cart::new(currency), state: State::Open, generation: 0 }
    }

    pub fn cart(&self) -> &Cart { &self.cart }

    pub fn phase(&self) -> CheckoutPhase {
        match self.state {
            State::Open if self.cart.is_empty() => CheckoutPhase::Empty,
            State::Open => CheckoutPhase::Building,
            State::Submitting => CheckoutPhase::Submitting,
            State::Confirmed { .. } => CheckoutPhase::Confirmed,
        }
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            lines: self.cart.lines().to_vec(),
            total: self.cart.total(),
            item_count: self.cart.item_count(),
            phase: self.phase(),
        }
    }

    pub fn set_quantity<L>(&mut self, product_id: Uuid, quantity: u32, lookup: &L) -> Result<(), CheckoutError>
    where
        L: ProductLookup + ?Sized,
    {
        self.ensure_open()?;
        self.cart.set_quantity(product_id, quantity, lookup)?;
        Ok(())
    }

    pub fn remove_line(&mut self, product_id: &Uuid) -> Result<(), CheckoutError> {
        self.ensure_open()?;
        self.cart.remove_line(product_id);
        Ok(())
    }

    /// Moves `Building -> Submitting` and returns the records to write.
    /// `None` for an empty cart, which stays untouched.
    pub fn begin_submission(&mut self) -> Result<Option<Vec<OrderSubmission>>, CheckoutError> {
        self.ensure_open()?;
        if self.cart.is_empty() { return Ok(None); }
        self.state = State::Submitting;
        Ok(Some(self.cart.to_submission(Utc::now())))
    }

    /// Lines are left exactly as they were before `begin_submission`.
    pub fn submission_failed(&mut self) {
        if self.state == State::Submitting { self.state = State::Open; }
    }

    /// Returns the generation of this confirmation, used to dismiss it later.
    pub fn submission_succeeded(&mut self) -> Option<u64> {
        if self.state != State::Submitting { return None; }
        self.generation += 1;
        self.state = State::Confirmed { generation: self.generation };
        Some(self.generation)
    }

    /// Clears the cart and reopens the session. With `Some(generation)` only
    /// that confirmation is dismissed, so a stale timer is a no-op.
    pub fn dismiss_confirmation(&mut self, generation: Option<u64>) -> bool {
        match self.state {
            State::Confirmed { generation: current } if generation.map_or(true, |g| g == current) => {
                self.cart.clear();
                self.state = State::Open;
                true
            }
            _ => false,
        }
    }

    fn ensure_open(&self) -> Result<(), CheckoutError> {
        match self.state {
            State::Open => Ok(()),
            State::Submitting => Err(CheckoutError::SubmissionInProgress),
            State::Confirmed { .. } => Err(CheckoutError::AwaitingDismissal),
        }
    }
}

/// The order write failed; the cart was preserved for a retry.
#[derive(Debug, thiserror::Error)]
#[error("order submission failed: {source}")]
pub struct SubmissionError {
    #[from]
    source: StoreError,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("an order is already being submitted")]
    SubmissionInProgress,
    #[error("the last order is still being confirmed")]
    AwaitingDismissal,
    #[error("cart total {0}")]
    Pricing(#[from] MoneyError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::{sample, Product};
    use rust_decimal::Decimal;

    fn building() -> (CheckoutSession, Vec<Product>) {
        let products = vec![sample(1, "Pão de Queijo", Decimal::new(599, 2)), sample(2, "Canjica", Decimal::new(450, 2))];
        let mut s = CheckoutSession::new("BRL");
        s.set_quantity(Uuid::from_u128(1), 2, products.as_slice()).unwrap();
        s.set_quantity(Uuid::from_u128(2), 1, products.as_slice()).unwrap();
        (s, products)
    }

    #[test]
    fn test_phase_follows_lines() {
        let (mut s, _) = building();
        assert_eq!(s.phase(), CheckoutPhase::Building);
        s.remove_line(&Uuid::from_u128(1)).unwrap();
        s.remove_line(&Uuid::from_u128(2)).unwrap();
        assert_eq!(s.phase(), CheckoutPhase::Empty);
    }

    #[test]
    fn test_empty_session_has_nothing_to_submit() {
        let mut s = CheckoutSession::new("BRL");
        assert!(s.begin_submission().unwrap().is_none());
        assert_eq!(s.phase(), CheckoutPhase::Empty);
    }

    #[test]
    fn test_failure_restores_building_with_same_lines() {
        let (mut s, _) = building();
        let before = s.cart().lines().to_vec();
        let records = s.begin_submission().unwrap().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(s.phase(), CheckoutPhase::Submitting);
        s.submission_failed();
        assert_eq!(s.phase(), CheckoutPhase::Building);
        assert_eq!(s.cart().lines(), before.as_slice());
    }

    #[test]
    fn test_mutations_rejected_while_submitting() {
        let (mut s, products) = building();
        s.begin_submission().unwrap();
        assert!(matches!(s.set_quantity(Uuid::from_u128(1), 9, products.as_slice()), Err(CheckoutError::SubmissionInProgress)));
        assert!(matches!(s.begin_submission(), Err(CheckoutError::SubmissionInProgress)));
        assert!(matches!(s.remove_line(&Uuid::from_u128(1)), Err(CheckoutError::SubmissionInProgress)));
    }

    #[test]
    fn test_confirmation_dismissal_clears_cart() {
        let (mut s, _) = building();
        s.begin_submission().unwrap();
        let generation = s.submission_succeeded().unwrap();
        assert_eq!(s.phase(), CheckoutPhase::Confirmed);
        assert!(matches!(s.begin_submission(), Err(CheckoutError::AwaitingDismissal)));
        assert!(!s.dismiss_confirmation(Some(generation + 1)));
        assert!(s.dismiss_confirmation(Some(generation)));
        assert!(s.cart().is_empty());
        assert_eq!(s.phase(), CheckoutPhase::Empty);
    }

    #[test]
    fn test_out_of_range_quantity_is_refused() {
        let (mut s, _) = building();
        let priced_out = vec![sample(3, "Fogos", Decimal::MAX)];
        let before = s.snapshot();
        assert!(matches!(s.set_quantity(Uuid::from_u128(3), u32::MAX, priced_out.as_slice()), Err(CheckoutError::Pricing(MoneyError::Overflow))));
        assert_eq!(s.snapshot(), before);
        assert_eq!(s.phase(), CheckoutPhase::Building);
    }

    #[test]
    fn test_success_without_submission_is_ignored() {
        let (mut s, _) = building();
        assert!(s.submission_succeeded().is_none());
        assert!(!s.dismiss_confirmation(None));
        assert_eq!(s.cart().lines().len(), 2);
    }
}
