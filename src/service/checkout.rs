//! Checkout workflow over the shared session and the sales store.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::aggregates::{CartSnapshot, CheckoutError, CheckoutSession, OrderSubmission, ProductLookup, SubmissionError};
use crate::store::{SalesStore, StoreError};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConfirmOutcome {
    NothingToSubmit,
    Confirmed {
        order: CartSnapshot,
        display_for_ms: u64,
    },
}

#[derive(Clone)]
pub struct CheckoutService {
    session: Arc<Mutex<CheckoutSession>>,
    sales: Arc<dyn SalesStore>,
    confirmation_display: Duration,
}

impl CheckoutService {
    pub fn new(currency: &str, sales: Arc<dyn SalesStore>, confirmation_display: Duration) -> Self {
        Self { session: Arc::new(Mutex::new(CheckoutSession::new(currency))), sales, confirmation_display }
    }

    pub async fn snapshot(&self) -> CartSnapshot { self.session.lock().await.snapshot() }

    pub async fn set_quantity<L>(&self, product_id: Uuid, quantity: u32, lookup: &L) -> Result<CartSnapshot, CheckoutError>
    where
        L: ProductLookup + ?Sized,
    {
        let mut session = self.session.lock().await;
        session.set_quantity(product_id, quantity, lookup)?;
        Ok(session.snapshot())
    }

    pub async fn remove_line(&self, product_id: &Uuid) -> Result<CartSnapshot, CheckoutError> {
        let mut session = self.session.lock().await;
        session.remove_line(product_id)?;
        Ok(session.snapshot())
    }

    /// Submits the cart as one batched write. On failure the cart is left as
    /// it was; on success it is cleared once the confirmation display ends.
    pub async fn confirm_order(&self) -> Result<ConfirmOutcome, CheckoutError> {
        let records = {
            let mut session = self.session.lock().await;
            match session.begin_submission()? {
                Some(records) => records,
                None => {
                    tracing::debug!("confirm on empty cart ignored");
                    return Ok(ConfirmOutcome::NothingToSubmit);
                }
            }
        };

        // The write runs detached so a dropped request still settles the session.
        let this = self.clone();
        let settled = tokio::spawn(async move { this.submit(records).await }).await;
        let result = match settled {
            Ok(result) => result,
            Err(join) => {
                self.session.lock().await.submission_failed();
                Err(StoreError::Unavailable(join.to_string()))
            }
        };

        match result {
            Ok(order) => Ok(ConfirmOutcome::Confirmed {
                order,
                display_for_ms: u64::try_from(self.confirmation_display.as_millis()).unwrap_or(u64::MAX),
            }),
            Err(source) => Err(SubmissionError::from(source).into()),
        }
    }

    /// Ends the confirmation display now instead of waiting for the timer.
    pub async fn dismiss_confirmation(&self) -> CartSnapshot {
        let mut session = self.session.lock().await;
        session.dismiss_confirmation(None);
        session.snapshot()
    }

    async fn submit(&self, records: Vec<OrderSubmission>) -> Result<CartSnapshot, StoreError> {
        let lines = records.len();
        match self.sales.insert_batch(records).await {
            Ok(()) => {
                let (generation, order) = {
                    let mut session = self.session.lock().await;
                    (session.submission_succeeded(), session.snapshot())
                };
                tracing::info!(lines, total = %order.total, "order confirmed");
                if let Some(generation) = generation {
                    self.schedule_dismissal(generation);
                }
                Ok(order)
            }
            Err(e) => {
                self.session.lock().await.submission_failed();
                tracing::error!(error = %e, lines, "order submission failed; cart kept for retry");
                Err(e)
            }
        }
    }

    fn schedule_dismissal(&self, generation: u64) {
        let session = Arc::clone(&self.session);
        let delay = self.confirmation_display;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if session.lock().await.dismiss_confirmation(Some(generation)) {
                tracing::debug!(generation, "confirmation dismissed, cart cleared");
            }
        });
    }
}
