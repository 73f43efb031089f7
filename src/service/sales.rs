//! Sales listing, voiding and the dashboard.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::SaleRecord;
use crate::domain::dashboard::SalesMetrics;
use crate::store::{SalesStore, StoreError};
use crate::{PosError, Result};

#[derive(Clone, Debug, Default, Serialize)]
pub struct DashboardView {
    pub metrics: SalesMetrics,
    pub sales: Vec<SaleRecord>,
    pub fetch_failed: bool,
}

impl DashboardView {
    pub async fn load(store: &dyn SalesStore) -> Self {
        match store.list_sales().await {
            Ok(sales) => Self { metrics: SalesMetrics::from_sales(&sales), sales, fetch_failed: false },
            Err(e) => {
                tracing::warn!(error = %e, "sales fetch failed");
                Self { fetch_failed: true, ..Self::default() }
            }
        }
    }
}

pub async fn list_sales(store: &dyn SalesStore) -> Vec<SaleRecord> {
    store.list_sales().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "sales fetch failed");
        vec![]
    })
}

pub async fn void_sale(store: &dyn SalesStore, id: Uuid) -> Result<()> {
    match store.soft_delete_sale(id).await {
        Ok(()) => {
            tracing::info!(sale_id = %id, "sale voided");
            Ok(())
        }
        Err(StoreError::NotFound) => Err(PosError::SaleNotFound),
        Err(e) => {
            tracing::error!(error = %e, sale_id = %id, "sale void failed");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::OrderSubmission;
    use crate::store::MemoryStore;
    use chrono::Utc;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_voided_sale_leaves_dashboard() {
        let store = MemoryStore::new();
        let rec = |cents| OrderSubmission { product_id: Uuid::nil(), quantity: 1, line_total: Decimal::new(cents, 2), created_at: Utc::now() };
        store.insert_batch(vec![rec(1000), rec(500)]).await.unwrap();
        let view = DashboardView::load(&store).await;
        assert_eq!(view.metrics.total_sales, Decimal::new(1500, 2));

        void_sale(&store, view.sales[0].id).await.unwrap();
        let view = DashboardView::load(&store).await;
        assert_eq!(view.metrics.total_orders, 1);
        assert!(matches!(void_sale(&store, Uuid::now_v7()).await, Err(PosError::SaleNotFound)));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_swallowed() {
        let store = MemoryStore::new();
        store.fail_reads(true);
        let view = DashboardView::load(&store).await;
        assert!(view.fetch_failed);
        assert_eq!(view.metrics.total_orders, 0);
        assert!(list_sales(&store).await.is_empty());
    }
}
