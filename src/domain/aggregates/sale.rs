//! Sale records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One persisted sale line, joined with the product name on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SaleRecord {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub line_total: Decimal,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Write-side record built from a cart line at confirmation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSubmission {
    pub product_id: Uuid,
    pub quantity: u32,
    pub line_total: Decimal,
    pub created_at: DateTime<Utc>,
}
