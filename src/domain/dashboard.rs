//! Sales metrics reduced from sale records.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use crate::domain::aggregates::SaleRecord;

pub const TOP_PRODUCTS: usize = 5;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SalesMetrics {
    pub total_sales: Decimal,
    pub total_orders: usize,
    pub average_order_value: Decimal,
    pub top_products: Vec<TopProduct>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TopProduct {
    pub name: String,
    pub total_quantity: i64,
    pub total_value: Decimal,
}

impl SalesMetrics {
    /// Tombstoned rows are skipped. Each sale row counts as one order.
    pub fn from_sales(sales: &[SaleRecord]) -> Self {
        let live: Vec<&SaleRecord> = sales.iter().filter(|s| s.deleted_at.is_none()).collect();
        let total_sales: Decimal = live.iter().map(|s| s.line_total).sum();
        let total_orders = live.len();
        let average_order_value = if total_orders == 0 {
            Decimal::ZERO
        } else {
            total_sales / Decimal::from(total_orders)
        };

        let mut by_product: HashMap<&str, (i64, Decimal)> = HashMap::new();
        for sale in &live {
            let entry = by_product.entry(sale.product_name.as_str()).or_insert((0, Decimal::ZERO));
            entry.0 += i64::from(sale.quantity);
            entry.1 += sale.line_total;
        }
        let mut top_products: Vec<TopProduct> = by_product
            .into_iter()
            .map(|(name, (total_quantity, total_value))| TopProduct { name: name.to_string(), total_quantity, total_value })
            .collect();
        top_products.sort_by(|a, b| b.total_value.cmp(&a.total_value).then_with(|| a.name.cmp(&b.name)));
        top_products.truncate(TOP_PRODUCTS);

        Self { total_sales, total_orders, average_order_value, top_products }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sale(name: &str, quantity: i32, cents: i64) -> SaleRecord {
        SaleRecord {
            id: Uuid::now_v7(),
            product_id: Uuid::nil(),
            product_name: name.into(),
            quantity,
            line_total: Decimal::new(cents, 2),
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_empty_metrics() {
        let m = SalesMetrics::from_sales(&[]);
        assert_eq!(m, SalesMetrics::default());
    }

    #[test]
    fn test_totals_and_average() {
        let mut voided = sale("Curau", 1, 10_000);
        voided.deleted_at = Some(Utc::now());
        let m = SalesMetrics::from_sales(&[sale("Pão de Queijo", 2, 1198), sale("Canjica", 1, 450), voided]);
        assert_eq!(m.total_sales, Decimal::new(1648, 2));
        assert_eq!(m.total_orders, 2);
        assert_eq!(m.average_order_value, Decimal::new(824, 2));
    }

    #[test]
    fn test_top_products_by_value() {
        let sales = vec![
            sale("A", 1, 100), sale("B", 1, 700), sale("C", 3, 300), sale("A", 2, 500),
            sale("D", 1, 50), sale("E", 1, 60), sale("F", 1, 70),
        ];
        let m = SalesMetrics::from_sales(&sales);
        let names: Vec<_> = m.top_products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C", "F", "E"]);
        assert_eq!(m.top_products[1].total_quantity, 3);
        assert_eq!(m.top_products[1].total_value, Decimal::new(600, 2));
    }

    #[test]
    fn test_ties_break_by_name() {
        let m = SalesMetrics::from_sales(&[sale("Pipoca", 1, 500), sale("Milho", 1, 500)]);
        assert_eq!(m.top_products[0].name, "Milho");
    }
}
