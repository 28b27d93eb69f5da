//! Scalar figures derived from in-memory order/product collections.
//!
//! Feeds both the on-screen summary cards and the printed/exported summary
//! blocks. Everything here is recomputed on each fetch; nothing persists.

use serde::{Deserialize, Serialize};

use crate::models::{Order, Product};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub total_orders: u64,
    pub total_sales: f64,
    pub avg_order_value: f64,
}

pub fn summarize_orders(orders: &[Order]) -> OrderSummary {
    let total_orders = orders.len() as u64;
    let total_sales: f64 = orders.iter().map(|o| o.total).sum();
    let avg_order_value = if total_orders == 0 {
        0.0
    } else {
        total_sales / total_orders as f64
    };
    OrderSummary {
        total_orders,
        total_sales,
        avg_order_value,
    }
}

/// Stock-health category. Evaluated in priority order so the categories
/// partition any product list: a product lands in exactly one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StockHealth {
    OutOfStock,
    LowStock,
    Overstock,
    Adequate,
}

pub fn stock_health(product: &Product) -> StockHealth {
    if product.stock == 0.0 {
        StockHealth::OutOfStock
    } else if product.stock <= product.min_stock {
        StockHealth::LowStock
    } else if product.max_stock.map_or(false, |max| max > 0.0 && product.stock > max) {
        StockHealth::Overstock
    } else {
        StockHealth::Adequate
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_products: u64,
    /// Σ cost_price × stock
    pub cost_value: f64,
    /// Σ price × stock
    pub retail_value: f64,
    pub potential_profit: f64,
    /// Percent of retail value; 0 when there is no retail value.
    pub profit_margin_pct: f64,
    pub average_cost_price: f64,
    pub average_selling_price: f64,
    pub out_of_stock_items: u64,
    pub low_stock_items: u64,
    pub overstock_items: u64,
}

pub fn summarize_inventory(products: &[Product]) -> InventorySummary {
    let mut s = InventorySummary::default();
    let mut total_cost_price = 0.0;
    let mut total_selling_price = 0.0;

    for product in products {
        s.total_products += 1;
        s.cost_value += product.cost_price * product.stock;
        s.retail_value += product.price * product.stock;
        total_cost_price += product.cost_price;
        total_selling_price += product.price;

        match stock_health(product) {
            StockHealth::OutOfStock => s.out_of_stock_items += 1,
            StockHealth::LowStock => s.low_stock_items += 1,
            StockHealth::Overstock => s.overstock_items += 1,
            StockHealth::Adequate => {}
        }
    }

    s.potential_profit = s.retail_value - s.cost_value;
    s.profit_margin_pct = if s.retail_value > 0.0 {
        s.potential_profit / s.retail_value * 100.0
    } else {
        0.0
    };
    if s.total_products > 0 {
        s.average_cost_price = total_cost_price / s.total_products as f64;
        s.average_selling_price = total_selling_price / s.total_products as f64;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductStatus;

    fn product(stock: f64, min_stock: f64, max_stock: Option<f64>) -> Product {
        Product {
            id: 1,
            name: "Hinge".to_string(),
            sku: "HIN-0001".to_string(),
            category: "Hardware".to_string(),
            unit: "pieces".to_string(),
            price: 100.0,
            cost_price: 60.0,
            stock,
            min_stock,
            max_stock,
            status: ProductStatus::Active,
            description: String::new(),
            is_incomplete: false,
            quantity_note: None,
            needs_quantity_update: false,
        }
    }

    #[test]
    fn average_is_zero_for_no_orders_never_nan() {
        let s = summarize_orders(&[]);
        assert_eq!(s.total_orders, 0);
        assert_eq!(s.total_sales, 0.0);
        assert_eq!(s.avg_order_value, 0.0);
        assert!(!s.avg_order_value.is_nan());
    }

    #[test]
    fn zero_stock_is_out_of_stock_regardless_of_thresholds() {
        assert_eq!(
            stock_health(&product(0.0, 5.0, Some(100.0))),
            StockHealth::OutOfStock
        );
        assert_eq!(stock_health(&product(0.0, 0.0, None)), StockHealth::OutOfStock);
    }

    #[test]
    fn low_stock_wins_over_missing_max() {
        assert_eq!(stock_health(&product(3.0, 5.0, None)), StockHealth::LowStock);
        assert_eq!(
            stock_health(&product(3.0, 5.0, Some(0.0))),
            StockHealth::LowStock
        );
    }

    #[test]
    fn overstock_requires_positive_max() {
        assert_eq!(
            stock_health(&product(50.0, 5.0, Some(40.0))),
            StockHealth::Overstock
        );
        assert_eq!(stock_health(&product(50.0, 5.0, None)), StockHealth::Adequate);
    }

    #[test]
    fn health_categories_partition_the_list() {
        let products = vec![
            product(0.0, 5.0, Some(40.0)),
            product(3.0, 5.0, None),
            product(50.0, 5.0, Some(40.0)),
            product(10.0, 5.0, Some(40.0)),
        ];
        let s = summarize_inventory(&products);
        assert_eq!(s.out_of_stock_items, 1);
        assert_eq!(s.low_stock_items, 1);
        assert_eq!(s.overstock_items, 1);
        assert_eq!(
            s.out_of_stock_items + s.low_stock_items + s.overstock_items,
            3,
            "adequate products are counted in no bucket"
        );
    }

    #[test]
    fn valuation_figures() {
        let products = vec![product(10.0, 2.0, None), product(5.0, 2.0, None)];
        let s = summarize_inventory(&products);
        assert_eq!(s.cost_value, 60.0 * 15.0);
        assert_eq!(s.retail_value, 100.0 * 15.0);
        assert_eq!(s.potential_profit, 40.0 * 15.0);
        assert!((s.profit_margin_pct - 40.0).abs() < 1e-9);
        assert_eq!(s.average_cost_price, 60.0);
        assert_eq!(s.average_selling_price, 100.0);
    }

    #[test]
    fn margin_guarded_against_zero_retail_value() {
        let s = summarize_inventory(&[]);
        assert_eq!(s.profit_margin_pct, 0.0);
        assert!(!s.profit_margin_pct.is_nan());
    }
}
