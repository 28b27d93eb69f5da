//! Typed records for the IMS REST collaborator.
//!
//! The backend speaks camelCase JSON. Everything is deserialized into
//! explicit structs at the API boundary so malformed payloads are rejected
//! there instead of leaking loose values into layout code.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Credit,
    Card,
    BankTransfer,
}

impl PaymentMethod {
    /// Wire name as the backend sends it.
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Credit => "credit",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }

    /// Uppercased badge label used on receipts.
    pub fn badge_label(self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// One ordered line. Owned exclusively by its parent [`Order`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total: f64,
}

/// A sale record as returned by the `sales` resource.
///
/// Invariant (assumed, not enforced by the backend):
/// `total = subtotal - discount + tax`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: String,
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub tax: f64,
    pub total: f64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub created_at: String,
}

impl Order {
    /// Customer display name, falling back like the order views do.
    pub fn customer_display(&self) -> &str {
        self.customer_name.as_deref().unwrap_or("Walk-in Customer")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Inactive,
}

impl Default for ProductStatus {
    fn default() -> Self {
        ProductStatus::Active
    }
}

/// A catalog product with stock thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub unit: String,
    pub price: f64,
    #[serde(default)]
    pub cost_price: f64,
    #[serde(default)]
    pub stock: f64,
    #[serde(default)]
    pub min_stock: f64,
    #[serde(default)]
    pub max_stock: Option<f64>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub description: String,
    /// Placeholder record created through the fast-entry path; awaiting
    /// full data entry.
    #[serde(default)]
    pub is_incomplete: bool,
    #[serde(default)]
    pub quantity_note: Option<String>,
    #[serde(default)]
    pub needs_quantity_update: bool,
}

/// Payload for creating or updating a product.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub price: f64,
    pub stock: f64,
    pub unit: String,
    pub category: String,
    pub min_stock: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_stock: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<f64>,
    pub description: String,
    pub status: ProductStatus,
    pub is_incomplete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_note: Option<String>,
    pub needs_quantity_update: bool,
}

impl NewProduct {
    /// Fast-entry placeholder created mid-sale: provisional SKU, estimated
    /// stock, flagged incomplete so it surfaces for later correction.
    pub fn quick_add(
        name: &str,
        price: f64,
        estimated_stock: f64,
        unit: &str,
        category: &str,
        notes: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, Error> {
        if name.trim().is_empty() {
            return Err(Error::validation("Product name and price are required"));
        }
        if price <= 0.0 {
            return Err(Error::validation("Product name and price are required"));
        }
        let category = if category.trim().is_empty() {
            "Miscellaneous"
        } else {
            category
        };
        Ok(NewProduct {
            name: name.trim().to_string(),
            sku: format!("TEMP-{}", created_at.timestamp_millis()),
            price,
            stock: estimated_stock,
            unit: unit.to_string(),
            category: category.to_string(),
            min_stock: 0.0,
            max_stock: None,
            cost_price: None,
            description: format!("INCOMPLETE ENTRY - Added during sale. Original notes: {notes}"),
            status: ProductStatus::Active,
            is_incomplete: true,
            quantity_note: None,
            needs_quantity_update: true,
        })
    }
}

/// Derive a SKU from a product name: up to two words contribute their first
/// three alphanumeric characters, plus a short timestamp suffix so repeated
/// names stay distinct.
pub fn generate_sku(name: &str, at: DateTime<Utc>) -> String {
    let mut parts: Vec<String> = name
        .split_whitespace()
        .filter_map(|word| {
            let letters: String = word
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .take(3)
                .collect::<String>()
                .to_ascii_uppercase();
            if letters.is_empty() {
                None
            } else {
                Some(letters)
            }
        })
        .take(2)
        .collect();
    if parts.is_empty() {
        parts.push("SKU".to_string());
    }
    let suffix = at.timestamp_millis() % 10_000;
    format!("{}-{suffix:04}", parts.join("-"))
}

// ---------------------------------------------------------------------------
// Order adjustments (returns)
// ---------------------------------------------------------------------------

/// One line of a return request, as filled in by the adjustment form.
#[derive(Debug, Clone)]
pub struct ReturnLine {
    pub product_id: i64,
    pub return_quantity: f64,
    pub unit_price: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentItem {
    pub product_id: i64,
    /// Negative for returns.
    pub quantity: f64,
    pub reason: String,
    pub unit_price: f64,
}

/// Post-completion correction submitted to `POST /sales/{id}/adjust`.
/// Built transiently; never persisted locally.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentRequest {
    pub items: Vec<AdjustmentItem>,
    pub adjustment_type: String,
    pub notes: String,
    #[serde(skip)]
    pub refund_amount: f64,
    pub restock: bool,
}

impl AdjustmentRequest {
    /// Build a return adjustment for `order`. Return quantities are clamped
    /// to the originally ordered quantity; lines with nothing to return are
    /// dropped. An empty effective return set is a validation error and no
    /// network call should be made.
    pub fn from_returns(order: &Order, lines: &[ReturnLine], notes: &str) -> Result<Self, Error> {
        let mut items = Vec::new();
        let mut refund = 0.0;
        for line in lines {
            if line.return_quantity <= 0.0 {
                continue;
            }
            let ordered: f64 = order
                .items
                .iter()
                .filter(|i| i.product_id == line.product_id)
                .map(|i| i.quantity)
                .sum();
            let qty = line.return_quantity.min(ordered);
            if qty <= 0.0 {
                continue;
            }
            refund += qty * line.unit_price;
            let reason = if line.reason.trim().is_empty() {
                "Return after completion".to_string()
            } else {
                line.reason.clone()
            };
            items.push(AdjustmentItem {
                product_id: line.product_id,
                quantity: -qty,
                reason,
                unit_price: line.unit_price,
            });
        }
        if items.is_empty() {
            return Err(Error::validation("Please specify quantities to return"));
        }
        let notes = if notes.trim().is_empty() {
            "Order adjustment - items returned after completion".to_string()
        } else {
            notes.to_string()
        };
        Ok(AdjustmentRequest {
            items,
            adjustment_type: "return".to_string(),
            notes,
            refund_amount: refund,
            restock: true,
        })
    }
}

/// Manual stock correction for `POST /products/{id}/adjust-stock`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub quantity: f64,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Lookup resources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub total_purchases: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitOfMeasure {
    pub id: i64,
    pub name: String,
}

/// One stock movement as the backend's audit log reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryMovement {
    pub id: i64,
    pub product_id: i64,
    #[serde(default)]
    pub product_name: String,
    /// "sale", "purchase", "adjustment", "return".
    pub movement_type: String,
    pub quantity: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub total_sales: f64,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub low_stock_count: u64,
    #[serde(default)]
    pub out_of_stock_count: u64,
}
