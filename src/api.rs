//! IMS backend API client.
//!
//! Thin typed wrapper over the inventory-management REST API. Every method
//! maps one resource operation; transport failures and non-success statuses
//! are converted to user-facing messages before they leave this module.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{friendly_error, status_error, Error};
use crate::models::{
    AdjustmentRequest, Category, Customer, DashboardStats, InventoryMovement, NewProduct, Order,
    OrderStatus, Product, StockAdjustment, UnitOfMeasure,
};
use crate::summary::OrderSummary;

/// Default timeout for API requests (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_BASE_URL: &str = "https://zaidawn.site/wp-json/ims/v1";

// ---------------------------------------------------------------------------
// URL normalisation
// ---------------------------------------------------------------------------

/// Normalise the backend base URL:
/// - ensure a scheme is present (https, or http for localhost)
/// - strip trailing slashes
pub fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim().to_string();

    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    while url.ends_with('/') {
        url.pop();
    }

    url
}

// ---------------------------------------------------------------------------
// List queries and response envelopes
// ---------------------------------------------------------------------------

/// Filter/pagination parameters for the sales listing.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<OrderStatus>,
    pub search: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl ListQuery {
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(search) = &self.search {
            if !search.trim().is_empty() {
                pairs.push(("search", search.trim().to_string()));
            }
        }
        if let Some(from) = self.date_from {
            pairs.push(("dateFrom", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.date_to {
            pairs.push(("dateTo", to.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

/// One page of the sales listing, with the backend's own aggregate when it
/// sends one.
#[derive(Debug, Clone)]
pub struct SalesPage {
    pub orders: Vec<Order>,
    pub summary: Option<OrderSummary>,
}

/// The backend answers list requests either with a bare array or with an
/// envelope keyed by the resource name (optionally wrapped in `data`).
pub(crate) fn parse_collection<T: DeserializeOwned>(value: Value, key: &str) -> Result<Vec<T>, Error> {
    let array = match value {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => map
            .remove(key)
            .or_else(|| map.remove("data"))
            .ok_or_else(|| {
                Error::Network(format!("Unexpected {key} response shape from IMS backend"))
            })?,
        other => {
            debug!(got = %other, "unexpected collection body");
            return Err(Error::Network(format!(
                "Unexpected {key} response shape from IMS backend"
            )));
        }
    };
    serde_json::from_value(array)
        .map_err(|e| Error::Network(format!("Invalid {key} payload from IMS backend: {e}")))
}

pub(crate) fn parse_sales_page(value: Value) -> Result<SalesPage, Error> {
    let summary = value
        .get("summary")
        .cloned()
        .and_then(|s| serde_json::from_value::<OrderSummary>(s).ok());
    let orders = parse_collection(value, "sales")?;
    Ok(SalesPage { orders, summary })
}

fn parse_object<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, Error> {
    let value = match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(value)
        .map_err(|e| Error::Network(format!("Invalid {what} payload from IMS backend: {e}")))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url),
        })
    }

    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(DEFAULT_BASE_URL)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_value(&self, path: &str, query: &[(&str, String)]) -> Result<Value, Error> {
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| friendly_error(&self.base_url, &e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status));
        }
        let text = resp
            .text()
            .await
            .map_err(|e| friendly_error(&self.base_url, &e))?;
        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| Error::Network(format!("Invalid JSON from IMS backend: {e}")))
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<Value, Error> {
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .http
            .request(method, &url)
            .json(body)
            .send()
            .await
            .map_err(|e| friendly_error(&self.base_url, &e))?;
        let status = resp.status();
        if !status.is_success() {
            // Keep validation details from the body when the backend sends them.
            let body_text = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<Value>(&body_text)
                .ok()
                .and_then(|json| {
                    json.get("error")
                        .or_else(|| json.get("message"))
                        .and_then(Value::as_str)
                        .map(|s| s.to_string())
                });
            return Err(match detail {
                Some(msg) => Error::Network(format!("{msg} (HTTP {})", status.as_u16())),
                None => status_error(status),
            });
        }
        let text = resp
            .text()
            .await
            .map_err(|e| friendly_error(&self.base_url, &e))?;
        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| Error::Network(format!("Invalid JSON from IMS backend: {e}")))
    }

    // --- sales ---

    pub async fn sales(&self, query: &ListQuery) -> Result<SalesPage, Error> {
        let value = self.get_value("/sales", &query.to_pairs()).await?;
        parse_sales_page(value)
    }

    pub async fn sale(&self, id: i64) -> Result<Order, Error> {
        let value = self.get_value(&format!("/sales/{id}"), &[]).await?;
        parse_object(value, "sale")
    }

    pub async fn update_sale_status(&self, id: i64, status: OrderStatus) -> Result<(), Error> {
        self.send_json(
            reqwest::Method::PUT,
            &format!("/sales/{id}/status"),
            &serde_json::json!({ "status": status.as_str() }),
        )
        .await?;
        Ok(())
    }

    /// Post-completion return adjustment. Callers build the request with
    /// [`AdjustmentRequest::from_returns`], which rejects empty return sets
    /// before any network traffic happens.
    pub async fn adjust_sale(&self, id: i64, request: &AdjustmentRequest) -> Result<(), Error> {
        self.send_json(reqwest::Method::POST, &format!("/sales/{id}/adjust"), request)
            .await?;
        Ok(())
    }

    /// The backend's own receipt rendering, as raw PDF bytes.
    pub async fn sale_receipt_pdf(&self, id: i64) -> Result<Vec<u8>, Error> {
        let url = format!("{}/sales/{id}/pdf", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| friendly_error(&self.base_url, &e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| friendly_error(&self.base_url, &e))?;
        if !bytes.starts_with(b"%PDF") {
            return Err(Error::Network(
                "IMS backend returned something other than a PDF".to_string(),
            ));
        }
        Ok(bytes.to_vec())
    }

    // --- products ---

    pub async fn products(&self, search: Option<&str>) -> Result<Vec<Product>, Error> {
        let mut query = Vec::new();
        if let Some(search) = search {
            if !search.trim().is_empty() {
                query.push(("search", search.trim().to_string()));
            }
        }
        let value = self.get_value("/products", &query).await?;
        parse_collection(value, "products")
    }

    pub async fn product(&self, id: i64) -> Result<Product, Error> {
        let value = self.get_value(&format!("/products/{id}"), &[]).await?;
        parse_object(value, "product")
    }

    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, Error> {
        let value = self
            .send_json(reqwest::Method::POST, "/products", product)
            .await?;
        parse_object(value, "product")
    }

    pub async fn update_product(&self, id: i64, product: &NewProduct) -> Result<Product, Error> {
        let value = self
            .send_json(reqwest::Method::PUT, &format!("/products/{id}"), product)
            .await?;
        parse_object(value, "product")
    }

    pub async fn adjust_stock(&self, id: i64, adjustment: &StockAdjustment) -> Result<(), Error> {
        self.send_json(
            reqwest::Method::POST,
            &format!("/products/{id}/adjust-stock"),
            adjustment,
        )
        .await?;
        Ok(())
    }

    // --- lookups ---

    pub async fn customers(&self) -> Result<Vec<Customer>, Error> {
        let value = self.get_value("/customers", &[]).await?;
        parse_collection(value, "customers")
    }

    pub async fn categories(&self) -> Result<Vec<Category>, Error> {
        let value = self.get_value("/categories", &[]).await?;
        parse_collection(value, "categories")
    }

    pub async fn units(&self) -> Result<Vec<UnitOfMeasure>, Error> {
        let value = self.get_value("/units", &[]).await?;
        parse_collection(value, "units")
    }

    pub async fn inventory_movements(&self) -> Result<Vec<InventoryMovement>, Error> {
        let value = self.get_value("/inventory/movements", &[]).await?;
        parse_collection(value, "movements")
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, Error> {
        let value = self.get_value("/dashboard/stats", &[]).await?;
        parse_object(value, "dashboard stats")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_base_urls() {
        assert_eq!(
            normalize_base_url("zaidawn.site/wp-json/ims/v1/"),
            "https://zaidawn.site/wp-json/ims/v1"
        );
        assert_eq!(
            normalize_base_url("localhost:8080/api//"),
            "http://localhost:8080/api"
        );
        assert_eq!(
            normalize_base_url("  https://example.com  "),
            "https://example.com"
        );
    }

    #[test]
    fn list_query_builds_pairs() {
        let q = ListQuery {
            page: Some(2),
            limit: Some(50),
            status: Some(OrderStatus::Completed),
            search: Some("  hinge ".to_string()),
            date_from: NaiveDate::from_ymd_opt(2026, 3, 1),
            date_to: NaiveDate::from_ymd_opt(2026, 3, 31),
        };
        let pairs = q.to_pairs();
        assert!(pairs.contains(&("page", "2".to_string())));
        assert!(pairs.contains(&("status", "completed".to_string())));
        assert!(pairs.contains(&("search", "hinge".to_string())));
        assert!(pairs.contains(&("dateFrom", "2026-03-01".to_string())));
        assert!(pairs.contains(&("dateTo", "2026-03-31".to_string())));
    }

    #[test]
    fn empty_query_builds_no_pairs() {
        assert!(ListQuery::default().to_pairs().is_empty());
    }

    fn order_json() -> Value {
        serde_json::json!({
            "id": 41,
            "orderNumber": "ORD-1001",
            "date": "2026-03-14",
            "items": [],
            "subtotal": 100.0,
            "total": 100.0,
            "paymentMethod": "cash",
            "status": "completed"
        })
    }

    #[test]
    fn parses_bare_array_listing() {
        let page = parse_sales_page(Value::Array(vec![order_json()])).unwrap();
        assert_eq!(page.orders.len(), 1);
        assert!(page.summary.is_none());
    }

    #[test]
    fn parses_enveloped_listing_with_summary() {
        let page = parse_sales_page(serde_json::json!({
            "sales": [order_json()],
            "summary": { "totalOrders": 1, "totalSales": 100.0, "avgOrderValue": 100.0 }
        }))
        .unwrap();
        assert_eq!(page.orders.len(), 1);
        let summary = page.summary.unwrap();
        assert_eq!(summary.total_orders, 1);
        assert_eq!(summary.total_sales, 100.0);
    }

    #[test]
    fn rejects_unexpected_listing_shape() {
        assert!(parse_sales_page(Value::String("nope".to_string())).is_err());
    }

    #[test]
    fn unwraps_data_envelopes() {
        let product: Product = parse_object(
            serde_json::json!({ "data": { "id": 1, "name": "Hinge", "sku": "H-1", "price": 100.0 } }),
            "product",
        )
        .unwrap();
        assert_eq!(product.sku, "H-1");
    }
}
