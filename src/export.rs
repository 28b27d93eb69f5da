//! Bulk export writers: the full current order/product listing to CSV or a
//! tabular PDF report, named after the export date.
//!
//! CSV output is deliberately minimal: fields are quoted only when they
//! contain a comma, which covers the display timestamp and "Last, First"
//! customer names. Fields containing quotes or newlines are not escaped;
//! none of the exported columns produce them.

use printpdf::{BuiltinFont, Mm, PdfDocument, PdfDocumentReference, PdfLayerIndex, PdfPageIndex};
use tracing::info;

use crate::document::{group_thousands, money2, qty, truncate_ellipsis, Document, RenderContext};
use crate::error::Error;
use crate::layout::{a4, LayoutCursor};
use crate::models::{Order, Product};
use crate::receipt::{Canvas, StoreProfile};
use crate::summary::{stock_health, summarize_inventory, summarize_orders, StockHealth};

const BLACK: (f64, f64, f64) = (0.0, 0.0, 0.0);
const WHITE: (f64, f64, f64) = (1.0, 1.0, 1.0);
const SLATE: (f64, f64, f64) = (71.0 / 255.0, 85.0 / 255.0, 105.0 / 255.0);
const ROW_FILL: (f64, f64, f64) = (248.0 / 255.0, 250.0 / 255.0, 252.0 / 255.0);
const ALERT_RED: (f64, f64, f64) = (220.0 / 255.0, 38.0 / 255.0, 38.0 / 255.0);
const FOOTER_GRAY: (f64, f64, f64) = (120.0 / 255.0, 120.0 / 255.0, 120.0 / 255.0);

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Quote a field only when it contains a comma.
pub(crate) fn csv_field(field: &str) -> String {
    if field.contains(',') {
        format!("\"{field}\"")
    } else {
        field.to_string()
    }
}

fn csv_line(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Column headers for the orders CSV. Fixed here rather than derived from
/// the first record, so an empty export still carries its header row.
pub fn order_export_headers(currency: &str) -> Vec<String> {
    vec![
        "Order Number".to_string(),
        "Customer Name".to_string(),
        "Customer ID".to_string(),
        "Date".to_string(),
        "Time".to_string(),
        "Items Count".to_string(),
        "Items".to_string(),
        format!("Subtotal ({currency})"),
        format!("Discount ({currency})"),
        format!("Tax ({currency})"),
        format!("Total ({currency})"),
        "Payment Method".to_string(),
        "Status".to_string(),
        "Created By".to_string(),
        "Created At".to_string(),
    ]
}

pub fn product_export_headers(currency: &str) -> Vec<String> {
    vec![
        "Name".to_string(),
        "SKU".to_string(),
        "Category".to_string(),
        "Unit".to_string(),
        format!("Price ({currency})"),
        format!("Cost Price ({currency})"),
        "Stock".to_string(),
        "Min Stock".to_string(),
        "Max Stock".to_string(),
        "Stock Status".to_string(),
        format!("Stock Value ({currency})"),
        "Status".to_string(),
    ]
}

pub(crate) fn stock_health_label(health: StockHealth) -> &'static str {
    match health {
        StockHealth::OutOfStock => "Out of Stock",
        StockHealth::LowStock => "Low Stock",
        StockHealth::Overstock => "Overstock",
        StockHealth::Adequate => "In Stock",
    }
}

/// "Hinge (2x); Screw Pack (1.50x)"
fn items_cell(order: &Order) -> String {
    order
        .items
        .iter()
        .map(|i| format!("{} ({}x)", i.product_name, qty(i.quantity)))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Orders CSV. The aggregate summary row sits directly under the header so
/// it survives any row-level sorting a spreadsheet user applies later.
pub fn orders_csv(orders: &[Order], profile: &StoreProfile, ctx: &RenderContext) -> Document {
    let currency = &profile.currency;
    let summary = summarize_orders(orders);

    let mut lines = vec![csv_line(&order_export_headers(currency))];

    let mut summary_row = vec![
        "SUMMARY".to_string(),
        format!("Total Orders: {}", summary.total_orders),
        format!("Export Date: {}", ctx.timestamp()),
        format!("Total Sales: {currency} {}", group_thousands(summary.total_sales)),
    ];
    summary_row.resize(15, String::new());
    lines.push(csv_line(&summary_row));

    for order in orders {
        let row = vec![
            order.order_number.clone(),
            // CSV keeps the short fallback; only receipts spell it out.
            order
                .customer_name
                .clone()
                .unwrap_or_else(|| "Walk-in".to_string()),
            order
                .customer_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            order.date.format("%d/%m/%Y").to_string(),
            order.time.clone(),
            order.items.len().to_string(),
            items_cell(order),
            money2(order.subtotal),
            money2(order.discount),
            money2(order.tax),
            money2(order.total),
            order.payment_method.as_str().to_string(),
            order.status.as_str().to_string(),
            order.created_by.clone(),
            order.created_at.clone(),
        ];
        lines.push(csv_line(&row));
    }

    let mut body = lines.join("\n");
    body.push('\n');
    info!(orders = orders.len(), "orders CSV export written");
    Document {
        bytes: body.into_bytes(),
        filename: format!("orders_export_{}.csv", ctx.date_stamp()),
    }
}

/// Products CSV with the inventory valuation summary under the header.
pub fn products_csv(products: &[Product], profile: &StoreProfile, ctx: &RenderContext) -> Document {
    let currency = &profile.currency;
    let summary = summarize_inventory(products);

    let mut lines = vec![csv_line(&product_export_headers(currency))];

    let mut summary_row = vec![
        "SUMMARY".to_string(),
        format!("Total Products: {}", summary.total_products),
        format!("Export Date: {}", ctx.timestamp()),
        format!(
            "Retail Value: {currency} {}",
            group_thousands(summary.retail_value)
        ),
    ];
    summary_row.resize(12, String::new());
    lines.push(csv_line(&summary_row));

    for product in products {
        let row = vec![
            product.name.clone(),
            product.sku.clone(),
            product.category.clone(),
            product.unit.clone(),
            money2(product.price),
            money2(product.cost_price),
            qty(product.stock),
            qty(product.min_stock),
            product.max_stock.map(qty).unwrap_or_default(),
            stock_health_label(stock_health(product)).to_string(),
            money2(product.price * product.stock),
            match product.status {
                crate::models::ProductStatus::Active => "active".to_string(),
                crate::models::ProductStatus::Inactive => "inactive".to_string(),
            },
        ];
        lines.push(csv_line(&row));
    }

    let mut body = lines.join("\n");
    body.push('\n');
    info!(products = products.len(), "products CSV export written");
    Document {
        bytes: body.into_bytes(),
        filename: format!("products_export_{}.csv", ctx.date_stamp()),
    }
}

// ---------------------------------------------------------------------------
// PDF reports
// ---------------------------------------------------------------------------

struct ReportDoc {
    doc: PdfDocumentReference,
    pages: Vec<(PdfPageIndex, PdfLayerIndex)>,
    regular: printpdf::IndirectFontRef,
    bold: printpdf::IndirectFontRef,
}

impl ReportDoc {
    fn new(title: &str) -> Result<Self, Error> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(a4::PAGE_WIDTH as f32),
            Mm(a4::PAGE_HEIGHT as f32),
            "report",
        );
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        Ok(Self {
            doc,
            pages: vec![(page, layer)],
            regular,
            bold,
        })
    }

    fn canvas(&self, index: usize) -> Canvas {
        let (page, layer) = self.pages[index];
        Canvas {
            layer: self.doc.get_page(page).get_layer(layer),
            page_height: a4::PAGE_HEIGHT,
            regular: self.regular.clone(),
            bold: self.bold.clone(),
        }
    }

    fn add_page(&mut self) -> Canvas {
        let added = self
            .doc
            .add_page(Mm(a4::PAGE_WIDTH as f32), Mm(a4::PAGE_HEIGHT as f32), "report");
        self.pages.push(added);
        self.canvas(self.pages.len() - 1)
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn finish(self, filename: String) -> Result<Document, Error> {
        let bytes = self
            .doc
            .save_to_bytes()
            .map_err(|e| Error::render(e.to_string()))?;
        Ok(Document { bytes, filename })
    }
}

fn needs_page_break(cursor: LayoutCursor) -> bool {
    cursor.y() > a4::PAGE_HEIGHT - a4::PAGE_BREAK_GUARD
}

const ORDERS_COL_X: [f64; 6] = [20.0, 45.0, 80.0, 105.0, 120.0, 145.0];

/// Tabular orders report. The column header row appears on the first page
/// only; continuation pages carry rows straight from the top margin.
pub fn orders_pdf(
    orders: &[Order],
    profile: &StoreProfile,
    ctx: &RenderContext,
) -> Result<Document, Error> {
    let summary = summarize_orders(orders);
    let mut report = ReportDoc::new("Orders Export Report")?;
    let mut canvas = report.canvas(0);

    canvas.set_fill(BLACK);
    let mut cursor = LayoutCursor::start(20.0);
    canvas.text_centered("Orders Export Report", 18.0, a4::PAGE_WIDTH / 2.0, cursor.y(), true);
    cursor = cursor.advance(12.0);

    canvas.text(&format!("Export Date: {}", ctx.timestamp()), 10.0, 20.0, cursor.y(), false);
    cursor = cursor.advance(6.0);
    canvas.text(
        &format!("Total Orders: {}", summary.total_orders),
        10.0,
        20.0,
        cursor.y(),
        false,
    );
    cursor = cursor.advance(6.0);
    canvas.text(
        &format!(
            "Total Sales: {} {}",
            profile.currency,
            group_thousands(summary.total_sales)
        ),
        10.0,
        20.0,
        cursor.y(),
        false,
    );
    cursor = cursor.advance(10.0);

    let headers = ["Order #", "Customer", "Date", "Items", "Total", "Status"];
    for (x, label) in ORDERS_COL_X.iter().zip(headers) {
        canvas.text(label, 9.0, *x, cursor.y(), true);
    }
    cursor = cursor.advance(2.0);
    canvas.hline(20.0, a4::PAGE_WIDTH - 20.0, cursor.y(), BLACK, 0.3);
    cursor = cursor.advance(6.0);

    for order in orders {
        if needs_page_break(cursor) {
            canvas = report.add_page();
            canvas.set_fill(BLACK);
            cursor = LayoutCursor::start(20.0);
        }
        let cells = [
            truncate_ellipsis(&order.order_number, 12),
            truncate_ellipsis(order.customer_display(), 18),
            order.date.format("%d/%m/%Y").to_string(),
            order.items.len().to_string(),
            money2(order.total),
            order.status.as_str().to_string(),
        ];
        for (x, cell) in ORDERS_COL_X.iter().zip(&cells) {
            canvas.text(cell, 8.0, *x, cursor.y(), false);
        }
        cursor = cursor.advance(6.0);
    }

    canvas.set_fill(FOOTER_GRAY);
    canvas.text_centered(
        &format!("Generated by {} Admin System", profile.name),
        8.0,
        a4::PAGE_WIDTH / 2.0,
        a4::PAGE_HEIGHT - 20.0,
        false,
    );

    info!(
        orders = orders.len(),
        pages = report.page_count(),
        "orders PDF report written"
    );
    report.finish(format!("orders_export_{}.pdf", ctx.date_stamp()))
}

const PRODUCTS_COL_X: [f64; 9] = [14.0, 34.0, 69.0, 89.0, 107.0, 125.0, 143.0, 161.0, 179.0];
const PRODUCTS_HEADERS: [&str; 9] = [
    "SKU", "Name", "Category", "Price", "Cost", "Stock", "Min", "Value", "Status",
];

fn products_table_header(canvas: &Canvas, cursor: LayoutCursor) -> LayoutCursor {
    canvas.fill_rect(14.0, cursor.y() - 4.5, a4::PAGE_WIDTH - 28.0, 7.0, SLATE);
    canvas.set_fill(WHITE);
    for (x, label) in PRODUCTS_COL_X.iter().zip(PRODUCTS_HEADERS) {
        canvas.text(label, 8.0, *x, cursor.y(), true);
    }
    cursor.advance(8.0)
}

/// Inventory report: valuation summary table followed by the full product
/// table, with the column header repeated on every page and page numbers
/// stamped on at the end.
pub fn products_pdf(
    products: &[Product],
    profile: &StoreProfile,
    ctx: &RenderContext,
) -> Result<Document, Error> {
    let summary = summarize_inventory(products);
    let currency = &profile.currency;
    let mut report = ReportDoc::new("Inventory Report")?;
    let mut canvas = report.canvas(0);

    canvas.set_fill(BLACK);
    let mut cursor = LayoutCursor::start(18.0);
    canvas.text("Inventory Report", 16.0, 14.0, cursor.y(), true);
    cursor = cursor.advance(7.0);
    canvas.text(&format!("Generated: {}", ctx.timestamp()), 9.0, 14.0, cursor.y(), false);
    cursor = cursor.advance(10.0);

    // Valuation summary table
    canvas.fill_rect(14.0, cursor.y() - 4.5, 100.0, 7.0, SLATE);
    canvas.set_fill(WHITE);
    canvas.text("Metric", 8.0, 16.0, cursor.y(), true);
    canvas.text("Value", 8.0, 80.0, cursor.y(), true);
    cursor = cursor.advance(8.0);

    let metrics = [
        ("Total Products", summary.total_products.to_string()),
        (
            "Total Cost Value",
            format!("{currency} {}", group_thousands(summary.cost_value)),
        ),
        (
            "Total Retail Value",
            format!("{currency} {}", group_thousands(summary.retail_value)),
        ),
        (
            "Potential Profit",
            format!("{currency} {}", group_thousands(summary.potential_profit)),
        ),
        ("Profit Margin", format!("{:.1}%", summary.profit_margin_pct)),
        (
            "Avg Cost Price",
            format!("{currency} {}", money2(summary.average_cost_price)),
        ),
        (
            "Avg Selling Price",
            format!("{currency} {}", money2(summary.average_selling_price)),
        ),
        ("Out of Stock Items", summary.out_of_stock_items.to_string()),
        ("Low Stock Items", summary.low_stock_items.to_string()),
        ("Overstock Items", summary.overstock_items.to_string()),
    ];
    for (i, (label, value)) in metrics.iter().enumerate() {
        if i % 2 == 0 {
            canvas.fill_rect(14.0, cursor.y() - 4.5, 100.0, 6.0, ROW_FILL);
        }
        canvas.set_fill(BLACK);
        canvas.text(label, 8.0, 16.0, cursor.y(), false);
        canvas.text(value, 8.0, 80.0, cursor.y(), false);
        cursor = cursor.advance(6.0);
    }
    cursor = cursor.advance(6.0);

    cursor = products_table_header(&canvas, cursor);

    for (i, product) in products.iter().enumerate() {
        if needs_page_break(cursor) {
            canvas = report.add_page();
            cursor = LayoutCursor::start(18.0);
            cursor = products_table_header(&canvas, cursor);
        }
        if i % 2 == 1 {
            canvas.fill_rect(14.0, cursor.y() - 4.5, a4::PAGE_WIDTH - 28.0, 6.0, ROW_FILL);
        }
        canvas.set_fill(BLACK);
        canvas.text(&truncate_ellipsis(&product.sku, 10), 7.0, PRODUCTS_COL_X[0], cursor.y(), false);
        canvas.text(&truncate_ellipsis(&product.name, 18), 7.0, PRODUCTS_COL_X[1], cursor.y(), false);
        canvas.text(
            &truncate_ellipsis(&product.category, 10),
            7.0,
            PRODUCTS_COL_X[2],
            cursor.y(),
            false,
        );
        canvas.text(&money2(product.price), 7.0, PRODUCTS_COL_X[3], cursor.y(), false);
        canvas.text(&money2(product.cost_price), 7.0, PRODUCTS_COL_X[4], cursor.y(), false);
        canvas.text(&qty(product.stock), 7.0, PRODUCTS_COL_X[5], cursor.y(), false);
        canvas.text(&qty(product.min_stock), 7.0, PRODUCTS_COL_X[6], cursor.y(), false);
        canvas.text(
            &group_thousands(product.price * product.stock),
            7.0,
            PRODUCTS_COL_X[7],
            cursor.y(),
            false,
        );
        let health = stock_health(product);
        let alert = health == StockHealth::OutOfStock || health == StockHealth::LowStock;
        if alert {
            canvas.set_fill(ALERT_RED);
        }
        canvas.text(
            stock_health_label(health),
            7.0,
            PRODUCTS_COL_X[8],
            cursor.y(),
            alert,
        );
        cursor = cursor.advance(6.0);
    }

    // Per-page footer, stamped once the page count is known.
    let total_pages = report.page_count();
    for index in 0..total_pages {
        let footer = report.canvas(index);
        footer.set_fill(FOOTER_GRAY);
        footer.text(
            &format!("{} - Inventory Management", profile.name),
            7.0,
            14.0,
            a4::PAGE_HEIGHT - 10.0,
            false,
        );
        footer.text(
            &format!("Page {} of {}", index + 1, total_pages),
            7.0,
            a4::PAGE_WIDTH - 30.0,
            a4::PAGE_HEIGHT - 10.0,
            false,
        );
    }

    info!(
        products = products.len(),
        pages = total_pages,
        "inventory PDF report written"
    );
    report.finish(format!("inventory-report-{}.pdf", ctx.date_stamp()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LineItem, OrderStatus, PaymentMethod, ProductStatus};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn ctx() -> RenderContext {
        RenderContext::at(Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap())
    }

    fn order(customer: Option<&str>) -> Order {
        Order {
            id: 1,
            order_number: "ORD-1001".to_string(),
            customer_id: Some(9),
            customer_name: customer.map(str::to_string),
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            time: "14:05".to_string(),
            items: vec![LineItem {
                product_id: 7,
                product_name: "Hinge".to_string(),
                quantity: 2.0,
                unit_price: 50.0,
                total: 100.0,
            }],
            subtotal: 100.0,
            discount: 0.0,
            tax: 0.0,
            total: 100.0,
            payment_method: PaymentMethod::Cash,
            status: OrderStatus::Completed,
            created_by: "admin".to_string(),
            created_at: "2026-03-14T14:05:00Z".to_string(),
        }
    }

    fn product(stock: f64, min_stock: f64) -> Product {
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
            max_stock: None,
            status: ProductStatus::Active,
            description: String::new(),
            is_incomplete: false,
            quantity_note: None,
            needs_quantity_update: false,
        }
    }

    fn csv_text(doc: &Document) -> String {
        String::from_utf8(doc.bytes.clone()).unwrap()
    }

    #[test]
    fn comma_bearing_fields_survive_a_csv_parser() {
        let doc = orders_csv(&[order(Some("Smith, John"))], &StoreProfile::default(), &ctx());
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(doc.bytes.as_slice());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        // summary row + one data row, every row 15 fields wide
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.len() == 15));
        assert_eq!(&records[1][1], "Smith, John");
        // the display timestamp also carries a comma
        assert!(records[0][2].contains(","));
    }

    #[test]
    fn empty_export_keeps_header_and_zeroed_summary() {
        let doc = orders_csv(&[], &StoreProfile::default(), &ctx());
        let text = csv_text(&doc);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Order Number,Customer Name"));
        assert!(lines[1].starts_with("SUMMARY,Total Orders: 0"));
        assert!(lines[1].contains("Total Sales: PKR 0"));
    }

    #[test]
    fn summary_row_sits_directly_under_the_header() {
        let doc = orders_csv(&[order(None)], &StoreProfile::default(), &ctx());
        let text = csv_text(&doc);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].starts_with("SUMMARY,"));
        assert!(lines[2].starts_with("ORD-1001,Walk-in,"));
    }

    #[test]
    fn csv_customer_fallback_is_the_short_form() {
        let doc = orders_csv(&[order(None)], &StoreProfile::default(), &ctx());
        let text = csv_text(&doc);
        assert!(text.contains("ORD-1001,Walk-in,"));
        assert!(!text.contains("Walk-in Customer"));
    }

    #[test]
    fn orders_csv_filename_uses_export_date() {
        let doc = orders_csv(&[], &StoreProfile::default(), &ctx());
        assert_eq!(doc.filename, "orders_export_2026-03-14.csv");
    }

    #[test]
    fn products_csv_labels_stock_health() {
        let doc = products_csv(
            &[product(0.0, 5.0), product(3.0, 5.0), product(50.0, 5.0)],
            &StoreProfile::default(),
            &ctx(),
        );
        let text = csv_text(&doc);
        assert!(text.contains("Out of Stock"));
        assert!(text.contains("Low Stock"));
        assert!(text.contains("In Stock"));
        assert_eq!(doc.filename, "products_export_2026-03-14.csv");
    }

    #[test]
    fn orders_pdf_renders_and_paginates() {
        let orders: Vec<Order> = (0..120).map(|_| order(None)).collect();
        let doc = orders_pdf(&orders, &StoreProfile::default(), &ctx()).unwrap();
        assert!(doc.bytes.starts_with(b"%PDF"));
        assert_eq!(doc.filename, "orders_export_2026-03-14.pdf");
    }

    #[test]
    fn products_pdf_renders_with_summary() {
        let products: Vec<Product> = (0..80).map(|_| product(10.0, 2.0)).collect();
        let doc = products_pdf(&products, &StoreProfile::default(), &ctx()).unwrap();
        assert!(doc.bytes.starts_with(b"%PDF"));
        assert_eq!(doc.filename, "inventory-report-2026-03-14.pdf");
    }

    #[test]
    fn empty_product_export_is_still_valid() {
        let doc = products_csv(&[], &StoreProfile::default(), &ctx());
        let text = csv_text(&doc);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("SUMMARY,Total Products: 0"));
    }
}
