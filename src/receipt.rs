//! Receipt rendering: one order in, one downloadable PDF out.
//!
//! Two variants exist. The 80mm thermal receipt is the elaborate one:
//! watermarked background, styled header band, alternating item rows,
//! emphasized grand total, payment badge and an embedded verification QR,
//! on a variable-height roll whose page height comes from the layout plan.
//! The A4 receipt is the plain fallback used when a remote PDF endpoint is
//! unavailable.

use printpdf::path::PaintMode;
use printpdf::{
    image_crate, BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm,
    PdfDocument, PdfLayerReference, Point, Rect, Rgb, TextMatrix,
};
use tracing::warn;

use crate::api::ApiClient;
use crate::document::{money0, money2, qty, truncate_ellipsis, Document, RenderContext};
use crate::error::Error;
use crate::layout::{a4, thermal, LayoutCursor};
use crate::models::{Order, PaymentMethod};
use crate::qr::{self, QrOptions, QrPayload};

const DARK_BLUE: (f64, f64, f64) = (26.0 / 255.0, 54.0 / 255.0, 93.0 / 255.0);
const LIGHT_FILL: (f64, f64, f64) = (248.0 / 255.0, 250.0 / 255.0, 252.0 / 255.0);
const FAINT_FILL: (f64, f64, f64) = (252.0 / 255.0, 252.0 / 255.0, 254.0 / 255.0);
const BORDER_GRAY: (f64, f64, f64) = (200.0 / 255.0, 200.0 / 255.0, 220.0 / 255.0);
const WATERMARK_GRAY: (f64, f64, f64) = (0.94, 0.94, 0.94);
const BLACK: (f64, f64, f64) = (0.0, 0.0, 0.0);
const WHITE: (f64, f64, f64) = (1.0, 1.0, 1.0);
const MUTED_GRAY: (f64, f64, f64) = (100.0 / 255.0, 100.0 / 255.0, 100.0 / 255.0);
const FOOTER_GRAY: (f64, f64, f64) = (120.0 / 255.0, 120.0 / 255.0, 120.0 / 255.0);
const DISCOUNT_PINK: (f64, f64, f64) = (220.0 / 255.0, 38.0 / 255.0, 127.0 / 255.0);
const BADGE_GREEN: (f64, f64, f64) = (34.0 / 255.0, 197.0 / 255.0, 94.0 / 255.0);
const BADGE_BLUE: (f64, f64, f64) = (59.0 / 255.0, 130.0 / 255.0, 246.0 / 255.0);

/// Side of the embedded QR image on the thermal receipt, in millimetres.
const QR_SIZE_MM: f64 = 20.0;

/// Store identity printed on every receipt.
#[derive(Debug, Clone)]
pub struct StoreProfile {
    pub name: String,
    pub tagline: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    /// Fixed, non-localized currency prefix.
    pub currency: String,
    pub thanks_lines: Vec<String>,
    pub policy_title: String,
    pub policy_lines: Vec<String>,
}

impl Default for StoreProfile {
    fn default() -> Self {
        Self {
            name: "HARDWARE HOUSE".to_string(),
            tagline: "Premium Furniture Hardware".to_string(),
            address: "Hafizabad, Punjab".to_string(),
            phone: "+92-300-1234567".to_string(),
            website: "www.hardwarehouse.pk".to_string(),
            currency: "PKR".to_string(),
            thanks_lines: vec![
                "Your trust means everything to us".to_string(),
                "Visit us again soon!".to_string(),
            ],
            policy_title: "EXCHANGE POLICY".to_string(),
            policy_lines: vec![
                "Items exchangeable within 7 days".to_string(),
                "Original receipt required".to_string(),
                "Support: +92-300-1234567".to_string(),
                "Hours: Mon-Sat 9AM-8PM".to_string(),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Totals rows
// ---------------------------------------------------------------------------

/// Totals rows for the thermal receipt, zero-decimal amounts. Discount and
/// tax appear only when strictly positive; their presence shifts every
/// later block, so this is the single source of truth for both drawing and
/// the height plan.
pub fn thermal_totals_rows(order: &Order, currency: &str) -> Vec<(String, String)> {
    let mut rows = vec![(
        "Subtotal:".to_string(),
        format!("{currency} {}", money0(order.subtotal)),
    )];
    if order.discount > 0.0 {
        rows.push((
            "Discount:".to_string(),
            format!("-{currency} {}", money0(order.discount)),
        ));
    }
    if order.tax > 0.0 {
        rows.push((
            "Tax:".to_string(),
            format!("{currency} {}", money0(order.tax)),
        ));
    }
    rows.push((
        "TOTAL:".to_string(),
        format!("{currency} {}", money0(order.total)),
    ));
    rows
}

/// Totals lines for the A4 receipt, two-decimal amounts.
pub fn a4_totals_rows(order: &Order, currency: &str) -> Vec<String> {
    let mut rows = vec![format!("Subtotal: {currency} {}", money2(order.subtotal))];
    if order.discount > 0.0 {
        rows.push(format!("Discount: {currency} {}", money2(order.discount)));
    }
    if order.tax > 0.0 {
        rows.push(format!("Tax: {currency} {}", money2(order.tax)));
    }
    rows.push(format!("TOTAL: {currency} {}", money2(order.total)));
    rows
}

// ---------------------------------------------------------------------------
// Drawing canvas
// ---------------------------------------------------------------------------

/// Thin wrapper over a printpdf layer that draws in top-down millimetre
/// coordinates, matching the layout cursor. Shared with the tabular export
/// writers.
pub(crate) struct Canvas {
    pub(crate) layer: PdfLayerReference,
    pub(crate) page_height: f64,
    pub(crate) regular: IndirectFontRef,
    pub(crate) bold: IndirectFontRef,
}

impl Canvas {
    pub(crate) fn from_top(&self, y: f64) -> Mm {
        Mm((self.page_height - y) as f32)
    }

    pub(crate) fn set_fill(&self, rgb: (f64, f64, f64)) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(
                rgb.0 as f32,
                rgb.1 as f32,
                rgb.2 as f32,
                None,
            )));
    }

    pub(crate) fn set_outline(&self, rgb: (f64, f64, f64), thickness: f64) {
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(
                rgb.0 as f32,
                rgb.1 as f32,
                rgb.2 as f32,
                None,
            )));
        self.layer.set_outline_thickness(thickness as f32);
    }

    pub(crate) fn text(&self, text: &str, size: f64, x: f64, y: f64, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, size as f32, Mm(x as f32), self.from_top(y), font);
    }

    /// Centre-aligned text. Builtin Helvetica carries no metrics here, so
    /// the width is approximated at half an em per character.
    pub(crate) fn text_centered(&self, text: &str, size: f64, center_x: f64, y: f64, bold: bool) {
        let width_mm = text.chars().count() as f64 * size * 0.5 * 25.4 / 72.0;
        self.text(text, size, center_x - width_mm / 2.0, y, bold);
    }

    pub(crate) fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64, rgb: (f64, f64, f64)) {
        self.set_fill(rgb);
        let rect = Rect::new(
            Mm(x as f32),
            self.from_top(y + h),
            Mm((x + w) as f32),
            self.from_top(y),
        )
        .with_mode(PaintMode::Fill);
        self.layer.add_rect(rect);
    }

    pub(crate) fn stroke_rect(
        &self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        rgb: (f64, f64, f64),
        thickness: f64,
    ) {
        self.set_outline(rgb, thickness);
        let rect = Rect::new(
            Mm(x as f32),
            self.from_top(y + h),
            Mm((x + w) as f32),
            self.from_top(y),
        )
        .with_mode(PaintMode::Stroke);
        self.layer.add_rect(rect);
    }

    pub(crate) fn hline(&self, x1: f64, x2: f64, y: f64, rgb: (f64, f64, f64), thickness: f64) {
        self.set_outline(rgb, thickness);
        let line = Line {
            points: vec![
                (Point::new(Mm(x1 as f32), self.from_top(y)), false),
                (Point::new(Mm(x2 as f32), self.from_top(y)), false),
            ],
            is_closed: false,
        };
        self.layer.add_line(line);
    }

    /// Rotated text placed directly, used for the background watermark.
    fn text_rotated(&self, text: &str, size: f64, x: f64, y: f64, degrees: f64) {
        self.layer.begin_text_section();
        self.layer.set_font(&self.bold, size as f32);
        self.layer.set_text_matrix(TextMatrix::TranslateRotate(
            Mm(x as f32).into(),
            self.from_top(y).into(),
            degrees as f32,
        ));
        self.layer.write_text(text, &self.bold);
        self.layer.end_text_section();
    }
}

fn ensure_items(order: &Order) -> Result<(), Error> {
    if order.items.is_empty() {
        return Err(Error::validation(format!(
            "order {} has no line items",
            order.order_number
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Thermal (80mm) receipt
// ---------------------------------------------------------------------------

pub fn render_thermal_receipt(
    order: &Order,
    profile: &StoreProfile,
    ctx: &RenderContext,
) -> Result<Document, Error> {
    ensure_items(order)?;

    let page_w = thermal::PAGE_WIDTH;
    let page_h = thermal::page_height(order.items.len(), order.discount > 0.0, order.tax > 0.0);

    let (doc, page, layer) = PdfDocument::new(
        format!("Receipt {}", order.order_number),
        Mm(page_w as f32),
        Mm(page_h as f32),
        "receipt",
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let canvas = Canvas {
        layer: doc.get_page(page).get_layer(layer),
        page_height: page_h,
        regular,
        bold,
    };

    // Watermark goes down first so all foreground content sits above it.
    canvas.set_fill(WATERMARK_GRAY);
    let mut wm_y = 30.0;
    while wm_y < page_h - 20.0 {
        canvas.text_rotated(&profile.name, 24.0, 4.0, wm_y, 25.0);
        wm_y += 25.0;
    }

    let mut cursor = LayoutCursor::start(thermal::TOP_START);

    // Header band
    canvas.fill_rect(
        2.0,
        cursor.y(),
        page_w - 4.0,
        thermal::HEADER_BAND_HEIGHT,
        DARK_BLUE,
    );
    canvas.set_fill(WHITE);
    canvas.text_centered(&profile.name, 16.0, page_w / 2.0, cursor.y() + 8.0, true);
    canvas.text_centered(&profile.tagline, 8.0, page_w / 2.0, cursor.y() + 15.0, false);
    canvas.text_centered(&profile.address, 8.0, page_w / 2.0, cursor.y() + 21.0, false);
    canvas.text_centered(&profile.phone, 8.0, page_w / 2.0, cursor.y() + 27.0, false);
    canvas.text_centered(&profile.website, 8.0, page_w / 2.0, cursor.y() + 33.0, false);
    cursor = cursor.advance(thermal::HEADER_ADVANCE);

    // Dotted separator
    let mut dot_x = 5.0;
    while dot_x < page_w - 5.0 {
        canvas.fill_rect(dot_x, cursor.y() - 0.3, 0.6, 0.6, DARK_BLUE);
        dot_x += 3.0;
    }
    cursor = cursor.advance(thermal::DOTTED_SEPARATOR_ADVANCE);

    // Receipt title box
    canvas.fill_rect(5.0, cursor.y(), page_w - 10.0, thermal::TITLE_BOX_HEIGHT, LIGHT_FILL);
    canvas.stroke_rect(5.0, cursor.y(), page_w - 10.0, thermal::TITLE_BOX_HEIGHT, DARK_BLUE, 0.3);
    canvas.set_fill(DARK_BLUE);
    canvas.text_centered("SALES RECEIPT", 11.0, page_w / 2.0, cursor.y() + 8.0, true);
    cursor = cursor.advance(thermal::TITLE_ADVANCE);

    // Metadata box
    canvas.fill_rect(3.0, cursor.y(), page_w - 6.0, thermal::META_BOX_HEIGHT, FAINT_FILL);
    canvas.stroke_rect(3.0, cursor.y(), page_w - 6.0, thermal::META_BOX_HEIGHT, BORDER_GRAY, 0.2);
    canvas.set_fill(BLACK);
    let mut meta_y = cursor.y() + 5.0;
    let meta = [
        ("Receipt:", order.order_number.clone()),
        ("Date:", order.date.format("%d/%m/%Y").to_string()),
        ("Time:", order.time.clone()),
        ("Customer:", truncate_ellipsis(order.customer_display(), 25)),
        ("Cashier:", order.created_by.clone()),
    ];
    for (label, value) in meta {
        canvas.text(label, 8.0, 6.0, meta_y, true);
        canvas.text(&value, 8.0, 30.0, meta_y, false);
        meta_y += 5.0;
    }
    cursor = cursor.advance(thermal::META_ADVANCE);

    // Items table header
    canvas.fill_rect(3.0, cursor.y(), page_w - 6.0, 8.0, DARK_BLUE);
    canvas.set_fill(WHITE);
    let head_y = cursor.y() + 5.0;
    canvas.text("ITEM", 7.0, 6.0, head_y, true);
    canvas.text("QTY", 7.0, page_w - 35.0, head_y, true);
    canvas.text("RATE", 7.0, page_w - 25.0, head_y, true);
    canvas.text("TOTAL", 7.0, page_w - 12.0, head_y, true);
    cursor = cursor.advance(thermal::ITEMS_HEADER_ADVANCE);

    // Item rows with alternating shading
    for (index, item) in order.items.iter().enumerate() {
        if index % 2 == 1 {
            canvas.fill_rect(3.0, cursor.y(), page_w - 6.0, thermal::ITEM_ROW_HEIGHT, LIGHT_FILL);
        }
        canvas.set_fill(BLACK);
        let row_y = cursor.y() + 4.0;
        canvas.text(&truncate_ellipsis(&item.product_name, 28), 7.0, 6.0, row_y, false);
        canvas.text(&qty(item.quantity), 7.0, page_w - 33.0, row_y, false);
        canvas.text(&money0(item.unit_price), 7.0, page_w - 24.0, row_y, false);
        canvas.text(&money0(item.total), 7.0, page_w - 10.0, row_y, false);
        cursor = cursor.advance(thermal::ITEM_ROW_HEIGHT);
    }

    // Rule under the table
    cursor = cursor.advance(2.0);
    canvas.hline(6.0, page_w - 6.0, cursor.y(), DARK_BLUE, 0.5);
    cursor = cursor.advance(thermal::ITEMS_RULE_ADVANCE - 2.0);

    // Totals box
    canvas.fill_rect(page_w - 40.0, cursor.y(), 35.0, thermal::TOTALS_BOX_HEIGHT, FAINT_FILL);
    canvas.stroke_rect(page_w - 40.0, cursor.y(), 35.0, thermal::TOTALS_BOX_HEIGHT, BORDER_GRAY, 0.2);
    let totals_x = page_w - 37.0;
    cursor = cursor.advance(4.0);
    let mut rows = thermal_totals_rows(order, &profile.currency);
    let grand = rows.pop().unwrap_or_default();
    for (label, value) in &rows {
        let color = if label == "Discount:" { DISCOUNT_PINK } else { BLACK };
        canvas.set_fill(color);
        canvas.text(label, 7.0, totals_x - 15.0, cursor.y(), false);
        canvas.text(value, 7.0, totals_x, cursor.y(), false);
        cursor = cursor.advance(thermal::TOTALS_CONDITIONAL_ROW);
    }
    canvas.fill_rect(page_w - 40.0, cursor.y(), 35.0, thermal::TOTAL_BAND_HEIGHT, DARK_BLUE);
    canvas.set_fill(WHITE);
    canvas.text(&grand.0, 8.0, totals_x - 15.0, cursor.y() + 5.0, true);
    canvas.text(&grand.1, 8.0, totals_x, cursor.y() + 5.0, true);
    cursor = cursor.advance(15.0);

    // Payment method badge
    canvas.set_fill(BLACK);
    canvas.text("Payment Method:", 8.0, 6.0, cursor.y(), true);
    let badge_color = if order.payment_method == PaymentMethod::Cash {
        BADGE_GREEN
    } else {
        BADGE_BLUE
    };
    canvas.fill_rect(6.0, cursor.y() + 3.0, 25.0, 6.0, badge_color);
    canvas.set_fill(WHITE);
    canvas.text_centered(
        &order.payment_method.badge_label(),
        7.0,
        18.5,
        cursor.y() + 7.0,
        true,
    );
    cursor = cursor.advance(thermal::PAYMENT_ADVANCE);

    // Verification QR in a framed box
    canvas.set_fill(BLACK);
    canvas.text("Scan to Verify:", 8.0, 6.0, cursor.y(), true);
    canvas.fill_rect(page_w / 2.0 - 12.0, cursor.y() + 3.0, 24.0, 24.0, WHITE);
    canvas.stroke_rect(page_w / 2.0 - 12.0, cursor.y() + 3.0, 24.0, 24.0, DARK_BLUE, 1.0);
    embed_qr(&canvas, order, page_w / 2.0 - 10.0, cursor.y() + 5.0)?;
    cursor = cursor.advance(thermal::QR_ADVANCE);

    // Thank-you box
    canvas.fill_rect(3.0, cursor.y(), page_w - 6.0, thermal::THANKS_BOX_HEIGHT, LIGHT_FILL);
    canvas.stroke_rect(3.0, cursor.y(), page_w - 6.0, thermal::THANKS_BOX_HEIGHT, DARK_BLUE, 0.3);
    canvas.set_fill(DARK_BLUE);
    canvas.text_centered("Thank You!", 9.0, page_w / 2.0, cursor.y() + 6.0, true);
    canvas.set_fill(MUTED_GRAY);
    let mut thanks_y = cursor.y() + 11.0;
    for line in &profile.thanks_lines {
        canvas.text_centered(line, 6.0, page_w / 2.0, thanks_y, false);
        thanks_y += 4.0;
    }
    cursor = cursor.advance(thermal::THANKS_ADVANCE);

    // Policy box
    canvas.fill_rect(3.0, cursor.y(), page_w - 6.0, thermal::POLICY_BOX_HEIGHT, DARK_BLUE);
    canvas.set_fill(WHITE);
    canvas.text_centered(&profile.policy_title, 6.0, page_w / 2.0, cursor.y() + 4.0, true);
    let mut policy_y = cursor.y() + 8.0;
    for line in &profile.policy_lines {
        canvas.text_centered(line, 5.0, page_w / 2.0, policy_y, false);
        policy_y += 3.0;
    }
    cursor = cursor.advance(thermal::POLICY_ADVANCE);

    // Footer
    canvas.set_fill(FOOTER_GRAY);
    canvas.text_centered(
        &format!("Generated: {}", ctx.timestamp()),
        5.0,
        page_w / 2.0,
        cursor.y(),
        false,
    );
    canvas.text_centered(
        &format!("Receipt ID: {}", order.order_number),
        5.0,
        page_w / 2.0,
        cursor.y() + thermal::FOOTER_ADVANCE,
        false,
    );

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| Error::render(e.to_string()))?;
    Ok(Document {
        bytes,
        filename: format!("receipt_{}_80mm.pdf", order.order_number),
    })
}

fn embed_qr(canvas: &Canvas, order: &Order, x: f64, y: f64) -> Result<(), Error> {
    let payload = QrPayload::for_order(order).encode();
    let bitmap = qr::rasterize(&payload, &QrOptions::default())?;
    let buffer = image_crate::GrayImage::from_raw(bitmap.size, bitmap.size, bitmap.pixels)
        .ok_or_else(|| Error::render("QR bitmap size mismatch"))?;
    let dynamic = image_crate::DynamicImage::ImageLuma8(buffer);
    let image = Image::from_dynamic_image(&dynamic);
    let dpi = bitmap.size as f64 * 25.4 / QR_SIZE_MM;
    image.add_to_layer(
        canvas.layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x as f32)),
            translate_y: Some(canvas.from_top(y + QR_SIZE_MM)),
            dpi: Some(dpi as f32),
            ..Default::default()
        },
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// A4 receipt (plain fallback)
// ---------------------------------------------------------------------------

pub fn render_a4_receipt(
    order: &Order,
    profile: &StoreProfile,
    ctx: &RenderContext,
) -> Result<Document, Error> {
    ensure_items(order)?;

    let page_w = a4::PAGE_WIDTH;
    let page_h = a4::PAGE_HEIGHT;
    let (doc, page, layer) = PdfDocument::new(
        format!("Receipt {}", order.order_number),
        Mm(page_w as f32),
        Mm(page_h as f32),
        "receipt",
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let canvas = Canvas {
        layer: doc.get_page(page).get_layer(layer),
        page_height: page_h,
        regular,
        bold,
    };

    canvas.set_fill(BLACK);
    let mut cursor = LayoutCursor::start(20.0);
    canvas.text_centered(&profile.name, 20.0, page_w / 2.0, cursor.y(), true);
    cursor = cursor.advance(10.0);
    canvas.text_centered(&profile.address, 12.0, page_w / 2.0, cursor.y(), false);
    cursor = cursor.advance(20.0);

    canvas.text_centered("SALES RECEIPT", 16.0, page_w / 2.0, cursor.y(), true);
    cursor = cursor.advance(15.0);

    canvas.text(
        &format!("Order Number: {}", order.order_number),
        10.0,
        20.0,
        cursor.y(),
        false,
    );
    canvas.text(
        &format!("Date: {}", order.date.format("%d/%m/%Y")),
        10.0,
        page_w - 80.0,
        cursor.y(),
        false,
    );
    cursor = cursor.advance(8.0);
    canvas.text(
        &format!("Customer: {}", order.customer_display()),
        10.0,
        20.0,
        cursor.y(),
        false,
    );
    canvas.text(
        &format!("Time: {}", order.time),
        10.0,
        page_w - 80.0,
        cursor.y(),
        false,
    );
    cursor = cursor.advance(8.0);
    canvas.text(
        &format!("Payment Method: {}", order.payment_method.badge_label()),
        10.0,
        20.0,
        cursor.y(),
        false,
    );
    canvas.text(
        &format!("Status: {}", order.status.as_str().to_ascii_uppercase()),
        10.0,
        page_w - 80.0,
        cursor.y(),
        false,
    );
    cursor = cursor.advance(15.0);

    // Items table
    canvas.text("Item", 10.0, 20.0, cursor.y(), true);
    canvas.text("Qty", 10.0, 80.0, cursor.y(), true);
    canvas.text("Rate", 10.0, 110.0, cursor.y(), true);
    canvas.text("Amount", 10.0, 150.0, cursor.y(), true);
    cursor = cursor.advance(5.0);
    canvas.hline(20.0, page_w - 20.0, cursor.y(), BLACK, 0.3);
    cursor = cursor.advance(8.0);

    for item in &order.items {
        canvas.text(&truncate_ellipsis(&item.product_name, 25), 10.0, 20.0, cursor.y(), false);
        canvas.text(&qty(item.quantity), 10.0, 80.0, cursor.y(), false);
        canvas.text(
            &format!("{} {}", profile.currency, money2(item.unit_price)),
            10.0,
            110.0,
            cursor.y(),
            false,
        );
        canvas.text(
            &format!("{} {}", profile.currency, money2(item.total)),
            10.0,
            150.0,
            cursor.y(),
            false,
        );
        cursor = cursor.advance(6.0);
    }

    cursor = cursor.advance(5.0);
    canvas.hline(20.0, page_w - 20.0, cursor.y(), BLACK, 0.3);
    cursor = cursor.advance(10.0);

    let mut rows = a4_totals_rows(order, &profile.currency);
    let grand = rows.pop().unwrap_or_default();
    for row in &rows {
        canvas.text(row, 10.0, 110.0, cursor.y(), true);
        cursor = cursor.advance(6.0);
    }
    canvas.text(&grand, 12.0, 110.0, cursor.y(), true);
    cursor = cursor.advance(20.0);

    canvas.text_centered("Thank you for your business!", 8.0, page_w / 2.0, cursor.y(), false);
    cursor = cursor.advance(5.0);
    canvas.text_centered(
        &format!("Generated on {}", ctx.timestamp()),
        8.0,
        page_w / 2.0,
        cursor.y(),
        false,
    );

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| Error::render(e.to_string()))?;
    Ok(Document {
        bytes,
        filename: format!("order_{}_receipt.pdf", order.order_number),
    })
}

// ---------------------------------------------------------------------------
// Remote-first delivery
// ---------------------------------------------------------------------------

/// Prefer the backend's rendered receipt; on any fetch failure fall back to
/// local generation. The fallback is logged once as a warning and never
/// retried.
pub async fn fetch_or_render_receipt(
    client: &ApiClient,
    order: &Order,
    profile: &StoreProfile,
    ctx: &RenderContext,
) -> Result<Document, Error> {
    match client.sale_receipt_pdf(order.id).await {
        Ok(bytes) => Ok(Document {
            bytes,
            filename: format!("order_{}_receipt.pdf", order.order_number),
        }),
        Err(err) => {
            warn!(
                order_number = %order.order_number,
                error = %err,
                "remote receipt generation unavailable, rendering locally"
            );
            render_a4_receipt(order, profile, ctx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LineItem, OrderStatus};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn ctx() -> RenderContext {
        RenderContext::at(Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap())
    }

    fn order(discount: f64, tax: f64, item_count: usize) -> Order {
        let items = (0..item_count)
            .map(|i| LineItem {
                product_id: i as i64 + 1,
                product_name: format!("Hinge {i}"),
                quantity: 2.0,
                unit_price: 50.0,
                total: 100.0,
            })
            .collect::<Vec<_>>();
        let subtotal = 100.0 * item_count as f64;
        Order {
            id: 41,
            order_number: "ORD-1001".to_string(),
            customer_id: None,
            customer_name: None,
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            time: "14:05".to_string(),
            items,
            subtotal,
            discount,
            tax,
            total: subtotal - discount + tax,
            payment_method: PaymentMethod::Cash,
            status: OrderStatus::Completed,
            created_by: "admin".to_string(),
            created_at: String::new(),
        }
    }

    #[test]
    fn ord_1001_scenario_omits_discount_and_tax_rows() {
        let order = order(0.0, 0.0, 1);
        let rows = thermal_totals_rows(&order, "PKR");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], ("Subtotal:".to_string(), "PKR 100".to_string()));
        assert_eq!(rows[1], ("TOTAL:".to_string(), "PKR 100".to_string()));
        assert!(rows.iter().all(|(label, _)| label != "Discount:" && label != "Tax:"));
    }

    #[test]
    fn discount_row_is_negative_and_conditional() {
        let order = order(20.0, 5.0, 1);
        let rows = thermal_totals_rows(&order, "PKR");
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1], ("Discount:".to_string(), "-PKR 20".to_string()));
        assert_eq!(rows[2], ("Tax:".to_string(), "PKR 5".to_string()));
    }

    #[test]
    fn a4_rows_use_two_decimals() {
        let order = order(0.0, 0.0, 1);
        let rows = a4_totals_rows(&order, "PKR");
        assert_eq!(rows, vec!["Subtotal: PKR 100.00", "TOTAL: PKR 100.00"]);
    }

    #[test]
    fn thermal_receipt_renders_pdf_bytes() {
        let doc = render_thermal_receipt(&order(0.0, 0.0, 3), &StoreProfile::default(), &ctx())
            .unwrap();
        assert!(doc.bytes.starts_with(b"%PDF"));
        assert_eq!(doc.filename, "receipt_ORD-1001_80mm.pdf");
    }

    #[test]
    fn a4_receipt_renders_pdf_bytes() {
        let doc =
            render_a4_receipt(&order(20.0, 5.0, 2), &StoreProfile::default(), &ctx()).unwrap();
        assert!(doc.bytes.starts_with(b"%PDF"));
        assert_eq!(doc.filename, "order_ORD-1001_receipt.pdf");
    }

    #[test]
    fn order_without_items_is_rejected() {
        let empty = order(0.0, 0.0, 0);
        let result = render_thermal_receipt(&empty, &StoreProfile::default(), &ctx());
        assert!(matches!(result, Err(Error::Validation(_))));
        let result = render_a4_receipt(&empty, &StoreProfile::default(), &ctx());
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn unreachable_backend_falls_back_to_local_a4() {
        let client = ApiClient::new("http://127.0.0.1:1").unwrap();
        let doc = fetch_or_render_receipt(
            &client,
            &order(0.0, 0.0, 1),
            &StoreProfile::default(),
            &ctx(),
        )
        .await
        .unwrap();
        assert!(doc.bytes.starts_with(b"%PDF"));
        assert_eq!(doc.filename, "order_ORD-1001_receipt.pdf");
    }

    #[test]
    fn bigger_orders_render_taller_pages() {
        // Indirect check through the layout plan the renderer uses.
        let short = thermal::page_height(1, false, false);
        let tall = thermal::page_height(12, true, true);
        assert!(tall > short);
    }
}
