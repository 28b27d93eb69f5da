//! Vertical layout cursor for coordinate-addressed PDF drawing.
//!
//! Blocks are drawn top-to-bottom; each draw call advances the cursor by a
//! fixed amount, so block positions never overlap and the final cursor is a
//! deterministic function of the input. The thermal receipt's page height is
//! taken from the planned final cursor, which is what makes the roll
//! variable-height.

/// Millimetres from the top edge of the page.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct LayoutCursor {
    y: f64,
}

impl LayoutCursor {
    pub fn start(y: f64) -> Self {
        Self { y }
    }

    /// Advance down the page. Returns the new cursor; the old one stays
    /// valid for drawing the block that caused the advance.
    #[must_use]
    pub fn advance(self, mm: f64) -> Self {
        Self { y: self.y + mm }
    }

    pub fn y(self) -> f64 {
        self.y
    }
}

/// Thermal (80mm roll) block metrics. One constant per block advance so the
/// drawing code and the height plan cannot drift apart.
pub mod thermal {
    pub const PAGE_WIDTH: f64 = 80.0;
    pub const TOP_START: f64 = 8.0;

    /// Header band is 35mm tall; the cursor clears it plus breathing room.
    pub const HEADER_BAND_HEIGHT: f64 = 35.0;
    pub const HEADER_ADVANCE: f64 = 45.0;
    pub const DOTTED_SEPARATOR_ADVANCE: f64 = 5.0;
    pub const TITLE_BOX_HEIGHT: f64 = 12.0;
    pub const TITLE_ADVANCE: f64 = 18.0;
    /// Metadata box (receipt no / date / time / customer / cashier).
    pub const META_BOX_HEIGHT: f64 = 28.0;
    pub const META_ADVANCE: f64 = 33.0;
    pub const ITEMS_HEADER_ADVANCE: f64 = 8.0;
    pub const ITEM_ROW_HEIGHT: f64 = 6.0;
    pub const ITEMS_RULE_ADVANCE: f64 = 7.0;
    /// Totals block: subtotal line plus the grand-total band.
    pub const TOTALS_BASE_ADVANCE: f64 = 23.0;
    /// Extra advance per conditional row (discount, tax).
    pub const TOTALS_CONDITIONAL_ROW: f64 = 4.0;
    pub const TOTALS_BOX_HEIGHT: f64 = 20.0;
    pub const TOTAL_BAND_HEIGHT: f64 = 8.0;
    pub const PAYMENT_ADVANCE: f64 = 15.0;
    pub const QR_ADVANCE: f64 = 30.0;
    pub const THANKS_BOX_HEIGHT: f64 = 18.0;
    pub const THANKS_ADVANCE: f64 = 25.0;
    pub const POLICY_BOX_HEIGHT: f64 = 20.0;
    pub const POLICY_ADVANCE: f64 = 25.0;
    /// Two footer lines, 3mm apart.
    pub const FOOTER_ADVANCE: f64 = 3.0;
    pub const BOTTOM_MARGIN: f64 = 9.0;

    /// Final page height for a receipt with `item_count` rows and the given
    /// conditional totals rows. Strictly increasing in `item_count` and in
    /// each flag.
    pub fn page_height(item_count: usize, has_discount: bool, has_tax: bool) -> f64 {
        let mut y = TOP_START
            + HEADER_ADVANCE
            + DOTTED_SEPARATOR_ADVANCE
            + TITLE_ADVANCE
            + META_ADVANCE
            + ITEMS_HEADER_ADVANCE
            + ITEM_ROW_HEIGHT * item_count as f64
            + ITEMS_RULE_ADVANCE
            + TOTALS_BASE_ADVANCE
            + PAYMENT_ADVANCE
            + QR_ADVANCE
            + THANKS_ADVANCE
            + POLICY_ADVANCE
            + FOOTER_ADVANCE;
        if has_discount {
            y += TOTALS_CONDITIONAL_ROW;
        }
        if has_tax {
            y += TOTALS_CONDITIONAL_ROW;
        }
        y + BOTTOM_MARGIN
    }
}

/// A4 page metrics shared by the simple receipt and the tabular exports.
pub mod a4 {
    pub const PAGE_WIDTH: f64 = 210.0;
    pub const PAGE_HEIGHT: f64 = 297.0;
    /// Tabular exports start a new page once the cursor passes this far
    /// from the bottom edge.
    pub const PAGE_BREAK_GUARD: f64 = 30.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_advances_monotonically() {
        let c = LayoutCursor::start(8.0);
        let c2 = c.advance(45.0);
        assert_eq!(c.y(), 8.0);
        assert_eq!(c2.y(), 53.0);
        assert!(c2.advance(0.5).y() > c2.y());
    }

    #[test]
    fn thermal_height_strictly_increases_with_item_count() {
        let mut last = 0.0;
        for n in 0..40 {
            let h = thermal::page_height(n, false, false);
            assert!(h > last, "height must grow with every item row");
            last = h;
        }
        assert_eq!(
            thermal::page_height(5, false, false) - thermal::page_height(4, false, false),
            thermal::ITEM_ROW_HEIGHT
        );
    }

    #[test]
    fn conditional_rows_shift_every_subsequent_block() {
        let base = thermal::page_height(3, false, false);
        assert_eq!(
            thermal::page_height(3, true, false),
            base + thermal::TOTALS_CONDITIONAL_ROW
        );
        assert_eq!(
            thermal::page_height(3, true, true),
            base + 2.0 * thermal::TOTALS_CONDITIONAL_ROW
        );
    }
}
