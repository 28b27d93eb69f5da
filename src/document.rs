//! Generated-document plumbing shared by the receipt renderer and the bulk
//! export writers: the bytes-plus-filename contract, the generation
//! timestamp, and the small formatting helpers every document uses.

use chrono::{DateTime, Utc};

/// A finished document ready to hand to the host's file-save mechanism.
#[derive(Debug, Clone)]
pub struct Document {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// Carries the generation timestamp into renderers so filenames and
/// "Generated:" footers are deterministic under test.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    pub generated_at: DateTime<Utc>,
}

impl RenderContext {
    pub fn now() -> Self {
        Self {
            generated_at: Utc::now(),
        }
    }

    pub fn at(generated_at: DateTime<Utc>) -> Self {
        Self { generated_at }
    }

    /// `YYYY-MM-DD`, used in export filenames.
    pub fn date_stamp(&self) -> String {
        self.generated_at.format("%Y-%m-%d").to_string()
    }

    /// `DD/MM/YYYY, HH:MM:SS` display timestamp for footers and summary rows.
    pub fn timestamp(&self) -> String {
        self.generated_at.format("%d/%m/%Y, %H:%M:%S").to_string()
    }
}

/// Currency amount with no decimals, e.g. thermal receipt columns.
pub fn money0(value: f64) -> String {
    format!("{value:.0}")
}

/// Currency amount with two decimals, e.g. the A4 receipt.
pub fn money2(value: f64) -> String {
    format!("{value:.2}")
}

/// Quantity column: whole numbers print without a fraction.
pub fn qty(value: f64) -> String {
    if (value.round() - value).abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Thousands-grouped amount for summary figures ("Total Sales: PKR 12,450").
/// Not locale-aware; a comma every three integer digits, fraction kept only
/// when present.
pub fn group_thousands(value: f64) -> String {
    let negative = value < 0.0;
    let rounded = (value.abs() * 100.0).round() / 100.0;
    let whole = rounded.trunc() as u64;
    let frac = rounded - rounded.trunc();

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if frac > 0.0 {
        let tail = format!("{frac:.2}");
        let tail = tail.trim_start_matches('0').trim_end_matches('0');
        out.push_str(tail);
    }
    out
}

/// Cut a display string to `max` characters with an ellipsis suffix, so
/// table columns stay aligned.
pub fn truncate_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn context_stamps() {
        let ctx = RenderContext::at(Utc.with_ymd_and_hms(2026, 3, 14, 9, 5, 7).unwrap());
        assert_eq!(ctx.date_stamp(), "2026-03-14");
        assert_eq!(ctx.timestamp(), "14/03/2026, 09:05:07");
    }

    #[test]
    fn grouping() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(100.0), "100");
        assert_eq!(group_thousands(1234.0), "1,234");
        assert_eq!(group_thousands(1234567.0), "1,234,567");
        assert_eq!(group_thousands(1234.5), "1,234.5");
        assert_eq!(group_thousands(-9050.0), "-9,050");
    }

    #[test]
    fn truncation_appends_ellipsis_only_when_needed() {
        assert_eq!(truncate_ellipsis("Hinge", 28), "Hinge");
        let long = "Premium Brass Cabinet Door Hinge 4-inch";
        let cut = truncate_ellipsis(long, 28);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 31);
    }

    #[test]
    fn quantity_formatting() {
        assert_eq!(qty(2.0), "2");
        assert_eq!(qty(2.5), "2.50");
    }
}
