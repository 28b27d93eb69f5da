//! QR verification payload for printed receipts.
//!
//! The payload is a short pipe-delimited string carrying the order number
//! and paid total plus a `VERIFIED` marker. The marker is an informal
//! tag, not a signature; it offers no tamper resistance. Decoding recovers
//! the order number and total exactly.

use qrcode::{Color, EcLevel, QrCode};

use crate::error::Error;
use crate::models::Order;

const PREFIX: &str = "SHOPDESK";
const MARKER: &str = "VERIFIED";

#[derive(Debug, Clone, PartialEq)]
pub struct QrPayload {
    pub order_number: String,
    pub total: f64,
}

impl QrPayload {
    pub fn for_order(order: &Order) -> Self {
        Self {
            order_number: order.order_number.clone(),
            total: order.total,
        }
    }

    /// `SHOPDESK|{order_number}|{total}|VERIFIED`. Pipes keep order numbers
    /// containing dashes unambiguous.
    pub fn encode(&self) -> String {
        format!("{PREFIX}|{}|{}|{MARKER}", self.order_number, self.total)
    }

    pub fn decode(payload: &str) -> Result<Self, Error> {
        let parts: Vec<&str> = payload.split('|').collect();
        if parts.len() != 4 || parts[0] != PREFIX || parts[3] != MARKER {
            return Err(Error::validation("unrecognized receipt QR payload"));
        }
        let total: f64 = parts[2]
            .parse()
            .map_err(|_| Error::validation("unrecognized receipt QR payload"))?;
        Ok(Self {
            order_number: parts[1].to_string(),
            total,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QrOptions {
    /// Target edge length in pixels; the actual bitmap snaps to a whole
    /// number of pixels per module.
    pub pixels: u32,
    pub ec_level: EcLevel,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            pixels: 240,
            ec_level: EcLevel::H,
        }
    }
}

/// Square 8-bit grayscale bitmap: 0 is a dark module, 255 background.
/// Includes a one-module quiet zone on every side.
#[derive(Debug, Clone)]
pub struct QrBitmap {
    pub size: u32,
    pub pixels: Vec<u8>,
}

pub fn rasterize(payload: &str, opts: &QrOptions) -> Result<QrBitmap, Error> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), opts.ec_level)
        .map_err(|e| Error::render(format!("QR encoding failed: {e}")))?;
    let modules = code.width();
    let colors = code.to_colors();

    let quiet = 1usize;
    let grid = modules + 2 * quiet;
    let scale = ((opts.pixels as usize) / grid).max(1);
    let size = grid * scale;

    let mut pixels = vec![0xFFu8; size * size];
    for row in 0..modules {
        for col in 0..modules {
            if colors[row * modules + col] != Color::Dark {
                continue;
            }
            let px = (col + quiet) * scale;
            let py = (row + quiet) * scale;
            for dy in 0..scale {
                let base = (py + dy) * size + px;
                for dx in 0..scale {
                    pixels[base + dx] = 0x00;
                }
            }
        }
    }

    Ok(QrBitmap {
        size: size as u32,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_recovers_order_number_and_total() {
        let payload = QrPayload {
            order_number: "ORD-1001".to_string(),
            total: 100.0,
        };
        let decoded = QrPayload::decode(&payload.encode()).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn round_trip_keeps_fractional_totals_exact() {
        let payload = QrPayload {
            order_number: "ORD-7".to_string(),
            total: 1249.75,
        };
        let decoded = QrPayload::decode(&payload.encode()).unwrap();
        assert_eq!(decoded.total, 1249.75);
    }

    #[test]
    fn dashes_in_order_numbers_stay_unambiguous() {
        let payload = QrPayload {
            order_number: "ORD-2026-03-0042".to_string(),
            total: 99.5,
        };
        let decoded = QrPayload::decode(&payload.encode()).unwrap();
        assert_eq!(decoded.order_number, "ORD-2026-03-0042");
    }

    #[test]
    fn rejects_foreign_payloads() {
        assert!(QrPayload::decode("USMAN-HARDWARE-ORD-1-100-VERIFIED").is_err());
        assert!(QrPayload::decode("SHOPDESK|ORD-1|abc|VERIFIED").is_err());
        assert!(QrPayload::decode("SHOPDESK|ORD-1|100|FORGED").is_err());
    }

    #[test]
    fn bitmap_is_square_with_quiet_zone() {
        let bmp = rasterize("SHOPDESK|ORD-1|100|VERIFIED", &QrOptions::default()).unwrap();
        assert_eq!(bmp.pixels.len(), (bmp.size * bmp.size) as usize);
        assert!(bmp.size <= 240);
        // quiet zone: first row is all background
        assert!(bmp.pixels[..bmp.size as usize].iter().all(|&p| p == 0xFF));
        // some dark modules exist
        assert!(bmp.pixels.iter().any(|&p| p == 0x00));
    }

    #[test]
    fn bitmap_respects_target_pixel_budget() {
        let opts = QrOptions {
            pixels: 100,
            ec_level: EcLevel::M,
        };
        let bmp = rasterize("SHOPDESK|ORD-1|100|VERIFIED", &opts).unwrap();
        assert!(bmp.size <= 100);
    }
}
