//! ShopDesk document core.
//!
//! Client-side document generation for a hardware-store admin front end:
//! thermal and A4 sales receipts with an embedded verification QR, bulk
//! CSV/PDF exports of the order and product listings, and the aggregate
//! figures those documents print. Data comes from the IMS REST backend via
//! [`api::ApiClient`]; nothing is persisted locally.

pub mod api;
pub mod document;
pub mod error;
pub mod export;
pub mod layout;
pub mod models;
pub mod qr;
pub mod receipt;
pub mod summary;

pub use document::{Document, RenderContext};
pub use error::Error;
pub use receipt::StoreProfile;
