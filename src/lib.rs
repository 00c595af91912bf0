pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod provider;
pub mod service;

pub use config::AppConfig;
pub use error::{ExportError, ExtractionError, ReceiptError, ValidationError};
pub use models::{ReceiptItem, ReceiptParse, ReceiptTotals};
pub use provider::{ImageDataUrl, ProviderRegistry, ReceiptProvider};
pub use service::{normalize_receipt, validate_receipt, ReceiptService};
