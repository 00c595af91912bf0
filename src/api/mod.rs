pub mod handlers;

pub use handlers::{export_receipt, health_check, parse_receipt, AppState};
