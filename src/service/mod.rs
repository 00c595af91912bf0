pub mod allocator;
pub mod checker;
pub mod normalizer;
pub mod receipt;
pub mod reconcile;
pub mod schema;

pub use allocator::{allocate_totals, Adjustment};
pub use checker::check_consistency;
pub use normalizer::normalize_item;
pub use receipt::ReceiptService;
pub use reconcile::normalize_receipt;
pub use schema::validate_receipt;
