pub mod money;
pub mod receipt;

pub use money::{format_money, format_quantity, round2};
pub use receipt::{ReceiptItem, ReceiptParse, ReceiptTotals};
