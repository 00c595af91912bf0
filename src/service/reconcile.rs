use crate::models::ReceiptParse;
use crate::service::allocator::allocate_totals;
use crate::service::checker::check_consistency;
use crate::service::normalizer::normalize_item;

/// 逐行归一化 -> 整单分摊 -> 总额核对，返回新的小票，不修改输入
pub fn normalize_receipt(receipt: &ReceiptParse) -> ReceiptParse {
    let normalized: Vec<_> = receipt.items.iter().map(normalize_item).collect();
    let items = allocate_totals(&normalized, receipt.totals.as_ref());
    let warnings = check_consistency(&items, receipt.totals.as_ref(), &receipt.warnings);

    ReceiptParse {
        merchant: receipt.merchant.clone(),
        location: receipt.location.clone(),
        currency: receipt.currency.clone(),
        items,
        totals: receipt.totals.clone(),
        warnings,
        model: receipt.model.clone(),
    }
}
