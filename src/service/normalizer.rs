use bigdecimal::{BigDecimal, One, Zero};

use crate::models::{round2, ReceiptItem};

/// 重算单行明细
///
/// - 数量为 0 时按 1 计
/// - 小计 > 0 视为权威值，否则取 单价 × 数量
/// - 行合计非 0 视为权威值，否则取 小计 - 折扣 + 押金 + 税
/// - 所有金额保留两位小数
///
/// 幂等：第二次归一化时小计和行合计都已非 0，会原样保留。
pub fn normalize_item(item: &ReceiptItem) -> ReceiptItem {
    let quantity = if item.quantity.is_zero() {
        BigDecimal::one()
    } else {
        item.quantity.clone()
    };

    let line_subtotal = if item.line_subtotal > BigDecimal::zero() {
        item.line_subtotal.clone()
    } else {
        &item.unit_price * &quantity
    };

    let mut next = ReceiptItem {
        quantity,
        line_subtotal,
        ..item.clone()
    };

    if next.final_total.is_zero() {
        next.final_total = next.derived_final_total();
    }

    round_money(next)
}

/// 金额字段统一保留两位小数 (数量不参与)
pub(crate) fn round_money(item: ReceiptItem) -> ReceiptItem {
    ReceiptItem {
        unit_price: round2(&item.unit_price),
        line_subtotal: round2(&item.line_subtotal),
        discount: round2(&item.discount),
        deposit: round2(&item.deposit),
        tax: round2(&item.tax),
        final_total: round2(&item.final_total),
        ..item
    }
}
