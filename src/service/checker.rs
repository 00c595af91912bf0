use bigdecimal::{BigDecimal, One, Zero};

use crate::models::{format_money, ReceiptItem, ReceiptTotals};

/// 明细合计与小票总额的容差 (1 个货币单位)
fn tolerance() -> BigDecimal {
    BigDecimal::one()
}

/// 核对明细行合计与小票声明的总额
///
/// 只追加告警，不会失败；已有告警按原顺序保留。
pub fn check_consistency(
    items: &[ReceiptItem],
    totals: Option<&ReceiptTotals>,
    warnings: &[String],
) -> Vec<String> {
    let mut next = warnings.to_vec();

    let Some(declared) = totals.and_then(|t| t.total.as_ref()) else {
        return next;
    };

    let items_total = items
        .iter()
        .fold(BigDecimal::zero(), |acc, item| acc + &item.final_total);

    if (declared - &items_total).abs() > tolerance() {
        let message = format!(
            "Item totals ({}) differ from receipt total ({}).",
            format_money(&items_total),
            format_money(declared)
        );
        tracing::warn!("{}", message);
        next.push(message);
    }

    next
}
