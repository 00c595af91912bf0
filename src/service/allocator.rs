use bigdecimal::{BigDecimal, Zero};

use crate::models::{ReceiptItem, ReceiptTotals};
use crate::service::normalizer::normalize_item;

/// 可从整单分摊到明细的调整项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Tax,
    Discount,
    Deposit,
}

impl Adjustment {
    pub const ALL: [Adjustment; 3] = [Adjustment::Tax, Adjustment::Discount, Adjustment::Deposit];

    fn on_item(self, item: &ReceiptItem) -> &BigDecimal {
        match self {
            Adjustment::Tax => &item.tax,
            Adjustment::Discount => &item.discount,
            Adjustment::Deposit => &item.deposit,
        }
    }

    fn on_item_mut(self, item: &mut ReceiptItem) -> &mut BigDecimal {
        match self {
            Adjustment::Tax => &mut item.tax,
            Adjustment::Discount => &mut item.discount,
            Adjustment::Deposit => &mut item.deposit,
        }
    }

    fn aggregate(self, totals: &ReceiptTotals) -> Option<&BigDecimal> {
        match self {
            Adjustment::Tax => totals.tax.as_ref(),
            Adjustment::Discount => totals.discounts.as_ref(),
            Adjustment::Deposit => totals.deposits.as_ref(),
        }
    }

    /// 任一明细已有非 0 值即视为模型已逐行给出
    pub fn is_itemized(self, items: &[ReceiptItem]) -> bool {
        items.iter().any(|item| !self.on_item(item).is_zero())
    }
}

/// 按小计占比把整单的税/折扣/押金分摊到各行
///
/// 每种调整项独立判断：只要有一行带了该项，整项都不分摊 (全有或全无)。
/// 部分行有、部分行没有的情况不做补齐，没有的行保持 0。
///
/// 分摊后按单行规则再归一化一次：行合计已非 0 的保留原值，分摊额不会计入。
///
/// 输入应为已归一化的明细，输出同样满足两位小数约束。
pub fn allocate_totals(items: &[ReceiptItem], totals: Option<&ReceiptTotals>) -> Vec<ReceiptItem> {
    let Some(totals) = totals else {
        return items.to_vec();
    };

    let base_total = items
        .iter()
        .fold(BigDecimal::zero(), |acc, item| acc + &item.line_subtotal);
    if base_total <= BigDecimal::zero() {
        return items.to_vec();
    }

    let pending: Vec<Adjustment> = Adjustment::ALL
        .into_iter()
        .filter(|adj| !adj.is_itemized(items))
        .collect();

    tracing::debug!(
        "分摊整单调整项: {:?}, 明细 {} 行, 小计合计 {}",
        pending,
        items.len(),
        base_total
    );

    items
        .iter()
        .map(|item| {
            let share = &item.line_subtotal / &base_total;
            let mut next = item.clone();

            for adj in &pending {
                let allocated = adj
                    .aggregate(totals)
                    .map(|aggregate| aggregate * &share)
                    .unwrap_or_else(BigDecimal::zero);
                *adj.on_item_mut(&mut next) = allocated;
            }

            normalize_item(&next)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::round2;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn line(description: &str, subtotal: &str) -> ReceiptItem {
        let mut item = ReceiptItem::new(description);
        item.line_subtotal = dec(subtotal);
        normalize_item(&item)
    }

    fn totals_with_tax(tax: &str) -> ReceiptTotals {
        ReceiptTotals {
            tax: Some(dec(tax)),
            ..ReceiptTotals::default()
        }
    }

    #[test]
    fn allocates_tax_by_subtotal_share() {
        let items = vec![line("A", "10"), line("B", "30")];
        let out = allocate_totals(&items, Some(&totals_with_tax("4.00")));

        assert_eq!(out[0].tax, dec("1.00"));
        assert_eq!(out[1].tax, dec("3.00"));
        // 首轮归一化已推导出行合计，保持不变
        assert_eq!(out[0].final_total, dec("10.00"));
        assert_eq!(out[1].final_total, dec("30.00"));
    }

    #[test]
    fn zero_final_total_absorbs_allocation() {
        let mut item = ReceiptItem::new("Unnormalized");
        item.line_subtotal = dec("20.00");
        let out = allocate_totals(&[item], Some(&totals_with_tax("1.60")));

        assert_eq!(out[0].tax, dec("1.60"));
        assert_eq!(out[0].final_total, dec("21.60"));
    }

    #[test]
    fn allocation_conserves_aggregate_within_rounding() {
        let items = vec![line("A", "10"), line("B", "10"), line("C", "10")];
        let out = allocate_totals(&items, Some(&totals_with_tax("1.00")));

        let allocated = out.iter().fold(BigDecimal::zero(), |acc, i| acc + &i.tax);
        let slack = BigDecimal::new(1.into(), 2) * BigDecimal::from(out.len() as i64);
        assert!((allocated - dec("1.00")).abs() <= slack);
        for item in &out {
            assert_eq!(item.tax, dec("0.33"));
            assert_eq!(round2(&item.tax), item.tax);
        }
    }

    #[test]
    fn itemized_field_is_left_untouched() {
        let mut first = ReceiptItem::new("A");
        first.line_subtotal = dec("10");
        first.discount = dec("2");
        let items = vec![normalize_item(&first), line("B", "30")];

        let totals = ReceiptTotals {
            discounts: Some(dec("8")),
            tax: Some(dec("4")),
            ..ReceiptTotals::default()
        };
        let out = allocate_totals(&items, Some(&totals));

        assert_eq!(out[0].discount, dec("2.00"));
        assert_eq!(out[1].discount, dec("0.00"));
        // tax 仍然独立分摊
        assert_eq!(out[0].tax, dec("1.00"));
        assert_eq!(out[1].tax, dec("3.00"));
    }

    #[test]
    fn negative_itemized_value_counts_as_itemized() {
        let mut first = ReceiptItem::new("Coupon line");
        first.line_subtotal = dec("20");
        first.discount = dec("-1.50");
        let items = vec![normalize_item(&first), line("B", "20")];

        let totals = ReceiptTotals {
            discounts: Some(dec("5")),
            ..ReceiptTotals::default()
        };
        let out = allocate_totals(&items, Some(&totals));
        assert_eq!(out[0].discount, dec("-1.50"));
        assert_eq!(out[1].discount, dec("0"));
    }

    #[test]
    fn no_totals_or_zero_base_returns_items_unchanged() {
        let items = vec![line("A", "10")];
        assert_eq!(allocate_totals(&items, None), items);

        let empty = vec![ReceiptItem::new("Free sample")];
        let out = allocate_totals(&empty, Some(&totals_with_tax("3")));
        assert_eq!(out, empty);
    }

    #[test]
    fn zero_subtotal_line_gets_no_share() {
        let items = vec![line("Bag", "0"), line("Milk", "8")];
        let out = allocate_totals(&items, Some(&totals_with_tax("0.80")));

        assert_eq!(out[0].tax, dec("0.00"));
        assert_eq!(out[1].tax, dec("0.80"));
    }

    #[test]
    fn model_supplied_final_total_is_kept() {
        let mut item = ReceiptItem::new("Rotisserie chicken");
        item.line_subtotal = dec("4.99");
        item.final_total = dec("5.40");
        let items = vec![normalize_item(&item)];

        let out = allocate_totals(&items, Some(&totals_with_tax("0.41")));
        assert_eq!(out[0].tax, dec("0.41"));
        assert_eq!(out[0].final_total, dec("5.40"));
    }

    #[test]
    fn allocates_deposit_and_discount_together() {
        let items = vec![line("Water", "6"), line("Juice", "14")];
        let totals = ReceiptTotals {
            deposits: Some(dec("1.00")),
            discounts: Some(dec("2.00")),
            ..ReceiptTotals::default()
        };
        let out = allocate_totals(&items, Some(&totals));

        assert_eq!(out[0].deposit, dec("0.30"));
        assert_eq!(out[0].discount, dec("0.60"));
        assert_eq!(out[0].final_total, dec("6.00"));
        assert_eq!(out[1].deposit, dec("0.70"));
        assert_eq!(out[1].discount, dec("1.40"));
        assert_eq!(out[1].final_total, dec("14.00"));
    }
}
