use bigdecimal::{BigDecimal, One, Zero};
use serde::Serialize;

use super::money;

/// 小票明细行
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(serialize_with = "money::serialize")]
    pub quantity: BigDecimal,
    #[serde(serialize_with = "money::serialize")]
    pub unit_price: BigDecimal,
    #[serde(serialize_with = "money::serialize")]
    pub line_subtotal: BigDecimal,
    #[serde(serialize_with = "money::serialize")]
    pub discount: BigDecimal,
    #[serde(serialize_with = "money::serialize")]
    pub deposit: BigDecimal,
    #[serde(serialize_with = "money::serialize")]
    pub tax: BigDecimal,
    #[serde(serialize_with = "money::serialize")]
    pub final_total: BigDecimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ReceiptItem {
    /// 全默认值的明细行 (数量 1，其余金额 0)
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            sku: None,
            quantity: BigDecimal::one(),
            unit_price: BigDecimal::zero(),
            line_subtotal: BigDecimal::zero(),
            discount: BigDecimal::zero(),
            deposit: BigDecimal::zero(),
            tax: BigDecimal::zero(),
            final_total: BigDecimal::zero(),
            notes: None,
        }
    }

    /// 小计 - 折扣 + 押金 + 税
    pub fn derived_final_total(&self) -> BigDecimal {
        &self.line_subtotal - &self.discount + &self.deposit + &self.tax
    }
}

/// 小票整体声明的合计值
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReceiptTotals {
    #[serde(
        serialize_with = "money::option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub subtotal: Option<BigDecimal>,
    #[serde(
        serialize_with = "money::option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub tax: Option<BigDecimal>,
    #[serde(
        serialize_with = "money::option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub discounts: Option<BigDecimal>,
    #[serde(
        serialize_with = "money::option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub deposits: Option<BigDecimal>,
    #[serde(
        serialize_with = "money::option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub total: Option<BigDecimal>,
}

/// 一张小票的完整解析结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReceiptParse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub items: Vec<ReceiptItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<ReceiptTotals>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_camel_case_numbers() {
        let mut item = ReceiptItem::new("Milk");
        item.unit_price = BigDecimal::from(4);
        item.line_subtotal = BigDecimal::from(8);
        item.final_total = BigDecimal::from(8);

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["description"], json!("Milk"));
        assert_eq!(value["unitPrice"], json!(4.0));
        assert_eq!(value["lineSubtotal"], json!(8.0));
        assert_eq!(value["finalTotal"], json!(8.0));
        assert!(value.get("sku").is_none());
    }

    #[test]
    fn derived_final_total_applies_adjustments() {
        let mut item = ReceiptItem::new("Water");
        item.line_subtotal = BigDecimal::from(10);
        item.discount = BigDecimal::from(2);
        item.deposit = BigDecimal::from(1);
        item.tax = BigDecimal::from(3);
        assert_eq!(item.derived_final_total(), BigDecimal::from(12));
    }
}
