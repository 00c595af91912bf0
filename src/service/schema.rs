use bigdecimal::{BigDecimal, One, Zero};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::models::{ReceiptItem, ReceiptParse, ReceiptTotals};

/// 校验并补全一个来源不可信的小票对象
///
/// 输入可以是视觉模型的原始输出，也可以是之前已经归一化过的 `ReceiptParse` JSON
/// (导出接口直接提交)。金额字段接受数字或带 `$`/`,` 的字符串；未知字段忽略。
pub fn validate_receipt(value: &Value) -> Result<ReceiptParse, ValidationError> {
    let obj = expect_object(value, "(root)")?;

    let items = match obj.get("items") {
        Some(Value::Array(raw_items)) => raw_items
            .iter()
            .enumerate()
            .map(|(idx, raw)| validate_item(raw, &format!("items[{}]", idx)))
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(ValidationError::new(
                "items",
                format!("expected array, received {}", type_name(other)),
            ))
        }
        None => return Err(ValidationError::new("items", "required")),
    };

    let totals = match obj.get("totals") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(validate_totals(raw)?),
    };

    let warnings = match obj.get("warnings") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(raw)) => raw
            .iter()
            .enumerate()
            .map(|(idx, w)| match w {
                Value::String(s) => Ok(s.clone()),
                other => Err(ValidationError::new(
                    format!("warnings[{}]", idx),
                    format!("expected string, received {}", type_name(other)),
                )),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(ValidationError::new(
                "warnings",
                format!("expected array, received {}", type_name(other)),
            ))
        }
    };

    Ok(ReceiptParse {
        merchant: optional_string(obj, "merchant", "merchant")?,
        location: optional_string(obj, "location", "location")?,
        currency: optional_string(obj, "currency", "currency")?,
        items,
        totals,
        warnings,
        model: optional_string(obj, "model", "model")?,
    })
}

fn validate_item(value: &Value, path: &str) -> Result<ReceiptItem, ValidationError> {
    let obj = expect_object(value, path)?;

    let description = match obj.get("description") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::String(_)) => {
            return Err(ValidationError::new(
                format!("{}.description", path),
                "must not be empty",
            ))
        }
        None | Some(Value::Null) => {
            return Err(ValidationError::new(format!("{}.description", path), "required"))
        }
        Some(other) => {
            return Err(ValidationError::new(
                format!("{}.description", path),
                format!("expected string, received {}", type_name(other)),
            ))
        }
    };

    let number = |key: &str| -> Result<BigDecimal, ValidationError> {
        Ok(number_like(obj.get(key), &format!("{}.{}", path, key))?.unwrap_or_else(BigDecimal::zero))
    };

    Ok(ReceiptItem {
        description,
        sku: optional_string(obj, "sku", &format!("{}.sku", path))?,
        quantity: number_like(obj.get("quantity"), &format!("{}.quantity", path))?
            .unwrap_or_else(BigDecimal::one),
        unit_price: number("unitPrice")?,
        line_subtotal: number("lineSubtotal")?,
        discount: number("discount")?,
        deposit: number("deposit")?,
        tax: number("tax")?,
        final_total: number("finalTotal")?,
        notes: optional_string(obj, "notes", &format!("{}.notes", path))?,
    })
}

fn validate_totals(value: &Value) -> Result<ReceiptTotals, ValidationError> {
    let obj = expect_object(value, "totals")?;
    let field = |key: &str| number_like(obj.get(key), &format!("totals.{}", key));

    Ok(ReceiptTotals {
        subtotal: field("subtotal")?,
        tax: field("tax")?,
        discounts: field("discounts")?,
        deposits: field("deposits")?,
        total: field("total")?,
    })
}

/// 整数部分超过该位数按非有限数拒绝 (舍入到分后仍需能转成有限的 f64 输出)
const MAX_INTEGER_DIGITS: i64 = 300;
/// 量级低于 1e-20 的值在两位精度下必然为 0
const MIN_MAGNITUDE: i64 = -20;

/// 数字或可转成数字的字符串；缺省/null 返回 `None` 由调用方补默认值
fn number_like(value: Option<&Value>, path: &str) -> Result<Option<BigDecimal>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => BigDecimal::from_str(&n.to_string())
            .ok()
            .and_then(finite)
            .map(Some)
            .ok_or_else(|| ValidationError::new(path, "expected number, received number")),
        Some(Value::String(s)) => parse_money_text(s).map(Some).ok_or_else(|| {
            ValidationError::new(path, format!("expected number, received string \"{}\"", s))
        }),
        Some(other) => Err(ValidationError::new(
            path,
            format!("expected number, received {}", type_name(other)),
        )),
    }
}

/// `"$1,234.50"` -> 1234.50；空串或无法解析时返回 `None`
fn parse_money_text(text: &str) -> Option<BigDecimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != '$' && *c != ',').collect();
    BigDecimal::from_str(cleaned.trim()).ok().and_then(finite)
}

/// 只按尾数位数和指数判断量级，不展开数值本身
///
/// `1e400000000` 之类的指数写法在后续舍入时会展开成上亿位整数，这里直接拒绝；
/// 极小值直接归 0。
fn finite(value: BigDecimal) -> Option<BigDecimal> {
    if value.is_zero() {
        return Some(BigDecimal::zero());
    }
    let (_, scale) = value.as_bigint_and_exponent();
    let magnitude = (value.digits() as i64).saturating_sub(scale);
    if magnitude > MAX_INTEGER_DIGITS {
        None
    } else if magnitude < MIN_MAGNITUDE {
        Some(BigDecimal::zero())
    } else {
        Some(value)
    }
}

fn optional_string(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<String>, ValidationError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ValidationError::new(
            path,
            format!("expected string, received {}", type_name(other)),
        )),
    }
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| {
        ValidationError::new(path, format!("expected object, received {}", type_name(value)))
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn coerces_currency_strings() {
        let receipt = validate_receipt(&json!({
            "items": [{ "description": "TV", "unitPrice": "$1,234.50", "tax": " 12.00 " }],
            "totals": { "total": "$1,246.50" }
        }))
        .unwrap();

        let item = &receipt.items[0];
        assert_eq!(item.unit_price, dec("1234.50"));
        assert_eq!(item.tax, dec("12"));
        assert_eq!(receipt.totals.unwrap().total, Some(dec("1246.50")));
    }

    #[test]
    fn fills_item_defaults() {
        let receipt = validate_receipt(&json!({ "items": [{ "description": "Milk" }] })).unwrap();
        let item = &receipt.items[0];

        assert_eq!(item.quantity, BigDecimal::one());
        assert!(item.unit_price.is_zero());
        assert!(item.line_subtotal.is_zero());
        assert!(item.final_total.is_zero());
        assert_eq!(item.sku, None);
        assert!(receipt.warnings.is_empty());
        assert!(receipt.totals.is_none());
    }

    #[test]
    fn null_sku_and_notes_become_absent() {
        let receipt = validate_receipt(&json!({
            "items": [{ "description": "Eggs", "sku": null, "notes": null }]
        }))
        .unwrap();
        assert_eq!(receipt.items[0].sku, None);
        assert_eq!(receipt.items[0].notes, None);
    }

    #[test]
    fn rejects_decorative_number_text() {
        let err = validate_receipt(&json!({
            "items": [
                { "description": "Bread" },
                { "description": "Cheese", "unitPrice": "see below" }
            ]
        }))
        .unwrap_err();

        assert_eq!(err.path, "items[1].unitPrice");
        assert!(err.reason.contains("expected number"));
    }

    #[test]
    fn rejects_non_finite_number_text() {
        for text in ["1e400000000", "-1e400", "1e301", "Infinity", "-Infinity", "NaN", "inf"] {
            let err = validate_receipt(&json!({
                "items": [{ "description": "x", "unitPrice": text }]
            }))
            .unwrap_err();
            assert_eq!(err.path, "items[0].unitPrice", "{}", text);
            assert!(err.reason.starts_with("expected number"), "{}", text);
        }

        let err = validate_receipt(&json!({
            "items": [],
            "totals": { "total": "9".repeat(400) }
        }))
        .unwrap_err();
        assert_eq!(err.path, "totals.total");
    }

    #[test]
    fn accepts_large_but_finite_and_tiny_numbers() {
        let receipt = validate_receipt(&json!({
            "items": [
                { "description": "Big", "unitPrice": "1e250", "lineSubtotal": 1e250 },
                { "description": "Dust", "unitPrice": "1e-400000000" },
                { "description": "Nothing", "unitPrice": "0e400000000" }
            ]
        }))
        .unwrap();

        assert_eq!(receipt.items[0].unit_price, dec("1e250"));
        assert!(receipt.items[1].unit_price.is_zero());
        assert!(receipt.items[2].unit_price.is_zero());
        // 舍入与导出不会卡住
        let out = crate::service::reconcile::normalize_receipt(&receipt);
        assert!(out.items[1].final_total.is_zero());
        assert!(crate::export::receipt_to_csv(&out).is_ok());
        let json = serde_json::to_value(&out).unwrap();
        assert!(json["items"][0]["finalTotal"].as_f64().unwrap().is_finite());
    }

    #[test]
    fn rejects_missing_or_invalid_items() {
        let err = validate_receipt(&json!({ "merchant": "Costco" })).unwrap_err();
        assert_eq!(err.path, "items");

        let err = validate_receipt(&json!({ "items": "none" })).unwrap_err();
        assert_eq!(err.path, "items");
        assert!(err.reason.contains("expected array"));

        let err = validate_receipt(&json!([])).unwrap_err();
        assert_eq!(err.path, "(root)");
    }

    #[test]
    fn rejects_empty_description() {
        let err = validate_receipt(&json!({ "items": [{ "description": "" }] })).unwrap_err();
        assert_eq!(err.path, "items[0].description");

        let err = validate_receipt(&json!({ "items": [{ "unitPrice": 3 }] })).unwrap_err();
        assert_eq!(err.to_string(), "items[0].description: required");
    }

    #[test]
    fn keeps_provider_warnings_and_model() {
        let receipt = validate_receipt(&json!({
            "items": [],
            "warnings": ["blurry photo"],
            "model": "gpt-4o-mini",
            "unexpected": true
        }))
        .unwrap();
        assert_eq!(receipt.warnings, vec!["blurry photo".to_string()]);
        assert_eq!(receipt.model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn rejects_non_string_warning() {
        let err = validate_receipt(&json!({ "items": [], "warnings": [1] })).unwrap_err();
        assert_eq!(err.path, "warnings[0]");
    }
}
