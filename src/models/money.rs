use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use serde::Serializer;

/// 金额精度 (分)
pub const MONEY_SCALE: i64 = 2;

/// 保留两位小数，半数远离零进位 (0.005 -> 0.01, -0.005 -> -0.01)
pub fn round2(value: &BigDecimal) -> BigDecimal {
    let truncated = value.with_scale(MONEY_SCALE);
    let remainder = value - &truncated;
    let half_cent = BigDecimal::new(5.into(), MONEY_SCALE + 1);

    if remainder.abs() < half_cent {
        return truncated;
    }

    let cent = BigDecimal::new(1.into(), MONEY_SCALE);
    if *value < BigDecimal::zero() {
        truncated - cent
    } else {
        truncated + cent
    }
}

/// 两位小数展示，如 `9.00`
pub fn format_money(value: &BigDecimal) -> String {
    round2(value).to_string()
}

/// 数量展示：去掉末尾多余的 0，`2.50` -> `2.5`, `3.0` -> `3`
pub fn format_quantity(value: &BigDecimal) -> String {
    let text = value.to_string();
    if !text.contains('.') {
        return text;
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// JSON 输出为数字而非字符串
///
/// 金额在校验阶段已限制量级 (见 `validate_receipt`)，转换结果总是有限值。
pub fn serialize<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value.to_f64() {
        Some(n) => {
            debug_assert!(n.is_finite(), "amount out of f64 range: {}", value);
            serializer.serialize_f64(n)
        }
        None => serializer.collect_str(value),
    }
}

pub mod option {
    use bigdecimal::BigDecimal;
    use serde::Serializer;

    pub fn serialize<S>(value: &Option<BigDecimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => super::serialize(v, serializer),
            None => serializer.serialize_none(),
        }
    }
}
