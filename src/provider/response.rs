use serde_json::Value;

use crate::error::ExtractionError;

/// 发给视觉模型的提取指令，所有实现共用
pub const RECEIPT_PROMPT: &str = r#"You are reading a photographed retail receipt and turning it into structured JSON.
Respond with the JSON object only. Do not wrap it in markdown.

Rules:
- Output one entry in "items" for every purchased line on the receipt, in receipt order.
- Write every monetary value as a plain number (no currency symbols, no thousands separators).
- When a discount, deposit or tax clearly belongs to one line, put it on that line.
- When the receipt only shows an adjustment as a total, leave it off the lines and report it in "totals".
- Use "warnings" for anything you could not read with confidence.

Schema:
{
  "merchant": "Store name",
  "location": "City, State",
  "currency": "USD",
  "items": [
    {
      "description": "Item name",
      "sku": "Item number if printed",
      "quantity": 1,
      "unitPrice": 0,
      "lineSubtotal": 0,
      "discount": 0,
      "deposit": 0,
      "tax": 0,
      "finalTotal": 0,
      "notes": "Optional notes"
    }
  ],
  "totals": {
    "subtotal": 0,
    "tax": 0,
    "discounts": 0,
    "deposits": 0,
    "total": 0
  },
  "warnings": []
}"#;

/// 采样温度，偏低以保证输出稳定
pub const TEMPERATURE: f64 = 0.2;

/// 截取模型回复中最外层的 `{ ... }`，容忍前后的 markdown 围栏或说明文字
pub fn extract_json_object(text: &str) -> Result<&str, ExtractionError> {
    let start = text.find('{').ok_or(ExtractionError::NoJson)?;
    let end = text.rfind('}').ok_or(ExtractionError::NoJson)?;
    if end <= start {
        return Err(ExtractionError::NoJson);
    }
    Ok(&text[start..=end])
}

/// 解析模型文本为 JSON，并写入实际使用的模型名 (覆盖模型自己填的值)
pub fn parse_model_json(text: &str, model: &str) -> Result<Value, ExtractionError> {
    let json_text = extract_json_object(text)?;
    let mut value: Value = serde_json::from_str(json_text)?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("model".to_string(), Value::String(model.to_string()));
    }
    Ok(value)
}
