use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::COLUMNS;
use crate::error::ExportError;
use crate::models::{format_money, format_quantity, ReceiptParse};

/// 导出明细为 CSV 文本
///
/// 含逗号、引号或换行的字段会加引号，内部引号双写；金额固定两位小数。
pub fn receipt_to_csv(receipt: &ReceiptParse) -> Result<String, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(COLUMNS)?;

    for item in &receipt.items {
        writer.write_record([
            item.description.as_str(),
            item.sku.as_deref().unwrap_or(""),
            format_quantity(&item.quantity).as_str(),
            format_money(&item.unit_price).as_str(),
            format_money(&item.line_subtotal).as_str(),
            format_money(&item.discount).as_str(),
            format_money(&item.deposit).as_str(),
            format_money(&item.tax).as_str(),
            format_money(&item.final_total).as_str(),
            item.notes.as_deref().unwrap_or(""),
        ])?;
    }

    writer.flush()?;
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
