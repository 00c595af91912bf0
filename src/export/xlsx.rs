use bigdecimal::{BigDecimal, ToPrimitive};
use rust_xlsxwriter::Workbook;

use super::{COLUMNS, SHEET_NAME};
use crate::error::ExportError;
use crate::models::{round2, ReceiptParse};

fn money_cell(value: &BigDecimal) -> f64 {
    round2(value).to_f64().unwrap_or_default()
}

/// 导出明细为 XLSX，单个 `Items` 工作表，返回文件字节
pub fn receipt_to_xlsx(receipt: &ReceiptParse) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet().set_name(SHEET_NAME)?;

    for (col, title) in COLUMNS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *title)?;
    }

    for (idx, item) in receipt.items.iter().enumerate() {
        // rust_xlsxwriter 行列均从 0 开始，第 0 行为表头
        let row = idx as u32 + 1;
        worksheet.write_string(row, 0, item.description.as_str())?;
        worksheet.write_string(row, 1, item.sku.as_deref().unwrap_or(""))?;
        worksheet.write_number(row, 2, item.quantity.to_f64().unwrap_or_default())?;
        worksheet.write_number(row, 3, money_cell(&item.unit_price))?;
        worksheet.write_number(row, 4, money_cell(&item.line_subtotal))?;
        worksheet.write_number(row, 5, money_cell(&item.discount))?;
        worksheet.write_number(row, 6, money_cell(&item.deposit))?;
        worksheet.write_number(row, 7, money_cell(&item.tax))?;
        worksheet.write_number(row, 8, money_cell(&item.final_total))?;
        worksheet.write_string(row, 9, item.notes.as_deref().unwrap_or(""))?;
    }

    Ok(workbook.save_to_buffer()?)
}
