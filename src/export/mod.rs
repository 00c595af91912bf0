pub mod csv;
pub mod xlsx;

pub use self::csv::receipt_to_csv;
pub use self::xlsx::receipt_to_xlsx;

/// 导出列顺序 (CSV 表头与 XLSX 首行一致)
pub const COLUMNS: [&str; 10] = [
    "description",
    "sku",
    "quantity",
    "unit_price",
    "line_subtotal",
    "discount",
    "deposit",
    "tax",
    "final_total",
    "notes",
];

pub const SHEET_NAME: &str = "Items";

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// 查询参数解析，大小写不敏感；无法识别时返回 `None` 由调用方决定默认值
    pub fn from_param(value: Option<&str>) -> Option<Self> {
        match value?.trim().to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            "xlsx" => Some(ExportFormat::Xlsx),
            _ => None,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Json => "receipt.json",
            ExportFormat::Csv => "receipt.csv",
            ExportFormat::Xlsx => "receipt.xlsx",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_format_param() {
        assert_eq!(ExportFormat::from_param(Some("CSV")), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_param(Some(" xlsx ")), Some(ExportFormat::Xlsx));
        assert_eq!(ExportFormat::from_param(Some("json")), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::from_param(Some("pdf")), None);
        assert_eq!(ExportFormat::from_param(None), None);
    }
}
