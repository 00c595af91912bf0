use thiserror::Error;

/// 结构校验失败：`path` 指向出错字段，如 `items[2].unitPrice`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {reason}")]
pub struct ValidationError {
    pub path: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// 视觉模型调用失败
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported AI_PROVIDER \"{0}\".")]
    UnsupportedProvider(String),

    #[error("{0} is not set.")]
    MissingApiKey(&'static str),

    #[error("Invalid image data URL.")]
    InvalidImage,

    #[error("Provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("{0} response did not include any text content.")]
    EmptyResponse(String),

    #[error("Model response did not include JSON.")]
    NoJson,

    #[error("Model response was not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// 解析流水线错误 (提取或校验)，均为致命错误
#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Invalid receipt: {0}")]
    Validation(#[from] ValidationError),
}

/// 导出失败
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV export failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV export produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("XLSX export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
