use crate::export::{receipt_to_csv, receipt_to_xlsx, ExportFormat};
use crate::models::ReceiptParse;
use crate::provider::image::DEFAULT_MIME_TYPE;
use crate::provider::ImageDataUrl;
use crate::service::{validate_receipt, ReceiptService};
use axum::{
    extract::{Json, Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 共享状态
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReceiptService>,
    pub max_upload_bytes: usize,
}

/// 解析接口查询参数: `?format=json|csv|xlsx`
#[derive(Debug, Deserialize)]
pub struct ParseQuery {
    pub format: Option<String>,
}

/// 导出请求体
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub receipt: serde_json::Value,
}

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let response = ErrorResponse {
        error: message.into(),
    };
    (status, Json(response)).into_response()
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 按格式输出小票
fn render(receipt: &ReceiptParse, format: ExportFormat) -> Response {
    let body = match format {
        ExportFormat::Json => return (StatusCode::OK, Json(receipt)).into_response(),
        ExportFormat::Csv => receipt_to_csv(receipt).map(String::into_bytes),
        ExportFormat::Xlsx => receipt_to_xlsx(receipt),
    };

    match body {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, format.content_type().to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", format.file_name()),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Export failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// 上传的图片
struct Upload {
    mime_type: String,
    bytes: Vec<u8>,
}

/// 取表单中名为 `file` 的字段
async fn read_upload(multipart: &mut Multipart) -> Result<Option<Upload>, String> {
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        if field.name() != Some("file") {
            continue;
        }
        let mime_type = field
            .content_type()
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        let bytes = field.bytes().await.map_err(|e| e.to_string())?;
        return Ok(Some(Upload {
            mime_type,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

/// 上传小票图片并解析
pub async fn parse_receipt(
    State(state): State<AppState>,
    Query(query): Query<ParseQuery>,
    mut multipart: Multipart,
) -> Response {
    tracing::info!("starting parse request");

    let upload = match read_upload(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return error_response(StatusCode::BAD_REQUEST, "Missing file upload."),
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    if upload.bytes.len() > state.max_upload_bytes {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!(
                "File too large (max {}MB).",
                state.max_upload_bytes / (1024 * 1024)
            ),
        );
    }

    let image = ImageDataUrl::from_bytes(&upload.mime_type, &upload.bytes);
    match state.service.parse_image(&image).await {
        Ok(receipt) => {
            let format =
                ExportFormat::from_param(query.format.as_deref()).unwrap_or(ExportFormat::Json);
            tracing::info!("finished parse request, format {:?}", format);
            render(&receipt, format)
        }
        Err(e) => {
            tracing::error!("Parse request failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// 导出已有的小票 (只做结构校验，不重新归一化)
pub async fn export_receipt(Json(req): Json<ExportRequest>) -> Response {
    let receipt = match validate_receipt(&req.receipt) {
        Ok(receipt) => receipt,
        Err(e) => {
            tracing::warn!("Export request rejected: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let format = match ExportFormat::from_param(req.format.as_deref()) {
        Some(ExportFormat::Xlsx) => ExportFormat::Xlsx,
        _ => ExportFormat::Csv,
    };
    render(&receipt, format)
}
