use std::sync::Arc;
use tracing::info;

use crate::error::ReceiptError;
use crate::models::ReceiptParse;
use crate::provider::{ImageDataUrl, ReceiptProvider};
use crate::service::reconcile::normalize_receipt;
use crate::service::schema::validate_receipt;

/// 小票解析服务：模型提取 -> 结构校验 -> 归一化
///
/// 不持有可变状态，多个请求可并发调用同一实例。
pub struct ReceiptService {
    provider: Arc<dyn ReceiptProvider>,
}

impl ReceiptService {
    pub fn new(provider: Arc<dyn ReceiptProvider>) -> Self {
        Self { provider }
    }

    /// 提取或校验失败直接返回错误，不产出部分结果
    pub async fn parse_image(&self, image: &ImageDataUrl) -> Result<ReceiptParse, ReceiptError> {
        info!(
            "开始解析小票: provider={}, model={}, mime={}",
            self.provider.name(),
            self.provider.model(),
            image.mime_type()
        );

        let raw = self.provider.extract(image).await?;
        let candidate = validate_receipt(&raw)?;
        let receipt = normalize_receipt(&candidate);

        info!(
            "小票解析完成: {} 行明细, {} 条告警",
            receipt.items.len(),
            receipt.warnings.len()
        );
        Ok(receipt)
    }
}
