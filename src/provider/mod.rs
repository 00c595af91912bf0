pub mod gemini;
pub mod image;
pub mod openai;
pub mod response;

pub use gemini::GeminiProvider;
pub use image::ImageDataUrl;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ProviderConfig;
use crate::error::ExtractionError;

/// 小票图片 -> 未校验的 JSON
///
/// 返回值不保证符合任何结构，必须先经过 `validate_receipt`。
#[async_trait]
pub trait ReceiptProvider: Send + Sync {
    /// 配置中使用的名字，如 `openai`
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    async fn extract(&self, image: &ImageDataUrl) -> Result<Value, ExtractionError>;
}

/// 按名字注册的模型实现，启动时选定一个
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn ReceiptProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册内置的 OpenAI / Gemini 实现，共用一个 HTTP 客户端
    pub fn from_config(config: &ProviderConfig) -> Self {
        let client = Client::new();
        let mut registry = Self::new();
        registry.register(Arc::new(OpenAiProvider::new(client.clone(), &config.openai)));
        registry.register(Arc::new(GeminiProvider::new(client, &config.gemini)));
        registry
    }

    /// 同名覆盖
    pub fn register(&mut self, provider: Arc<dyn ReceiptProvider>) {
        self.providers.insert(provider.name().to_lowercase(), provider);
    }

    pub fn select(&self, name: &str) -> Result<Arc<dyn ReceiptProvider>, ExtractionError> {
        let key = name.trim().to_lowercase();
        self.providers
            .get(&key)
            .cloned()
            .ok_or_else(|| ExtractionError::UnsupportedProvider(key.clone()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
