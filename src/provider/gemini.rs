use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::response::{parse_model_json, RECEIPT_PROMPT, TEMPERATURE};
use super::{ImageDataUrl, ReceiptProvider};
use crate::config::{ApiKey, EndpointConfig};
use crate::error::ExtractionError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

/// 回复文本：优先顶层 `text`，否则拼接第一个候选的所有 part
fn response_text(body: &Value) -> String {
    if let Some(text) = body.get("text").and_then(Value::as_str).filter(|t| !t.is_empty()) {
        return text.to_string();
    }

    body.get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.pointer("/content/parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

/// 无文本时用于日志的回复概况
fn summarize_response(body: &Value) -> String {
    let Some(obj) = body.as_object() else {
        return format!("non-object response: {}", body);
    };
    let candidate_count = obj
        .get("candidates")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    format!(
        "has_text={}, candidate_count={}, keys={:?}",
        obj.contains_key("text"),
        candidate_count,
        keys
    )
}

/// Google Gemini generateContent API
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<ApiKey>,
}

impl GeminiProvider {
    pub const NAME: &'static str = "gemini";

    pub fn new(client: Client, config: &EndpointConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl ReceiptProvider for GeminiProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn extract(&self, image: &ImageDataUrl) -> Result<Value, ExtractionError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(ExtractionError::MissingApiKey("GEMINI_API_KEY (or GOOGLE_API_KEY)"))?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: RECEIPT_PROMPT,
                    },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: image.mime_type(),
                            data: image.data(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        info!(model = %self.model, mime = %image.mime_type(), "Calling Gemini generateContent");
        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, self.model))
            .header("x-goog-api-key", api_key.expose())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        let text = response_text(&body);
        if text.trim().is_empty() {
            warn!("Gemini response had no text content: {}", summarize_response(&body));
            return Err(ExtractionError::EmptyResponse("Gemini".to_string()));
        }

        parse_model_json(&text, &self.model)
    }
}
