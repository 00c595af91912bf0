use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::response::{parse_model_json, RECEIPT_PROMPT, TEMPERATURE};
use super::{ImageDataUrl, ReceiptProvider};
use crate::config::{ApiKey, EndpointConfig};
use crate::error::ExtractionError;

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InputMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct InputMessage<'a> {
    role: &'a str,
    content: Vec<InputContent<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InputContent<'a> {
    InputText { text: &'a str },
    InputImage { image_url: &'a str, detail: &'a str },
}

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Debug, Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesResponse {
    /// 优先取 `output_text`，否则拼接所有 `output_text` 类型的内容块
    fn text(&self) -> String {
        if let Some(text) = self.output_text.as_deref().filter(|t| !t.is_empty()) {
            return text.to_string();
        }
        self.output
            .iter()
            .flat_map(|item| item.content.iter())
            .filter(|content| content.kind == "output_text")
            .filter_map(|content| content.text.as_deref())
            .collect()
    }
}

/// OpenAI Responses API
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<ApiKey>,
}

impl OpenAiProvider {
    pub const NAME: &'static str = "openai";

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
impl ReceiptProvider for OpenAiProvider {
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
            .ok_or(ExtractionError::MissingApiKey("OPENAI_API_KEY"))?;

        let request = ResponsesRequest {
            model: &self.model,
            input: vec![InputMessage {
                role: "user",
                content: vec![
                    InputContent::InputText {
                        text: RECEIPT_PROMPT,
                    },
                    InputContent::InputImage {
                        image_url: image.as_str(),
                        detail: "auto",
                    },
                ],
            }],
            temperature: TEMPERATURE,
        };

        info!(model = %self.model, mime = %image.mime_type(), "Calling OpenAI responses API");
        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(api_key.expose())
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

        let body: ResponsesResponse = response.json().await?;
        let text = body.text();
        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyResponse("OpenAI".to_string()));
        }

        parse_model_json(&text, &self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_shape() {
        let image = ImageDataUrl::from_bytes("image/png", b"img");
        let request = ResponsesRequest {
            model: "gpt-4o-mini",
            input: vec![InputMessage {
                role: "user",
                content: vec![
                    InputContent::InputText { text: "prompt" },
                    InputContent::InputImage {
                        image_url: image.as_str(),
                        detail: "auto",
                    },
                ],
            }],
            temperature: TEMPERATURE,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["input"][0]["content"][0], json!({ "type": "input_text", "text": "prompt" }));
        assert_eq!(value["input"][0]["content"][1]["type"], json!("input_image"));
        assert_eq!(value["input"][0]["content"][1]["image_url"], json!(image.as_str()));
        assert_eq!(value["temperature"], json!(0.2));
    }

    #[test]
    fn reads_convenience_output_text() {
        let body: ResponsesResponse =
            serde_json::from_value(json!({ "output_text": "{\"items\":[]}" })).unwrap();
        assert_eq!(body.text(), "{\"items\":[]}");
    }

    #[test]
    fn joins_output_text_blocks() {
        let body: ResponsesResponse = serde_json::from_value(json!({
            "output": [
                { "type": "reasoning", "content": [] },
                { "type": "message", "content": [
                    { "type": "output_text", "text": "{\"items\":" },
                    { "type": "refusal", "text": "ignored" },
                    { "type": "output_text", "text": "[]}" }
                ]}
            ]
        }))
        .unwrap();
        assert_eq!(body.text(), "{\"items\":[]}");
    }

    #[tokio::test]
    async fn missing_key_fails_before_network() {
        let config = EndpointConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
        };
        let provider = OpenAiProvider::new(Client::new(), &config);
        let image = ImageDataUrl::from_bytes("image/jpeg", b"x");

        let err = provider.extract(&image).await.unwrap_err();
        assert_eq!(err.to_string(), "OPENAI_API_KEY is not set.");
    }
}
