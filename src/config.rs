use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::fmt;

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 视觉模型配置；`name` 决定启动时选用哪个实现
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub openai: EndpointConfig,
    pub gemini: EndpointConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<ApiKey>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

/// API Key，Debug 输出时隐藏
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

pub const DEFAULT_MAX_UPLOAD_BYTES: i64 = 12 * 1024 * 1024;

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            provider: ProviderConfig {
                name: "openai".to_string(),
                openai: EndpointConfig {
                    base_url: "https://api.openai.com/v1".to_string(),
                    model: "gpt-4o-mini".to_string(),
                    api_key: None,
                },
                gemini: EndpointConfig {
                    base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                    model: "gemini-2.5-flash".to_string(),
                    api_key: None,
                },
            },
            upload: UploadConfig {
                max_bytes: DEFAULT_MAX_UPLOAD_BYTES as usize,
            },
        }
    }
}

impl AppConfig {
    /// 加载配置，优先级从低到高：
    /// 内置默认值 -> `receipt.toml` (可选) -> `RECEIPT__*` 环境变量 -> 常用环境变量
    /// (`SERVER_HOST`, `SERVER_PORT`, `AI_PROVIDER`, `OPENAI_API_KEY`, `GEMINI_API_KEY` 等)
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name("receipt").required(false))
            .add_source(Environment::with_prefix("RECEIPT").separator("__"))
            .set_override_option("server.host", env_var(&["SERVER_HOST"]))?
            .set_override_option("server.port", env_var(&["SERVER_PORT"]))?
            .set_override_option(
                "provider.name",
                env_var(&["AI_PROVIDER"]).map(|p| p.to_lowercase()),
            )?
            .set_override_option("provider.openai.api_key", env_var(&["OPENAI_API_KEY"]))?
            .set_override_option("provider.openai.model", env_var(&["OPENAI_MODEL"]))?
            .set_override_option("provider.openai.base_url", env_var(&["OPENAI_BASE_URL"]))?
            .set_override_option(
                "provider.gemini.api_key",
                env_var(&["GEMINI_API_KEY", "GOOGLE_API_KEY"]),
            )?
            .set_override_option("provider.gemini.model", env_var(&["GEMINI_MODEL"]))?
            .set_override_option("provider.gemini.base_url", env_var(&["GEMINI_BASE_URL"]))?
            .build()?
            .try_deserialize()
    }

    /// 只含默认值的构建器
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("provider.name", defaults.provider.name)?
            .set_default("provider.openai.base_url", defaults.provider.openai.base_url)?
            .set_default("provider.openai.model", defaults.provider.openai.model)?
            .set_default("provider.gemini.base_url", defaults.provider.gemini.base_url)?
            .set_default("provider.gemini.model", defaults.provider.gemini.model)?
            .set_default("upload.max_bytes", DEFAULT_MAX_UPLOAD_BYTES)
    }
}

/// 按顺序取第一个非空的环境变量
fn env_var(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.trim().is_empty())
}
