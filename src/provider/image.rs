use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::error::ExtractionError;

/// 默认图片类型 (上传未声明 Content-Type 时)
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

fn data_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^data:(.+?);base64,(.+)$").expect("valid data URL regex"))
}

/// `data:<mime>;base64,<payload>` 形式的图片
#[derive(Clone, PartialEq, Eq)]
pub struct ImageDataUrl {
    url: String,
    mime_end: usize,
    data_start: usize,
}

impl ImageDataUrl {
    pub fn parse(url: impl Into<String>) -> Result<Self, ExtractionError> {
        let url = url.into();
        let (mime_end, data_start) = {
            let caps = data_url_pattern()
                .captures(&url)
                .ok_or(ExtractionError::InvalidImage)?;
            match (caps.get(1), caps.get(2)) {
                (Some(mime), Some(data)) => (mime.end(), data.start()),
                _ => return Err(ExtractionError::InvalidImage),
            }
        };
        Ok(Self {
            url,
            mime_end,
            data_start,
        })
    }

    /// 上传的原始字节编码为 data URL
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        let mime_type = if mime_type.trim().is_empty() {
            DEFAULT_MIME_TYPE
        } else {
            mime_type.trim()
        };
        let prefix = format!("data:{};base64,", mime_type);
        let mime_end = prefix.len() - ";base64,".len();
        let data_start = prefix.len();

        let mut url = prefix;
        STANDARD.encode_string(bytes, &mut url);

        Self {
            url,
            mime_end,
            data_start,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn mime_type(&self) -> &str {
        &self.url["data:".len()..self.mime_end]
    }

    /// base64 数据部分
    pub fn data(&self) -> &str {
        &self.url[self.data_start..]
    }
}

impl fmt::Debug for ImageDataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageDataUrl")
            .field("mime_type", &self.mime_type())
            .field("data_len", &self.data().len())
            .finish()
    }
}
