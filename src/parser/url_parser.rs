use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use super::errors::ParseError;

// 调用方传入的视频引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoRef {
    Id(String),  // 纯数字的视频ID
    Url(String), // 页面地址
}

impl VideoRef {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        lazy_static! {
            static ref ID_PATTERN: Regex = Regex::new(r"^\d+$").unwrap();
        }

        let input = input.trim();
        if input.is_empty() {
            return Err(ParseError::Validation("视频ID或URL不能为空".to_string()));
        }

        if ID_PATTERN.is_match(input) {
            return Ok(Self::Id(input.to_string()));
        }

        Url::parse(input)
            .map(|url| Self::Url(url.into()))
            .map_err(|e| ParseError::Validation(format!("无效的URL {}: {}", input, e)))
    }

    /// 直接给了ID，或者地址里带有 `/video/<id>` 时返回ID
    pub fn known_id(&self) -> Option<String> {
        match self {
            Self::Id(id) => Some(id.clone()),
            Self::Url(url) => video_id_from_url(url),
        }
    }
}

pub fn video_id_from_url(url: &str) -> Option<String> {
    lazy_static! {
        static ref VIDEO_PATH: Regex = Regex::new(r"/video/(\d+)").unwrap();
    }

    VIDEO_PATH
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// 用户名可以带 `@` 前缀
pub fn normalize_username(input: &str) -> Result<String, ParseError> {
    let name = input.trim().trim_start_matches('@');
    if name.is_empty() {
        return Err(ParseError::Validation("用户名不能为空".to_string()));
    }
    Ok(name.to_string())
}
