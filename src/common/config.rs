use std::path::Path;
use std::time::Duration;

use serde_derive::{Deserialize, Serialize};

use crate::browser::config::BrowserConfig;
use crate::common::client::error::ApiError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";
pub const DEFAULT_API_BASE: &str = "https://www.tiktok.com";
pub const DEFAULT_DETAIL_API: &str =
    "https://api22-normal-c-alisg.tiktokv.com/aweme/v1/aweme/detail/";

/// 抓取器配置，构造后只读
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub cookie: Option<String>,       // 原样透传的 Cookie 头
    pub user_agent: String,           // UA
    pub timeout_secs: u64,            // 单次请求的超时时间
    pub max_pages: usize,             // 分页上限
    pub page_size: u32,               // 每页条数
    pub api_base: String,             // 页面与列表接口的根地址
    pub detail_api: String,           // 无水印详情接口
    pub browser: BrowserConfig,       // 浏览器回退配置
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            cookie: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            max_pages: 500,
            page_size: 30,
            api_base: DEFAULT_API_BASE.to_string(),
            detail_api: DEFAULT_DETAIL_API.to_string(),
            browser: BrowserConfig::default(),
        }
    }
}

impl ScraperConfig {
    /// 从 JSON 文件加载配置，缺省字段取默认值
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cookie_header(&self) -> &str {
        self.cookie.as_deref().unwrap_or("")
    }

    pub fn user_page_url(&self, username: &str) -> String {
        format!("{}/@{}", self.api_base.trim_end_matches('/'), username)
    }

    pub fn hashtag_page_url(&self, tag: &str) -> String {
        format!(
            "{}/tag/{}",
            self.api_base.trim_end_matches('/'),
            urlencoding::encode(tag)
        )
    }
}
