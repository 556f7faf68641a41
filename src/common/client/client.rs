use async_trait::async_trait;
use reqwest::{
    Client, ClientBuilder, Response,
    header::{
        ACCEPT, ACCEPT_ENCODING, CACHE_CONTROL, CONNECTION, COOKIE, HeaderMap, HeaderValue,
        USER_AGENT,
    },
};
use serde_json::Value;
use tracing::{debug, error};

use crate::common::client::error::ApiError;
use crate::common::config::ScraperConfig;

/// 单次 GET 请求，返回原始文本
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, ApiError>;

    async fn fetch_json(&self, url: &str) -> Result<Value, ApiError> {
        let text = self.fetch_text(url).await?;
        serde_json::from_str(&text).map_err(|e| {
            error!("JSON 解析失败: {}, URL: {}", e, url);
            ApiError::InvalidResponse(format!("JSON 解析失败: {}", e))
        })
    }
}

// 携带调用方 Cookie 的客户端
#[derive(Debug, Clone)]
pub struct TikClient {
    pub inner: Client,
}

impl TikClient {
    pub fn new(config: &ScraperConfig) -> Result<Self, ApiError> {
        let inner = ClientBuilder::new()
            .timeout(config.timeout())
            .default_headers(Self::get_default_headers(config))
            .build()?;

        Ok(Self { inner })
    }

    /// 下载用的客户端，只限制连接和单次读取的时间，不限制整个响应体
    pub fn for_downloads(config: &ScraperConfig) -> Result<Self, ApiError> {
        let inner = ClientBuilder::new()
            .connect_timeout(config.timeout())
            .read_timeout(config.timeout())
            .default_headers(Self::get_default_headers(config))
            .build()?;

        Ok(Self { inner })
    }

    pub fn get_default_headers(config: &ScraperConfig) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(crate::common::config::DEFAULT_USER_AGENT)),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        // 没有 Cookie 时发送空值而不是报错
        let cookie = HeaderValue::from_str(config.cookie_header()).unwrap_or_else(|_| {
            error!("Cookie 含有非法字符，已忽略");
            HeaderValue::from_static("")
        });
        headers.insert(COOKIE, cookie);

        headers
    }

    pub async fn get_raw_response(&self, url: &str) -> Result<Response, ApiError> {
        debug!("GET {}", url);
        let resp = self.inner.get(url).send().await?;
        Self::check_response_status(&resp)?;
        Ok(resp)
    }

    fn check_response_status(resp: &Response) -> Result<(), ApiError> {
        let status = resp.status();
        if status.is_server_error() {
            return Err(ApiError::RetryLater);
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: resp.url().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PageFetcher for TikClient {
    async fn fetch_text(&self, url: &str) -> Result<String, ApiError> {
        let resp = self.get_raw_response(url).await?;
        Ok(resp.text().await?)
    }
}
