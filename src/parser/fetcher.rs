use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::errors::ParseError;
use super::state::extract_state;
use crate::browser::BrowserFetcher;
use crate::common::client::client::PageFetcher;
use crate::common::client::error::ApiError;

// 获取页面状态的两种方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    Plain,   // 普通 HTTP 请求
    Browser, // 无头浏览器渲染
}

/// 判定一份文档是否含有可用的状态数据
///
/// 只有状态节点存在且内容是 JSON 对象时才算可用，占位页、验证码页都会落到回退路径。
pub fn usable_state(html: &str) -> Option<Value> {
    let raw = extract_state(html).ok()?;
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value) if value.is_object() => Some(value),
        _ => None,
    }
}

pub struct StateFetcher {
    page: Arc<dyn PageFetcher>,
    browser: Arc<dyn BrowserFetcher>,
    deadline: Duration,
}

impl StateFetcher {
    pub fn new(
        page: Arc<dyn PageFetcher>,
        browser: Arc<dyn BrowserFetcher>,
        deadline: Duration,
    ) -> Self {
        Self {
            page,
            browser,
            deadline,
        }
    }

    /// 先走普通请求，拿不到可用状态时用浏览器重试一次
    pub async fn fetch(&self, url: &str) -> Result<Value, ParseError> {
        if url.trim().is_empty() {
            return Err(ParseError::Validation("URL 不能为空".to_string()));
        }

        match self.try_strategy(FetchStrategy::Plain, url).await {
            Ok(Some(state)) => {
                debug!("普通请求拿到状态数据: {}", url);
                return Ok(state);
            }
            Ok(None) => warn!("页面未包含可用的状态数据，改用浏览器渲染: {}", url),
            Err(e) => warn!("普通请求失败 ({})，改用浏览器渲染: {}", e, url),
        }

        match self.try_strategy(FetchStrategy::Browser, url).await {
            Ok(Some(state)) => {
                info!("浏览器渲染拿到状态数据: {}", url);
                Ok(state)
            }
            Ok(None) => Err(ParseError::Extraction(format!(
                "两种方式都未能解析出状态数据: {}",
                url
            ))),
            Err(ParseError::Api(ApiError::Navigation(msg))) => {
                Err(ParseError::NotFound(format!("页面加载失败: {}", msg)))
            }
            Err(e) => Err(e),
        }
    }

    async fn try_strategy(
        &self,
        strategy: FetchStrategy,
        url: &str,
    ) -> Result<Option<Value>, ParseError> {
        let html = match strategy {
            FetchStrategy::Plain => self.with_deadline(self.page.fetch_text(url)).await?,
            FetchStrategy::Browser => self.with_deadline(self.browser.render(url)).await?,
        };
        Ok(usable_state(&html))
    }

    async fn with_deadline<T>(
        &self,
        fut: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<T, ParseError> {
        match tokio::time::timeout(self.deadline, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ParseError::Timeout(format!("超过 {:?}", self.deadline))),
        }
    }
}
