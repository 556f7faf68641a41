#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use tiktok_scraper::browser::BrowserFetcher;
use tiktok_scraper::common::client::client::PageFetcher;
use tiktok_scraper::common::client::error::ApiError;
use tiktok_scraper::downloader::resolver::NoWatermarkResolver;
use tiktok_scraper::parser::errors::ParseError;
use tiktok_scraper::parser::models::{ItemPage, PageCursor};
use tiktok_scraper::parser::pagination::PageSource;

pub fn state_page(state: &Value) -> String {
    format!(
        r#"<html><head></head><body><script id="SIGI_STATE" type="application/json">{}</script></body></html>"#,
        state
    )
}

pub const CAPTCHA_PAGE: &str = "<html><body>Please verify you are human</body></html>";

/// 按 URL 返回固定文档，没有登记的 URL 返回 404
#[derive(Default)]
pub struct FakePage {
    pages: HashMap<String, String>,
    fallback: Option<String>,
    fail: bool,
    pub calls: AtomicUsize,
}

impl FakePage {
    pub fn serving(html: impl Into<String>) -> Self {
        Self {
            fallback: Some(html.into()),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn with(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for FakePage {
    async fn fetch_text(&self, url: &str) -> Result<String, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ApiError::RetryLater);
        }
        self.pages
            .get(url)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                url: url.to_string(),
            })
    }
}

pub enum BrowserBehavior {
    Serve(String),
    NavigationFails,
    Unavailable,
}

pub struct FakeBrowser {
    behavior: BrowserBehavior,
    pub calls: AtomicUsize,
}

impl FakeBrowser {
    pub fn new(behavior: BrowserBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserFetcher for FakeBrowser {
    async fn render(&self, _url: &str) -> Result<String, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            BrowserBehavior::Serve(html) => Ok(html.clone()),
            BrowserBehavior::NavigationFails => {
                Err(ApiError::Navigation("net::ERR_NAME_NOT_RESOLVED".to_string()))
            }
            BrowserBehavior::Unavailable => {
                Err(ApiError::BrowserUnavailable("no chrome".to_string()))
            }
        }
    }
}

/// 依次返回预先准备好的分页，并记录每次请求的游标
pub struct FakeSource {
    pages: Vec<ItemPage>,
    pub cursors: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new(pages: Vec<ItemPage>) -> Self {
        Self {
            pages,
            cursors: Mutex::new(Vec::new()),
        }
    }

    /// 每页 `per_page` 条，最后一页 hasMore=false
    pub fn sized(pages: usize, per_page: usize) -> Self {
        let pages = (0..pages)
            .map(|p| page((0..per_page).map(|i| listing_item(&format!("{}{}", p, i))).collect(), &format!("c{}", p + 1), p + 1 < pages))
            .collect();
        Self::new(pages)
    }

    /// 每一页都声称还有下一页
    pub fn endless() -> Self {
        let pages = (0..100)
            .map(|p| page(vec![listing_item(&p.to_string())], &format!("c{}", p + 1), true))
            .collect();
        Self::new(pages)
    }

    pub fn calls(&self) -> usize {
        self.cursors.lock().unwrap().len()
    }
}

#[async_trait]
impl PageSource for FakeSource {
    async fn fetch_page(&self, _owner: &str, cursor: &str) -> Result<ItemPage, ParseError> {
        let mut cursors = self.cursors.lock().unwrap();
        let index = cursors.len();
        cursors.push(cursor.to_string());
        self.pages
            .get(index)
            .cloned()
            .ok_or_else(|| ParseError::InvalidJson("no more pages".to_string()))
    }
}

pub fn page(items: Vec<Value>, cursor: &str, has_more: bool) -> ItemPage {
    ItemPage {
        items,
        cursor: PageCursor {
            cursor: cursor.to_string(),
            has_more,
        },
    }
}

pub fn listing_item(id: &str) -> Value {
    json!({
        "id": id,
        "desc": format!("video {}", id),
        "createTime": 1650000000,
        "video": {
            "id": id,
            "height": 1024,
            "width": 576,
            "duration": 15,
            "ratio": "720p",
            "format": "mp4",
            "downloadAddr": format!("https://cdn.example/{}.mp4", id)
        },
        "author": "alice",
        "stats": {"diggCount": 10, "shareCount": 1, "commentCount": 2, "playCount": 100}
    })
}

/// 登记过的视频ID得到 Resolution 错误，其他视频返回固定地址
#[derive(Default)]
pub struct FakeResolver {
    pub broken: Vec<String>,
    pub offline: bool,
    pub calls: AtomicUsize,
}

impl FakeResolver {
    pub fn broken(ids: &[&str]) -> Self {
        Self {
            broken: ids.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    /// 所有请求都以传输错误失败
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl NoWatermarkResolver for FakeResolver {
    async fn resolve(&self, video_id: &str) -> Result<String, ParseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline {
            return Err(ParseError::Api(ApiError::RetryLater));
        }
        if self.broken.iter().any(|id| id == video_id) {
            return Err(ParseError::Resolution(format!("video {} is private", video_id)));
        }
        Ok(format!("https://nwm.example/{}.mp4", video_id))
    }
}

pub fn arc<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
