use std::sync::Arc;

use async_trait::async_trait;
use futures::{Stream, TryStreamExt, stream};
use serde_json::Value;
use tracing::{debug, warn};

use super::errors::ParseError;
use super::models::{ItemPage, PageCursor};
use crate::common::client::client::PageFetcher;
use crate::common::config::ScraperConfig;

pub const LISTING_AID: &str = "1988";

/// 一次分页请求
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, owner: &str, cursor: &str) -> Result<ItemPage, ParseError>;
}

/// 用户作品列表接口
pub struct ItemListApi {
    client: Arc<dyn PageFetcher>,
    api_base: String,
    page_size: u32,
}

impl ItemListApi {
    pub fn new(client: Arc<dyn PageFetcher>, config: &ScraperConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            page_size: config.page_size,
        }
    }

    pub fn page_url(&self, owner: &str, cursor: &str) -> Result<String, ParseError> {
        let count = self.page_size.to_string();
        let cursor = if cursor.is_empty() { "0" } else { cursor };
        let query = serde_urlencoded::to_string([
            ("aid", LISTING_AID),
            ("count", count.as_str()),
            ("secUid", owner),
            ("cursor", cursor),
        ])
        .map_err(|e| ParseError::Validation(e.to_string()))?;

        Ok(format!("{}/api/post/item_list/?{}", self.api_base, query))
    }
}

#[async_trait]
impl PageSource for ItemListApi {
    async fn fetch_page(&self, owner: &str, cursor: &str) -> Result<ItemPage, ParseError> {
        let url = self.page_url(owner, cursor)?;
        let body = self.client.fetch_json(&url).await?;
        parse_item_page(&body)
    }
}

/// 解析 `{ itemList, cursor, hasMore }`，游标可能是字符串也可能是数字
pub fn parse_item_page(body: &Value) -> Result<ItemPage, ParseError> {
    if !body.is_object() {
        return Err(ParseError::InvalidJson("分页响应不是 JSON 对象".to_string()));
    }

    let items = body
        .get("itemList")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let cursor = match body.get("cursor") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    let has_more = match body.get("hasMore") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    };

    Ok(ItemPage {
        items,
        cursor: PageCursor { cursor, has_more },
    })
}

// 分页过程中的状态
struct CollectState {
    cursor: Option<PageCursor>, // None 表示还没请求过第一页
    pages: usize,
    done: bool,
}

pub struct PaginatedCollector {
    source: Arc<dyn PageSource>,
    max_pages: usize,
}

impl PaginatedCollector {
    pub fn new(source: Arc<dyn PageSource>, max_pages: usize) -> Self {
        Self { source, max_pages }
    }

    /// 按服务端游标依次拉取，直到 `hasMore` 为 false
    ///
    /// 返回的流是惰性的，只能消费一次。超过 `max_pages` 时产生 [`ParseError::PageLimit`]。
    pub fn pages(
        &self,
        owner: &str,
    ) -> impl Stream<Item = Result<Vec<Value>, ParseError>> + Send + use<> {
        let source = Arc::clone(&self.source);
        let max_pages = self.max_pages;
        let owner = owner.to_string();

        let init = CollectState {
            cursor: None,
            pages: 0,
            done: false,
        };

        stream::try_unfold(init, move |mut state| {
            let source = Arc::clone(&source);
            let owner = owner.clone();
            async move {
                if state.done {
                    return Ok(None);
                }
                if owner.trim().is_empty() {
                    return Err(ParseError::Validation("缺少 secUid".to_string()));
                }
                if state.pages >= max_pages {
                    warn!("分页达到上限 {} 页，停止拉取", max_pages);
                    return Err(ParseError::PageLimit(max_pages));
                }

                let cursor = state
                    .cursor
                    .as_ref()
                    .map(|c| c.cursor.clone())
                    .unwrap_or_default();
                let page = source.fetch_page(&owner, &cursor).await?;
                state.pages += 1;

                debug!(
                    "第 {} 页: {} 条, cursor={}, hasMore={}",
                    state.pages,
                    page.items.len(),
                    page.cursor.cursor,
                    page.cursor.has_more
                );

                state.done = !page.cursor.has_more;
                state.cursor = Some(page.cursor);
                Ok(Some((page.items, state)))
            }
        })
    }

    /// 逐条产出原始条目，不做去重
    pub fn stream(
        &self,
        owner: &str,
    ) -> impl Stream<Item = Result<Value, ParseError>> + Send + use<> {
        self.pages(owner)
            .map_ok(|items| stream::iter(items.into_iter().map(Ok::<Value, ParseError>)))
            .try_flatten()
    }

    pub async fn collect_all(&self, owner: &str) -> Result<Vec<Value>, ParseError> {
        self.stream(owner).try_collect().await
    }
}
