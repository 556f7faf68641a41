use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::browser::{BrowserFetcher, ChromeFetcher};
use crate::common::client::client::{PageFetcher, TikClient};
use crate::common::config::ScraperConfig;
use crate::downloader::resolver::{DetailApiResolver, NoWatermarkResolver};
use errors::ParseError;
use fetcher::StateFetcher;
use mapper::EntityMapper;
use models::{Music, User, Video};
use pagination::{ItemListApi, PageSource, PaginatedCollector};
use url_parser::{VideoRef, normalize_username, video_id_from_url};

pub mod errors;
pub mod fetcher;
pub mod mapper;
pub mod models;
pub mod pagination;
pub mod state;
pub mod url_parser;

/// 抓取入口，组合页面抓取、分页与字段映射
pub struct Scraper {
    config: Arc<ScraperConfig>,
    fetcher: StateFetcher,
    collector: PaginatedCollector,
    resolver: Arc<dyn NoWatermarkResolver>,
    mapper: EntityMapper,
}

impl Scraper {
    pub fn new(config: ScraperConfig) -> Result<Self, ParseError> {
        let client: Arc<dyn PageFetcher> = Arc::new(TikClient::new(&config)?);
        let browser: Arc<dyn BrowserFetcher> = Arc::new(ChromeFetcher::new(
            config.browser.clone(),
            config.user_agent.clone(),
        ));
        let source: Arc<dyn PageSource> = Arc::new(ItemListApi::new(Arc::clone(&client), &config));
        let resolver: Arc<dyn NoWatermarkResolver> =
            Arc::new(DetailApiResolver::new(Arc::clone(&client), config.detail_api.clone()));

        Ok(Self::with_parts(config, client, browser, source, resolver))
    }

    /// 各个协作方都可以替换，测试时传入内存实现
    pub fn with_parts(
        config: ScraperConfig,
        page: Arc<dyn PageFetcher>,
        browser: Arc<dyn BrowserFetcher>,
        source: Arc<dyn PageSource>,
        resolver: Arc<dyn NoWatermarkResolver>,
    ) -> Self {
        Self {
            fetcher: StateFetcher::new(page, browser, config.timeout()),
            collector: PaginatedCollector::new(source, config.max_pages),
            resolver,
            mapper: EntityMapper::local(),
            config: Arc::new(config),
        }
    }

    pub fn with_mapper(mut self, mapper: EntityMapper) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn resolver(&self) -> Arc<dyn NoWatermarkResolver> {
        Arc::clone(&self.resolver)
    }

    /// 单个视频详情，作者为昵称
    pub async fn video(&self, url: &str) -> Result<Video, ParseError> {
        let state = self.fetcher.fetch(url).await?;
        let id = video_id_from_url(url);
        let item = mapper::state_video(&state, id.as_deref())?;
        self.mapper.video_with_users(item, state.get("UserModule"))
    }

    pub async fn user(&self, username: &str) -> Result<User, ParseError> {
        let username = normalize_username(username)?;
        let state = self.fetcher.fetch(&self.config.user_page_url(&username)).await?;
        let (user, stats) = mapper::state_user(&state, &username)?;
        self.mapper.user(user, stats)
    }

    /// 用户的全部作品，通过 secUid 分页拉取
    pub async fn user_videos(&self, username: &str) -> Result<Vec<Video>, ParseError> {
        let user = self.user(username).await?;
        let sec_uid = user
            .sec_uid
            .ok_or_else(|| ParseError::NotFound(format!("用户 {} 缺少 secUid", user.unique_id)))?;

        let items = self.collector.collect_all(&sec_uid).await?;
        info!("用户 {} 共拉取到 {} 条作品", user.unique_id, items.len());
        Ok(self.map_listing(items.iter()))
    }

    /// 话题页中的视频，没有可映射的条目时视为不存在
    pub async fn hashtag(&self, tag: &str) -> Result<Vec<Video>, ParseError> {
        let tag = tag.trim().trim_start_matches('#');
        if tag.is_empty() {
            return Err(ParseError::Validation("话题不能为空".to_string()));
        }

        let state = self.fetcher.fetch(&self.config.hashtag_page_url(tag)).await?;
        let videos = self.map_listing(mapper::state_items(&state).into_iter());
        if videos.is_empty() {
            return Err(ParseError::NotFound(format!("话题 #{} 没有视频", tag)));
        }
        Ok(videos)
    }

    /// 视频所用的背景音乐
    pub async fn music(&self, url: &str) -> Result<Music, ParseError> {
        let video = self.video(url).await?;
        video
            .music
            .ok_or_else(|| ParseError::NotFound(format!("视频 {} 没有音乐信息", video.id)))
    }

    /// 接受视频ID或页面地址，返回无水印地址
    pub async fn resolve_no_watermark(&self, input: &str) -> Result<String, ParseError> {
        let video_ref = VideoRef::parse(input)?;
        let id = match video_ref.known_id() {
            Some(id) => id,
            None => match &video_ref {
                VideoRef::Url(url) => self.video(url).await?.id,
                VideoRef::Id(id) => id.clone(),
            },
        };

        debug!("解析无水印地址: {}", id);
        self.resolver.resolve(&id).await
    }

    // 单条映射失败不影响其他条目
    fn map_listing<'a>(&self, items: impl Iterator<Item = &'a Value>) -> Vec<Video> {
        items
            .filter_map(|item| match self.mapper.listing_video(item) {
                Ok(video) => Some(video),
                Err(e) => {
                    warn!("忽略无法映射的条目: {}", e);
                    None
                }
            })
            .collect()
    }
}
