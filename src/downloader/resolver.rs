use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::common::client::client::PageFetcher;
use crate::parser::errors::ParseError;

/// 根据视频ID获取无水印的播放地址
#[async_trait]
pub trait NoWatermarkResolver: Send + Sync {
    async fn resolve(&self, video_id: &str) -> Result<String, ParseError>;
}

/// 通过 aweme 详情接口解析
pub struct DetailApiResolver {
    client: Arc<dyn PageFetcher>,
    detail_api: String,
}

impl DetailApiResolver {
    pub fn new(client: Arc<dyn PageFetcher>, detail_api: impl Into<String>) -> Self {
        Self {
            client,
            detail_api: detail_api.into(),
        }
    }

    fn detail_url(&self, video_id: &str) -> String {
        format!(
            "{}?aweme_id={}",
            self.detail_api.trim_end_matches('?'),
            urlencoding::encode(video_id)
        )
    }
}

#[async_trait]
impl NoWatermarkResolver for DetailApiResolver {
    async fn resolve(&self, video_id: &str) -> Result<String, ParseError> {
        if video_id.trim().is_empty() {
            return Err(ParseError::Validation("视频ID不能为空".to_string()));
        }

        let body = self.client.fetch_json(&self.detail_url(video_id)).await?;
        let url = first_play_url(&body, video_id)?;
        debug!("视频 {} 的无水印地址: {}", video_id, url);
        Ok(url)
    }
}

/// 取 `aweme_detail.video.play_addr.url_list` 的第一项
pub fn first_play_url(body: &Value, video_id: &str) -> Result<String, ParseError> {
    body.pointer("/aweme_detail/video/play_addr/url_list/0")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ParseError::Resolution(format!(
                "视频 {} 没有可用的播放地址（可能已删除或设为私密）",
                video_id
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::client::error::ApiError;
    use serde_json::json;
    use std::sync::Mutex;

    // 记录请求地址，返回固定的响应体
    struct CannedFetcher {
        body: Result<&'static str, ()>,
        urls: Mutex<Vec<String>>,
    }

    impl CannedFetcher {
        fn new(body: Result<&'static str, ()>) -> Arc<Self> {
            Arc::new(Self {
                body,
                urls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PageFetcher for CannedFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String, ApiError> {
            self.urls.lock().unwrap().push(url.to_string());
            self.body
                .map(str::to_string)
                .map_err(|_| ApiError::RetryLater)
        }
    }

    const DETAIL: &str = "https://api.example/aweme/v1/aweme/detail/";

    #[tokio::test]
    async fn test_resolve_requests_detail_by_id() {
        let fetcher = CannedFetcher::new(Ok(
            r#"{"aweme_detail": {"video": {"play_addr": {"url_list": ["https://v/1.mp4", "https://v/2.mp4"]}}}}"#,
        ));
        let resolver = DetailApiResolver::new(fetcher.clone(), DETAIL);

        assert_eq!(resolver.resolve("7100").await.unwrap(), "https://v/1.mp4");
        assert_eq!(
            fetcher.urls.lock().unwrap().clone(),
            vec![format!("{}?aweme_id=7100", DETAIL)]
        );
    }

    #[tokio::test]
    async fn test_resolve_non_json_body() {
        let resolver = DetailApiResolver::new(CannedFetcher::new(Ok("<html>blocked</html>")), DETAIL);
        assert!(matches!(
            resolver.resolve("7100").await,
            Err(ParseError::Api(ApiError::InvalidResponse(_)))
        ));
    }

    #[tokio::test]
    async fn test_resolve_transport_error_is_not_skippable() {
        let resolver = DetailApiResolver::new(CannedFetcher::new(Err(())), DETAIL);
        let err = resolver.resolve("7100").await.unwrap_err();
        assert!(matches!(err, ParseError::Api(ApiError::RetryLater)));
        assert!(!err.is_skippable());
    }

    #[tokio::test]
    async fn test_resolve_empty_list_and_empty_id() {
        let fetcher = CannedFetcher::new(Ok(
            r#"{"aweme_detail": {"video": {"play_addr": {"url_list": []}}}}"#,
        ));
        let resolver = DetailApiResolver::new(fetcher.clone(), DETAIL);
        assert!(matches!(resolver.resolve("7100").await, Err(ParseError::Resolution(_))));
        assert!(matches!(resolver.resolve(" ").await, Err(ParseError::Validation(_))));
        assert_eq!(fetcher.urls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_first_play_url() {
        let body = json!({"aweme_detail": {"video": {"play_addr": {"url_list": ["https://a/1", "https://b/2"]}}}});
        assert_eq!(first_play_url(&body, "1").unwrap(), "https://a/1");
    }

    #[test]
    fn test_empty_url_list() {
        let empty = json!({"aweme_detail": {"video": {"play_addr": {"url_list": []}}}});
        let deleted = json!({"status_code": 0, "aweme_detail": null});
        assert!(matches!(first_play_url(&empty, "1"), Err(ParseError::Resolution(_))));
        assert!(matches!(first_play_url(&deleted, "1"), Err(ParseError::Resolution(_))));
    }
}
