mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use common::{BrowserBehavior, CAPTCHA_PAGE, FakeBrowser, FakePage, state_page};
use tiktok_scraper::common::client::client::PageFetcher;
use tiktok_scraper::common::client::error::ApiError;
use tiktok_scraper::parser::errors::ParseError;
use tiktok_scraper::parser::fetcher::StateFetcher;

const URL: &str = "https://www.tiktok.com/@alice/video/7100000000000000001";

fn fetcher(page: &Arc<FakePage>, browser: &Arc<FakeBrowser>) -> StateFetcher {
    StateFetcher::new(page.clone(), browser.clone(), Duration::from_secs(5))
}

#[tokio::test]
async fn test_plain_state_skips_browser() {
    let state = json!({"ItemModule": {"1": {"id": "1"}}});
    let page = Arc::new(FakePage::serving(state_page(&state)));
    let browser = Arc::new(FakeBrowser::new(BrowserBehavior::Unavailable));

    let result = fetcher(&page, &browser).fetch(URL).await.unwrap();
    assert_eq!(result, state);
    assert_eq!(page.calls(), 1);
    assert_eq!(browser.calls(), 0);
}

#[tokio::test]
async fn test_missing_marker_uses_browser_once() {
    let state = json!({"UserModule": {"users": {}}});
    let page = Arc::new(FakePage::serving(CAPTCHA_PAGE));
    let browser = Arc::new(FakeBrowser::new(BrowserBehavior::Serve(state_page(&state))));

    let result = fetcher(&page, &browser).fetch(URL).await.unwrap();
    assert_eq!(result, state);
    assert_eq!(page.calls(), 1);
    assert_eq!(browser.calls(), 1);
}

#[tokio::test]
async fn test_invalid_state_json_uses_browser() {
    let page = Arc::new(FakePage::serving(
        r#"<script id="SIGI_STATE">{"ItemModule": </script>"#,
    ));
    let state = json!({"ItemModule": {}});
    let browser = Arc::new(FakeBrowser::new(BrowserBehavior::Serve(state_page(&state))));

    assert_eq!(fetcher(&page, &browser).fetch(URL).await.unwrap(), state);
    assert_eq!(browser.calls(), 1);
}

#[tokio::test]
async fn test_transport_error_uses_browser() {
    let page = Arc::new(FakePage::failing());
    let state = json!({"ItemModule": {}});
    let browser = Arc::new(FakeBrowser::new(BrowserBehavior::Serve(state_page(&state))));

    assert_eq!(fetcher(&page, &browser).fetch(URL).await.unwrap(), state);
    assert_eq!(browser.calls(), 1);
}

#[tokio::test]
async fn test_both_paths_unusable_is_extraction_error() {
    let page = Arc::new(FakePage::serving(CAPTCHA_PAGE));
    let browser = Arc::new(FakeBrowser::new(BrowserBehavior::Serve(CAPTCHA_PAGE.to_string())));

    let err = fetcher(&page, &browser).fetch(URL).await.unwrap_err();
    assert!(matches!(err, ParseError::Extraction(_)), "{:?}", err);
    assert_eq!(browser.calls(), 1);
}

#[tokio::test]
async fn test_navigation_failure_is_not_found() {
    let page = Arc::new(FakePage::serving(CAPTCHA_PAGE));
    let browser = Arc::new(FakeBrowser::new(BrowserBehavior::NavigationFails));

    let err = fetcher(&page, &browser).fetch(URL).await.unwrap_err();
    assert!(matches!(err, ParseError::NotFound(_)), "{:?}", err);
}

#[tokio::test]
async fn test_missing_browser_surfaces_api_error() {
    let page = Arc::new(FakePage::serving(CAPTCHA_PAGE));
    let browser = Arc::new(FakeBrowser::new(BrowserBehavior::Unavailable));

    let err = fetcher(&page, &browser).fetch(URL).await.unwrap_err();
    assert!(matches!(
        err,
        ParseError::Api(ApiError::BrowserUnavailable(_))
    ));
}

#[tokio::test]
async fn test_empty_url_rejected_before_any_request() {
    let page = Arc::new(FakePage::serving(CAPTCHA_PAGE));
    let browser = Arc::new(FakeBrowser::new(BrowserBehavior::Unavailable));

    let err = fetcher(&page, &browser).fetch("  ").await.unwrap_err();
    assert!(matches!(err, ParseError::Validation(_)));
    assert_eq!(page.calls(), 0);
    assert_eq!(browser.calls(), 0);
}

struct SlowPage;

#[async_trait]
impl PageFetcher for SlowPage {
    async fn fetch_text(&self, _url: &str) -> Result<String, ApiError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(String::new())
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_plain_fetch_times_out_then_falls_back() {
    let state = json!({"ItemModule": {}});
    let browser = Arc::new(FakeBrowser::new(BrowserBehavior::Serve(state_page(&state))));
    let fetcher = StateFetcher::new(Arc::new(SlowPage), browser.clone(), Duration::from_secs(1));

    assert_eq!(fetcher.fetch(URL).await.unwrap(), state);
    assert_eq!(browser.calls(), 1);
}
