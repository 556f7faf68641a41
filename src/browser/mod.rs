//! 无头浏览器渲染，用于普通请求拿到反爬占位页时的回退路径。
//!
//! 每次调用都会启动一个独立的浏览器会话，渲染完成后立即关闭，不做复用。

pub mod config;

use async_trait::async_trait;

use crate::common::client::error::ApiError;
use config::BrowserConfig;

/// 渲染页面并返回完整的文档文本
#[async_trait]
pub trait BrowserFetcher: Send + Sync {
    async fn render(&self, url: &str) -> Result<String, ApiError>;
}

#[cfg(feature = "browser")]
mod chrome {
    use std::path::PathBuf;
    use std::time::Duration;

    use async_trait::async_trait;
    use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
    use chromiumoxide::{Browser, BrowserConfig as ChromeConfig};
    use futures::StreamExt;
    use tracing::{debug, info, warn};

    use super::{BrowserConfig, BrowserFetcher};
    use crate::common::client::error::ApiError;

    // 常见的 Chrome 安装位置
    const CHROME_PATHS: &[&str] = &[
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/opt/google/chrome/google-chrome",
    ];

    pub struct ChromeFetcher {
        config: BrowserConfig,
        user_agent: String,
    }

    impl ChromeFetcher {
        pub fn new(config: BrowserConfig, user_agent: impl Into<String>) -> Self {
            Self {
                config,
                user_agent: user_agent.into(),
            }
        }

        fn find_chrome(&self) -> Result<PathBuf, ApiError> {
            if let Some(path) = &self.config.chrome_path {
                return Ok(path.clone());
            }

            CHROME_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|p| p.exists())
                .ok_or_else(|| {
                    ApiError::BrowserUnavailable("未找到 Chrome/Chromium，请先安装".to_string())
                })
        }

        fn launch_config(&self) -> Result<ChromeConfig, ApiError> {
            let mut builder = ChromeConfig::builder().chrome_executable(self.find_chrome()?);

            if !self.config.headless {
                builder = builder.with_head();
            }

            builder = builder
                .arg("--incognito")
                .arg("--disable-blink-features=AutomationControlled")
                .arg("--disable-dev-shm-usage")
                .arg("--no-first-run")
                .arg("--no-default-browser-check")
                .arg("--no-sandbox")
                .arg("--disable-gpu");

            for arg in &self.config.args {
                builder = builder.arg(arg);
            }

            builder.build().map_err(ApiError::BrowserUnavailable)
        }
    }

    #[async_trait]
    impl BrowserFetcher for ChromeFetcher {
        async fn render(&self, url: &str) -> Result<String, ApiError> {
            info!("启动浏览器渲染: {}", url);

            let (mut browser, mut handler) = Browser::launch(self.launch_config()?)
                .await
                .map_err(|e| ApiError::BrowserUnavailable(e.to_string()))?;

            let handler_task = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let result = async {
                let page = browser
                    .new_page("about:blank")
                    .await
                    .map_err(|e| ApiError::BrowserUnavailable(e.to_string()))?;

                if let Err(e) = page
                    .execute(SetUserAgentOverrideParams::new(self.user_agent.clone()))
                    .await
                {
                    warn!("设置 UA 失败: {}", e);
                }

                page.goto(url)
                    .await
                    .map_err(|e| ApiError::Navigation(e.to_string()))?;

                // 给客户端脚本一点时间写入状态节点
                tokio::time::sleep(Duration::from_millis(self.config.settle_ms)).await;

                let content = page
                    .content()
                    .await
                    .map_err(|e| ApiError::Navigation(e.to_string()))?;

                let _ = page.close().await;
                Ok(content)
            }
            .await;

            // 无论成功与否都要关闭会话
            if let Err(e) = browser.close().await {
                debug!("关闭浏览器失败: {}", e);
            }
            let _ = browser.wait().await;
            handler_task.abort();

            result
        }
    }
}

#[cfg(feature = "browser")]
pub use chrome::ChromeFetcher;

// 未启用 browser 特性时的占位实现
#[cfg(not(feature = "browser"))]
pub struct ChromeFetcher;

#[cfg(not(feature = "browser"))]
impl ChromeFetcher {
    pub fn new(_config: BrowserConfig, _user_agent: impl Into<String>) -> Self {
        Self
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl BrowserFetcher for ChromeFetcher {
    async fn render(&self, _url: &str) -> Result<String, ApiError> {
        Err(ApiError::BrowserUnavailable(
            "未编译浏览器支持，请使用 --features browser 重新构建".to_string(),
        ))
    }
}
