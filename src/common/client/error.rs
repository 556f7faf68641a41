use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("网络请求失败: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("HTTP 状态码异常: {status}, URL: {url}")]
    Status { status: u16, url: String },

    #[error("服务暂时不可用，请稍后重试")]
    RetryLater,

    #[error("响应解析失败: {0}")]
    InvalidResponse(String),

    #[error("页面加载失败: {0}")]
    Navigation(String),

    #[error("浏览器不可用: {0}")]
    BrowserUnavailable(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidResponse(e.to_string())
    }
}
