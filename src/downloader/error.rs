use thiserror::Error;

use crate::common::client::error::ApiError;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP错误: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API错误: {0}")]
    Api(#[from] ApiError),

    #[error("无效的下载目录: {0}")]
    InvalidDestination(String),
}
