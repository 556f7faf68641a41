use thiserror::Error;

use crate::common::client::error::ApiError;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("参数无效: {0}")]
    Validation(String),

    #[error("无法从页面中提取数据: {0}")]
    Extraction(String),

    #[error("页面中未找到状态节点: {0}")]
    MarkerNotFound(String),

    #[error("JSON 格式错误: {0}")]
    InvalidJson(String),

    #[error("未找到: {0}")]
    NotFound(String),

    #[error("字段映射失败: {0}")]
    Mapping(String),

    #[error("无法获取无水印地址: {0}")]
    Resolution(String),

    #[error("分页超过上限 {0} 页")]
    PageLimit(usize),

    #[error("请求超时: {0}")]
    Timeout(String),

    #[error("API错误: {0}")]
    Api(#[from] ApiError),
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::InvalidJson(err.to_string())
    }
}

impl ParseError {
    /// 批量场景下可以跳过的单项错误
    pub fn is_skippable(&self) -> bool {
        matches!(self, ParseError::Resolution(_) | ParseError::Mapping(_))
    }
}
