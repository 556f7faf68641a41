use std::path::PathBuf;

use serde_derive::{Deserialize, Serialize};

/// 浏览器回退配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// 是否无头运行，调试时可关闭
    pub headless: bool,

    /// Chrome 可执行文件路径，未设置时自动查找
    pub chrome_path: Option<PathBuf>,

    /// 额外的 Chrome 启动参数
    pub args: Vec<String>,

    /// 等待页面就绪后额外等待的毫秒数，给客户端脚本留出渲染时间
    pub settle_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            args: Vec::new(),
            settle_ms: 500,
        }
    }
}
