use chrono::NaiveDate;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

// 视频
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,                       // 视频ID，非空
    pub description: String,              // 文案
    pub created: Option<NaiveDate>,       // 发布日期
    pub height: u64,
    pub width: u64,
    pub duration: u64,                    // 时长，秒
    pub ratio: String,                    // 分辨率档位，如 720p
    pub share_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub play_count: u64,
    pub download_url: String,             // 带水印的下载地址
    pub no_watermark_url: Option<String>, // 无水印地址，解析后才有
    pub cover: String,
    pub dynamic_cover: String,
    pub format: String,
    pub author: String,                   // 详情页为昵称，列表页为作者 handle
    pub music: Option<Music>,
}

impl Video {
    /// 下载时使用的文件名: <id>_<分辨率>.<格式>
    pub fn file_name(&self) -> String {
        let ratio = if self.ratio.is_empty() { "unknown" } else { &self.ratio };
        let format = if self.format.is_empty() { "mp4" } else { &self.format };
        format!("{}_{}.{}", self.id, ratio, format)
    }
}

// 用户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub unique_id: String,       // handle
    pub nickname: String,
    pub avatar: String,
    pub signature: String,       // 简介，已去除首尾空白
    pub created: Option<NaiveDate>,
    pub verified: bool,
    pub sec_uid: Option<String>, // 分页拉取视频列表必需
    pub bio_link: Option<String>,
    pub private_account: bool,
    pub under_age_18: bool,
    pub follower_count: u64,
    pub following_count: u64,
    pub heart_count: u64,        // 获赞总数
    pub video_count: u64,
}

// 音乐
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Music {
    pub id: String,
    pub title: String,
    pub play_url: String,
    pub cover_large: String,
    pub cover_thumb: String,
    pub author_name: String,
    pub duration: u64,
    pub original: bool,
    pub album: Option<String>,
}

/// 分页接口返回的一页原始数据
#[derive(Debug, Clone, Default)]
pub struct ItemPage {
    pub items: Vec<Value>,
    pub cursor: PageCursor,
}

/// 服务端下发的游标，不假设任何顺序语义
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCursor {
    pub cursor: String,
    pub has_more: bool,
}
