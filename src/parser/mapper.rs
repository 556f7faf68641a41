//! 把结构松散的 JSON 片段映射为 [`Video`]、[`User`]、[`Music`]。
//!
//! 每个字段都有明确的缺省策略：可选的数值缺失或无法转换时取 0，字符串取空，
//! 日期取 `None`。只有结构上必需的 ID 缺失才会返回 [`ParseError::Mapping`]。

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use serde_json::Value;
use tracing::debug;

use super::errors::ParseError;
use super::models::{Music, User, Video};

#[derive(Debug, Clone, Copy)]
pub struct EntityMapper {
    offset: Option<FixedOffset>, // None 时按每个时间戳自身的本地偏移换算
}

impl Default for EntityMapper {
    fn default() -> Self {
        Self::local()
    }
}

impl EntityMapper {
    /// 日期按调用方所在时区换算，夏令时前后分别取当时的偏移
    pub fn local() -> Self {
        Self { offset: None }
    }

    pub fn with_offset(offset: FixedOffset) -> Self {
        Self {
            offset: Some(offset),
        }
    }

    /// 单个视频详情，作者信息从 `UserModule` 中补全为昵称
    pub fn video_with_users(
        &self,
        item: &Value,
        user_module: Option<&Value>,
    ) -> Result<Video, ParseError> {
        let mut video = self.listing_video(item)?;

        let nickname = match item.get("author") {
            Some(Value::Object(_)) => text(item, &["author", "nickname"]),
            _ => user_module
                .and_then(|m| field(m, &["users", video.author.as_str()]))
                .map(|u| text(u, &["nickname"]))
                .unwrap_or_default(),
        };
        if !nickname.is_empty() {
            video.author = nickname;
        }

        Ok(video)
    }

    /// 详情接口里作者直接内嵌在条目中的情况
    pub fn video(&self, item: &Value) -> Result<Video, ParseError> {
        self.video_with_users(item, None)
    }

    /// 列表、话题页里的视频，作者只保留 handle
    pub fn listing_video(&self, item: &Value) -> Result<Video, ParseError> {
        let id = required(item, &["video", "id"], "video.id")?;

        let mut download_url = text(item, &["video", "downloadAddr"]);
        if download_url.is_empty() {
            download_url = text(item, &["video", "playAddr"]);
        }

        let music = match item.get("music") {
            Some(raw) if raw.is_object() => match self.music(raw) {
                Ok(music) => Some(music),
                Err(e) => {
                    debug!("视频 {} 的音乐信息不完整，忽略: {}", id, e);
                    None
                }
            },
            _ => None,
        };

        Ok(Video {
            description: text(item, &["desc"]),
            created: self.date(item, &["createTime"]),
            height: count(item, &["video", "height"]),
            width: count(item, &["video", "width"]),
            duration: count(item, &["video", "duration"]),
            ratio: text(item, &["video", "ratio"]),
            share_count: stat(item, "shareCount"),
            like_count: stat(item, "diggCount"),
            comment_count: stat(item, "commentCount"),
            play_count: stat(item, "playCount"),
            download_url,
            no_watermark_url: None,
            cover: text(item, &["video", "cover"]),
            dynamic_cover: text(item, &["video", "dynamicCover"]),
            format: text(item, &["video", "format"]),
            author: author_handle(item),
            music,
            id,
        })
    }

    /// 用户资料和统计数据分开存放，`stats` 缺失时计数全部为 0
    pub fn user(&self, user: &Value, stats: Option<&Value>) -> Result<User, ParseError> {
        let id = required(user, &["id"], "user.id")?;
        let null = Value::Null;
        let stats = stats.unwrap_or(&null);

        let mut avatar = text(user, &["avatarLarger"]);
        for fallback in ["avatarMedium", "avatarThumb"] {
            if !avatar.is_empty() {
                break;
            }
            avatar = text(user, &[fallback]);
        }

        let heart_count = match field(stats, &["heart"]) {
            Some(_) => count(stats, &["heart"]),
            None => count(stats, &["heartCount"]),
        };

        Ok(User {
            id,
            unique_id: text(user, &["uniqueId"]),
            nickname: text(user, &["nickname"]),
            avatar,
            signature: text(user, &["signature"]).trim().to_string(),
            created: self.date(user, &["createTime"]),
            verified: flag(user, &["verified"]),
            sec_uid: non_empty(text(user, &["secUid"])),
            bio_link: non_empty(text(user, &["bioLink", "link"])),
            private_account: flag(user, &["privateAccount"]),
            under_age_18: flag(user, &["isUnderAge18"]),
            follower_count: count(stats, &["followerCount"]),
            following_count: count(stats, &["followingCount"]),
            heart_count,
            video_count: count(stats, &["videoCount"]),
        })
    }

    pub fn music(&self, music: &Value) -> Result<Music, ParseError> {
        Ok(Music {
            id: required(music, &["id"], "music.id")?,
            title: text(music, &["title"]),
            play_url: text(music, &["playUrl"]),
            cover_large: text(music, &["coverLarge"]),
            cover_thumb: text(music, &["coverThumb"]),
            author_name: text(music, &["authorName"]),
            duration: count(music, &["duration"]),
            original: flag(music, &["original"]),
            album: non_empty(text(music, &["album"])),
        })
    }

    // 秒级时间戳 -> 本地日期，0 视为缺失
    fn date(&self, v: &Value, path: &[&str]) -> Option<NaiveDate> {
        let secs = i64::try_from(count(v, path)).ok().filter(|s| *s > 0)?;
        let utc = DateTime::from_timestamp(secs, 0)?;
        Some(match self.offset {
            Some(offset) => utc.with_timezone(&offset).date_naive(),
            None => utc.with_timezone(&Local).date_naive(),
        })
    }
}

// ---------------------------------------------------------------------------
// 从原始页面状态中挑出片段

/// 取单个视频条目；未给出 ID 时只在状态中恰好有一条视频时才返回
pub fn state_video<'a>(state: &'a Value, id: Option<&str>) -> Result<&'a Value, ParseError> {
    let module = state
        .get("ItemModule")
        .and_then(Value::as_object)
        .ok_or_else(|| ParseError::NotFound("ItemModule".to_string()))?;

    let item = match id {
        Some(id) => module.get(id),
        None if module.len() == 1 => module.values().next(),
        None => None,
    };

    item.ok_or_else(|| ParseError::NotFound(format!("视频 {}", id.unwrap_or("?"))))
}

/// 按 `ItemList` 给出的顺序列出所有视频条目，没有顺序信息时按 `ItemModule` 遍历
///
/// 一个页面可能带多个列表，同一条目只保留第一次出现的位置。
pub fn state_items(state: &Value) -> Vec<&Value> {
    let Some(module) = state.get("ItemModule").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let ordered: Vec<&Value> = state
        .get("ItemList")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|lists| lists.values())
        .filter_map(|list| list.get("list").and_then(Value::as_array))
        .flatten()
        .filter_map(scalar_to_string)
        .filter(|id| seen.insert(id.clone()))
        .filter_map(|id| module.get(&id))
        .collect();

    if ordered.is_empty() {
        module.values().collect()
    } else {
        ordered
    }
}

/// 取用户资料和统计数据，handle 匹配忽略大小写
pub fn state_user<'a>(
    state: &'a Value,
    handle: &str,
) -> Result<(&'a Value, Option<&'a Value>), ParseError> {
    let module = state
        .get("UserModule")
        .ok_or_else(|| ParseError::NotFound("UserModule".to_string()))?;
    let users = module
        .get("users")
        .and_then(Value::as_object)
        .ok_or_else(|| ParseError::NotFound("UserModule.users".to_string()))?;

    let (key, user) = users
        .iter()
        .find(|(key, user)| {
            key.eq_ignore_ascii_case(handle)
                || text(user, &["uniqueId"]).eq_ignore_ascii_case(handle)
        })
        .ok_or_else(|| ParseError::NotFound(format!("用户 {}", handle)))?;

    let stats = field(module, &["stats", key.as_str()]);
    Ok((user, stats))
}

// ---------------------------------------------------------------------------
// 字段读取与类型转换

fn field<'a>(v: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(v, |cur, key| cur.get(*key))
        .filter(|v| !v.is_null())
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text(v: &Value, path: &[&str]) -> String {
    field(v, path).and_then(scalar_to_string).unwrap_or_default()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

fn required(v: &Value, path: &[&str], name: &str) -> Result<String, ParseError> {
    non_empty(text(v, path)).ok_or_else(|| ParseError::Mapping(format!("缺少必需字段 {}", name)))
}

/// 数字或数字字符串，负数和无法解析的值都取 0
fn count(v: &Value, path: &[&str]) -> u64 {
    match field(v, path) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn flag(v: &Value, path: &[&str]) -> bool {
    match field(v, path) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true") || s == "1",
        _ => false,
    }
}

// 新版页面把计数放在字符串形式的 statsV2 里
fn stat(item: &Value, key: &str) -> u64 {
    match field(item, &["stats", key]) {
        Some(_) => count(item, &["stats", key]),
        None => count(item, &["statsV2", key]),
    }
}

fn author_handle(item: &Value) -> String {
    match item.get("author") {
        Some(Value::Object(_)) => text(item, &["author", "uniqueId"]),
        _ => text(item, &["author"]),
    }
}
