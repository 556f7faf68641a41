use std::path::PathBuf;

use serde_derive::Serialize;

// 单个视频的下载结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ItemOutcome {
    Saved { path: PathBuf, bytes: u64 },
    Skipped(String), // 跳过，包含原因
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemReport {
    pub video_id: String,
    pub outcome: ItemOutcome,
}

/// 一次批量下载的汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub items: Vec<ItemReport>,
}

impl BatchReport {
    pub fn push(&mut self, video_id: impl Into<String>, outcome: ItemOutcome) {
        self.items.push(ItemReport {
            video_id: video_id.into(),
            outcome,
        });
    }

    pub fn saved(&self) -> Vec<&PathBuf> {
        self.items
            .iter()
            .filter_map(|item| match &item.outcome {
                ItemOutcome::Saved { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn skipped(&self) -> Vec<&str> {
        self.ids_where(|o| matches!(o, ItemOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> Vec<&str> {
        self.ids_where(|o| matches!(o, ItemOutcome::Failed(_)))
    }

    /// 所有条目都保存成功
    pub fn is_complete(&self) -> bool {
        self.items
            .iter()
            .all(|item| matches!(item.outcome, ItemOutcome::Saved { .. }))
    }

    fn ids_where(&self, pred: impl Fn(&ItemOutcome) -> bool) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| pred(&item.outcome))
            .map(|item| item.video_id.as_str())
            .collect()
    }
}
