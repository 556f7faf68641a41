use colored::*;

use crate::downloader::models::{BatchReport, ItemOutcome};

/// 初始化 tracing 日志，verbose 时输出 debug 级别
pub fn init(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // 重复初始化时忽略错误
    let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
}

/// 漂亮的日志输出工具
pub struct PrettyLogger;

impl PrettyLogger {
    /// 显示成功消息
    pub fn success(message: impl AsRef<str>) {
        println!("{} {}", "✓".green().bold(), message.as_ref());
    }

    /// 显示警告消息
    pub fn warning(message: impl AsRef<str>) {
        println!("{} {}", "⚠".yellow().bold(), message.as_ref());
    }

    /// 显示错误消息
    pub fn error(message: impl AsRef<str>) {
        println!("{} {}", "✗".red().bold(), message.as_ref());
    }

    /// 显示分割线
    pub fn separator() {
        println!("{}", "─".repeat(50).bright_black());
    }

    /// 显示批量下载的结果
    pub fn batch_summary(report: &BatchReport) {
        Self::separator();
        for item in &report.items {
            match &item.outcome {
                ItemOutcome::Saved { path, .. } => {
                    Self::success(format!("{} -> {}", item.video_id, path.display()))
                }
                ItemOutcome::Skipped(reason) => {
                    Self::warning(format!("{} 已跳过: {}", item.video_id, reason))
                }
                ItemOutcome::Failed(reason) => {
                    Self::error(format!("{} 失败: {}", item.video_id, reason))
                }
            }
        }
        Self::separator();

        let summary = format!(
            "成功 {}，跳过 {}，失败 {}",
            report.saved().len(),
            report.skipped().len(),
            report.failed().len()
        );
        if report.is_complete() {
            println!("{}", summary.green().bold());
        } else {
            println!("{}", summary.yellow().bold());
        }
    }
}
