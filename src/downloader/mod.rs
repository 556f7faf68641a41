use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use crate::common::client::client::TikClient;
use crate::parser::models::Video;
use error::DownloadError;
use models::{BatchReport, ItemOutcome};
use resolver::NoWatermarkResolver;

pub mod error;
pub mod models;
pub mod resolver;

/// 把远程媒体写到本地文件，已有文件会被覆盖
#[async_trait]
pub trait MediaWriter: Send + Sync {
    async fn write_to(&self, url: &str, path: &Path) -> Result<u64, DownloadError>;
}

/// 基于 HTTP 流式下载的写入器
pub struct HttpMediaWriter {
    client: TikClient,
    show_progress: bool,
}

impl HttpMediaWriter {
    pub fn new(client: TikClient, show_progress: bool) -> Self {
        Self {
            client,
            show_progress,
        }
    }

    fn progress_bar(&self, total_size: u64) -> Option<ProgressBar> {
        if !self.show_progress || total_size == 0 {
            return None;
        }

        let pb = ProgressBar::new(total_size);
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
        ) {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }
}

#[async_trait]
impl MediaWriter for HttpMediaWriter {
    async fn write_to(&self, url: &str, path: &Path) -> Result<u64, DownloadError> {
        let response = self.client.get_raw_response(url).await?;
        let pb = self.progress_bar(response.content_length().unwrap_or(0));

        // create 会截断已有文件，重复运行不会追加内容
        let mut file = tokio::fs::File::create(path).await?;

        match stream_body(response, &mut file, pb.as_ref()).await {
            Ok(downloaded) => {
                if let Some(pb) = pb {
                    pb.finish_with_message("下载完成");
                }
                Ok(downloaded)
            }
            Err(e) => {
                if let Some(pb) = pb {
                    pb.finish_with_message("下载失败");
                }
                // 不在最终文件名下留下半截文件
                drop(file);
                if let Err(rm) = tokio::fs::remove_file(path).await {
                    warn!("删除未完成的文件 {} 失败: {}", path.display(), rm);
                }
                Err(e)
            }
        }
    }
}

async fn stream_body(
    response: reqwest::Response,
    file: &mut tokio::fs::File,
    pb: Option<&ProgressBar>,
) -> Result<u64, DownloadError> {
    let mut stream = response.bytes_stream();

    let mut downloaded = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;

        if let Some(pb) = pb {
            pb.set_position(downloaded);
        }
    }
    file.flush().await?;
    Ok(downloaded)
}

pub struct BatchDownloader {
    writer: Arc<dyn MediaWriter>,
    resolver: Arc<dyn NoWatermarkResolver>,
}

impl BatchDownloader {
    pub fn new(writer: Arc<dyn MediaWriter>, resolver: Arc<dyn NoWatermarkResolver>) -> Self {
        Self { writer, resolver }
    }

    /// 逐个下载视频，单个失败只记录在报告里，不中断整批
    pub async fn download_all(
        &self,
        videos: &[Video],
        destination: &Path,
        unwatermarked: bool,
    ) -> Result<BatchReport, DownloadError> {
        prepare_destination(destination).await?;

        let mut report = BatchReport::default();
        for (index, video) in videos.iter().enumerate() {
            info!("[{}/{}] 下载视频 {}", index + 1, videos.len(), video.id);
            let outcome = self.download_one(video, destination, unwatermarked).await;

            match &outcome {
                ItemOutcome::Saved { path, bytes } => {
                    debug!("已保存 {} ({} 字节)", path.display(), bytes)
                }
                ItemOutcome::Skipped(reason) => warn!("跳过视频 {}: {}", video.id, reason),
                ItemOutcome::Failed(reason) => error!("下载视频 {} 失败: {}", video.id, reason),
            }
            report.push(video.id.clone(), outcome);
        }

        Ok(report)
    }

    async fn download_one(&self, video: &Video, destination: &Path, unwatermarked: bool) -> ItemOutcome {
        let url = if unwatermarked {
            match self.resolver.resolve(&video.id).await {
                Ok(url) => url,
                Err(e) if e.is_skippable() => return ItemOutcome::Skipped(e.to_string()),
                Err(e) => return ItemOutcome::Failed(e.to_string()),
            }
        } else {
            video.download_url.clone()
        };

        if url.is_empty() {
            return ItemOutcome::Skipped("没有可用的下载地址".to_string());
        }

        let path = destination.join(video.file_name());
        match self.writer.write_to(&url, &path).await {
            Ok(bytes) => ItemOutcome::Saved { path, bytes },
            Err(e) => ItemOutcome::Failed(e.to_string()),
        }
    }
}

/// 目录不存在时创建；同名的非目录文件视为异常，删除后重建
pub async fn prepare_destination(destination: &Path) -> Result<PathBuf, DownloadError> {
    if destination.as_os_str().is_empty() {
        return Err(DownloadError::InvalidDestination("下载目录不能为空".to_string()));
    }

    match tokio::fs::metadata(destination).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            warn!("下载路径 {} 不是目录，删除后重建", destination.display());
            tokio::fs::remove_file(destination).await?;
            tokio::fs::create_dir_all(destination).await?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("创建下载目录: {}", destination.display());
            tokio::fs::create_dir_all(destination).await?;
        }
        Err(e) => return Err(DownloadError::Io(e)),
    }

    Ok(destination.to_path_buf())
}
