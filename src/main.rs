use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};

use tiktok_scraper::common::client::client::TikClient;
use tiktok_scraper::common::logger::{self, PrettyLogger};
use tiktok_scraper::downloader::{BatchDownloader, HttpMediaWriter};
use tiktok_scraper::{ScraperConfig, Scraper, Video};

mod cli;

use cli::{Command, DownloadArgs};

fn load_config(args: &cli::Cli) -> Result<ScraperConfig> {
    let mut config = match &args.config {
        Some(path) => ScraperConfig::from_file(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?,
        None => ScraperConfig::default(),
    };

    // 命令行参数优先于配置文件
    if let Some(cookie) = &args.cookie {
        config.cookie = Some(cookie.clone());
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(max_pages) = args.max_pages {
        config.max_pages = max_pages;
    }

    Ok(config)
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn handle_videos(scraper: &Scraper, videos: Vec<Video>, args: &DownloadArgs) -> Result<()> {
    if !args.download {
        return print_json(&videos);
    }

    let client = TikClient::for_downloads(scraper.config())?;
    let downloader = BatchDownloader::new(
        Arc::new(HttpMediaWriter::new(client, true)),
        scraper.resolver(),
    );

    info!("开始下载 {} 个视频到 {:?}", videos.len(), args.output_dir);
    let report = downloader
        .download_all(&videos, &args.output_dir, args.no_watermark)
        .await?;
    PrettyLogger::batch_summary(&report);
    Ok(())
}

async fn run(args: cli::Cli) -> Result<()> {
    let config = load_config(&args)?;
    let scraper = Scraper::new(config)?;

    match &args.command {
        Command::Video { url } => print_json(&scraper.video(url).await?),
        Command::User { username } => print_json(&scraper.user(username).await?),
        Command::UserVideos { username, download } => {
            let videos = scraper.user_videos(username).await?;
            handle_videos(&scraper, videos, download).await
        }
        Command::Hashtag { tag, download } => {
            let videos = scraper.hashtag(tag).await?;
            handle_videos(&scraper, videos, download).await
        }
        Command::Music { url } => print_json(&scraper.music(url).await?),
        Command::Resolve { input } => {
            println!("{}", scraper.resolve_no_watermark(input).await?);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    logger::init(args.verbose);

    run(args).await.map_err(|e| {
        error!("执行失败: {:#}", e);
        e
    })
}
