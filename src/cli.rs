use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tkdl")]
#[command(about = "TikTok 视频、用户、音乐信息抓取工具")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// 配置文件 (JSON，可选)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Cookie字符串 (可选)
    #[arg(long, value_name = "COOKIE", global = true)]
    #[arg(help = "手动指定Cookie，原样发送")]
    pub cookie: Option<String>,

    /// 单次请求超时秒数
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// 分页上限
    #[arg(long, value_name = "N", global = true)]
    pub max_pages: Option<usize>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 获取单个视频信息
    Video { url: String },

    /// 获取用户资料
    User { username: String },

    /// 获取用户的全部作品
    UserVideos {
        username: String,
        #[command(flatten)]
        download: DownloadArgs,
    },

    /// 获取话题下的视频
    Hashtag {
        tag: String,
        #[command(flatten)]
        download: DownloadArgs,
    },

    /// 获取视频使用的音乐
    Music { url: String },

    /// 解析无水印下载地址
    Resolve {
        #[arg(help = "视频ID或页面地址")]
        input: String,
    },
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// 下载视频文件
    #[arg(long)]
    pub download: bool,

    /// 下载无水印版本
    #[arg(long)]
    pub no_watermark: bool,

    /// 输出目录
    #[arg(short, long, value_name = "DIR", default_value = "./downloads")]
    pub output_dir: PathBuf,
}
