pub mod browser;
pub mod common;
pub mod downloader;
pub mod parser;

pub use common::config::ScraperConfig;
pub use downloader::BatchDownloader;
pub use parser::Scraper;
pub use parser::errors::ParseError;
pub use parser::models::{Music, User, Video};
