use lazy_static::lazy_static;
use scraper::{Html, Selector};

use super::errors::ParseError;

pub const STATE_SCRIPT_ID: &str = "SIGI_STATE";

lazy_static! {
    static ref STATE_SELECTOR: Selector =
        Selector::parse(&format!("script#{}", STATE_SCRIPT_ID)).expect("状态节点选择器无效");
}

/// 返回页面内嵌状态节点的原始文本，不校验内容是否为合法 JSON
pub fn extract_state(html: &str) -> Result<String, ParseError> {
    let document = Html::parse_document(html);

    document
        .select(&STATE_SELECTOR)
        .next()
        .map(|script| script.text().collect::<String>())
        .ok_or_else(|| ParseError::MarkerNotFound(STATE_SCRIPT_ID.to_string()))
}
