use super::RawIssue;
use serde::{Deserialize, Serialize};

/// 検索APIの1ページ分のレスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(rename = "startAt")]
    pub start_at: u32,

    #[serde(rename = "maxResults")]
    pub max_results: u32,

    pub total: u32,

    #[serde(default)]
    pub issues: Vec<RawIssue>,
}
