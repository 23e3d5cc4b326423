use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 検索結果に含まれるIssue（フィールドは未加工のJSON）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIssue {
    #[serde(default)]
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// カスタムフィールドIDの対応表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    /// チーム管理プロジェクトのストーリーポイント
    pub story_points: String,
    /// 企業管理プロジェクトのストーリーポイント
    pub story_points_legacy: String,
    /// 旧方式のEpic Link
    pub epic_link: String,
    /// Time in Status アドオンのエンコード値
    pub time_in_status: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            story_points: "customfield_10016".to_string(),
            story_points_legacy: "customfield_10024".to_string(),
            epic_link: "customfield_10014".to_string(),
            time_in_status: "customfield_10023".to_string(),
        }
    }
}

impl FieldMapping {
    /// 検索時に要求するフィールド一覧
    pub fn search_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = [
            "summary",
            "status",
            "created",
            "resolutiondate",
            "labels",
            "issuetype",
            "parent",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        fields.push(self.story_points.clone());
        fields.push(self.story_points_legacy.clone());
        fields.push(self.epic_link.clone());
        fields.push(self.time_in_status.clone());
        fields
    }
}

/// Epicへの参照
#[derive(Debug, Clone, PartialEq)]
pub enum EpicReference {
    /// 親Issueが埋め込まれている（追加のリクエスト不要）
    Parent { key: String, summary: String },
    /// Epic Linkのキーのみ（名前は別途取得）
    EpicLink(String),
    None,
}

/// 正規化済みのIssue
///
/// 欠落・null・空文字のフィールドはすべて `None` に揃えてある。
#[derive(Debug, Clone, PartialEq)]
pub struct IssueRecord {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub labels: Vec<String>,
    pub issue_type: String,
    pub created: DateTime<FixedOffset>,
    pub resolved: Option<DateTime<FixedOffset>>,
    pub epic: EpicReference,
    pub time_in_status: Option<String>,
    pub story_points: Option<f64>,
}

impl IssueRecord {
    pub fn from_raw(raw: &RawIssue, mapping: &FieldMapping) -> Result<Self> {
        let fields = &raw.fields;

        let created = present(fields, "created")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidData(format!("{}: missing created timestamp", raw.key)))?;
        let created = parse_jira_timestamp(created)?;

        let resolved = present(fields, "resolutiondate")
            .and_then(Value::as_str)
            .map(parse_jira_timestamp)
            .transpose()?;

        let labels = present(fields, "labels")
            .and_then(Value::as_array)
            .map(|labels| {
                labels
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let story_points = number(present(fields, &mapping.story_points))
            .or_else(|| number(present(fields, &mapping.story_points_legacy)));

        Ok(Self {
            key: raw.key.clone(),
            summary: text(present(fields, "summary")).unwrap_or_default(),
            status: nested_name(fields, "status").unwrap_or_default(),
            labels,
            issue_type: nested_name(fields, "issuetype").unwrap_or_default(),
            created,
            resolved,
            epic: epic_reference(fields, mapping),
            time_in_status: text(present(fields, &mapping.time_in_status)),
            story_points,
        })
    }
}

/// 欠落・null・空文字を区別せず `None` にする
fn present<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    match fields.get(name)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        value => Some(value),
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn nested_name(fields: &Map<String, Value>, name: &str) -> Option<String> {
    text(present(fields, name)?.get("name"))
}

fn epic_reference(fields: &Map<String, Value>, mapping: &FieldMapping) -> EpicReference {
    if let Some(parent) = present(fields, "parent") {
        let key = parent.get("key").and_then(Value::as_str);
        let summary = parent
            .get("fields")
            .and_then(|f| f.get("summary"))
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty());
        if let (Some(key), Some(summary)) = (key, summary) {
            return EpicReference::Parent {
                key: key.to_string(),
                summary: summary.to_string(),
            };
        }
    }

    match text(present(fields, &mapping.epic_link)) {
        Some(key) => EpicReference::EpicLink(key),
        None => EpicReference::None,
    }
}

/// Jiraのタイムスタンプをパース
///
/// 形式: "2019-03-25T15:26:30.000+0000"（RFC3339形式も受け付ける）
pub fn parse_jira_timestamp(s: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .map_err(|e| Error::InvalidData(format!("Invalid timestamp '{}': {}", s, e)))
}
