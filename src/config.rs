use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::client::{Auth, JiraConfig};
use crate::error::{Error, Result};
use crate::labels::LabelLookup;
use crate::models::FieldMapping;

pub const DEFAULT_CONFIG_FILE: &str = "jira_conf.yaml";
pub const DEFAULT_PAGE_SIZE: u32 = 999;
const MIN_PAGE_SIZE: u32 = 100;

/// `jira_conf.yaml` の内容
///
/// ```yaml
/// jira:
///   url: https://your-domain.atlassian.net/
///   user: me@example.com
///   token: my-api-token
/// team:
///   team1: My team
/// category:
///   bau: BAU, darkviolet
///   _unknown_: Unknown, firebrick
/// filter:
///   work_done: 12345
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default)]
    pub jira: Option<JiraSection>,

    /// ラベル → チーム名
    #[serde(default)]
    pub team: IndexMap<String, String>,

    /// ラベル → "カテゴリ名, 色"
    #[serde(default)]
    pub category: IndexMap<String, String>,

    /// フィルター名 → フィルターID（先頭が既定のフィルター）
    #[serde(default)]
    pub filter: IndexMap<String, FilterId>,

    #[serde(default)]
    pub fields: FieldMapping,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraSection {
    pub url: String,
    pub user: String,
    pub token: String,
}

/// 数値でも文字列でも書けるフィルターID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterId {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for FilterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterId::Number(id) => write!(f, "{}", id),
            FilterId::Text(id) => write!(f, "{}", id),
        }
    }
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}

impl ExtractConfig {
    /// 設定ファイルを読み込む
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).await.map_err(|e| {
            Error::ConfigurationMissing(format!("{}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(MIN_PAGE_SIZE..=DEFAULT_PAGE_SIZE).contains(&self.page_size) {
            return Err(Error::InvalidConfiguration(format!(
                "page_size must be between {} and {}, got {}",
                MIN_PAGE_SIZE, DEFAULT_PAGE_SIZE, self.page_size
            )));
        }
        for (label, value) in &self.category {
            if split_category(value).0.is_empty() {
                return Err(Error::InvalidConfiguration(format!(
                    "category '{}' has no name",
                    label
                )));
            }
        }
        Ok(())
    }

    /// 接続設定（ファイルに記載された認証情報）
    pub fn jira_config(&self) -> Result<JiraConfig> {
        let jira = self
            .jira
            .as_ref()
            .ok_or_else(|| Error::ConfigurationMissing("jira section not found".to_string()))?;

        JiraConfig::new(
            jira.url.clone(),
            Auth::Basic {
                username: jira.user.clone(),
                api_token: jira.token.clone(),
            },
        )
    }

    pub fn find_filter_id(&self, name: &str) -> Option<String> {
        self.filter.get(name).map(FilterId::to_string)
    }

    pub fn first_filter_id(&self) -> Option<String> {
        self.filter.values().next().map(FilterId::to_string)
    }

    /// 設定されたチーム名（重複なし、記載順）
    pub fn teams(&self) -> Vec<String> {
        let mut teams: Vec<String> = Vec::new();
        for team in self.team.values() {
            if !teams.contains(team) {
                teams.push(team.clone());
            }
        }
        teams
    }

    /// カテゴリ名 → 色
    pub fn category_colours(&self) -> IndexMap<String, String> {
        self.category
            .values()
            .filter_map(|value| match split_category(value) {
                (name, Some(colour)) => Some((name.to_string(), colour.to_string())),
                (_, None) => None,
            })
            .collect()
    }

    pub fn label_lookup(&self) -> LabelLookup {
        LabelLookup::new(
            self.team.iter().map(|(k, v)| (k.clone(), v.clone())),
            self.category
                .iter()
                .map(|(k, v)| (k.clone(), split_category(v).0.to_string())),
        )
    }
}

fn split_category(value: &str) -> (&str, Option<&str>) {
    match value.split_once(',') {
        Some((name, colour)) => (name.trim(), Some(colour.trim()).filter(|c| !c.is_empty())),
        None => (value.trim(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::TeamCategoryResolver;
    use tempfile::TempDir;

    const TEST_CONF: &str = r#"
jira:
  url: https://your-domain.atlassian.net/
  user: me@example.com
  token: my-api-token
team:
  team1: My team
  team2: My team
  bau: Another team
category:
  project: Project, peru
  improvement: Product, royalblue
  bau: BAU, darkviolet
  _unknown_: Unknown, firebrick
filter:
  work_done: 12345
  backlog: "67890"
"#;

    fn config() -> ExtractConfig {
        ExtractConfig::from_yaml_str(TEST_CONF).unwrap()
    }

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_base_url_and_auth_values() {
        let jira = config().jira_config().unwrap();

        assert_eq!(jira.base_url, "https://your-domain.atlassian.net");
        match jira.auth {
            Auth::Basic { username, api_token } => {
                assert_eq!(username, "me@example.com");
                assert_eq!(api_token, "my-api-token");
            }
            _ => panic!("Expected Basic auth"),
        }
    }

    #[test]
    fn test_filters() {
        let config = config();

        assert_eq!(config.find_filter_id("work_done").as_deref(), Some("12345"));
        assert_eq!(config.find_filter_id("backlog").as_deref(), Some("67890"));
        assert_eq!(config.find_filter_id("missing"), None);
        assert_eq!(config.first_filter_id().as_deref(), Some("12345"));
    }

    #[test]
    fn test_no_duplicate_teams_returned() {
        assert_eq!(config().teams(), vec!["My team".to_string(), "Another team".to_string()]);
    }

    #[test]
    fn test_category_colours() {
        let colours = config().category_colours();

        assert_eq!(colours.get("BAU").map(String::as_str), Some("darkviolet"));
        assert!(colours.get("Unknown").is_some());
    }

    #[test]
    fn test_label_lookup_from_config() {
        let lookup = config().label_lookup();

        assert_eq!(lookup.find_team(&labels(&["Team1", "product"])), "My team");
        assert_eq!(lookup.find_category(&labels(&["bau", "team2"])), "BAU");
        assert_eq!(lookup.find_category(&labels(&["QA"])), "Unknown");
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = ExtractConfig::from_yaml_str("team: {}\n").unwrap();

        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.output_dir, PathBuf::from("data"));
        assert_eq!(config.fields, FieldMapping::default());
        assert!(config.first_filter_id().is_none());
        assert!(matches!(config.jira_config(), Err(Error::ConfigurationMissing(_))));
    }

    #[test]
    fn test_custom_fields_override() {
        let config = ExtractConfig::from_yaml_str("fields:\n  time_in_status: customfield_20000\n").unwrap();

        assert_eq!(config.fields.time_in_status, "customfield_20000");
        assert_eq!(config.fields.story_points, FieldMapping::default().story_points);
    }

    #[test]
    fn test_invalid_page_size_rejected() {
        let result = ExtractConfig::from_yaml_str("page_size: 5000\n");

        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, TEST_CONF).unwrap();

        let config = ExtractConfig::load(&path).await.unwrap();
        assert_eq!(config.team.len(), 3);

        let missing = ExtractConfig::load(temp_dir.path().join("nope.yaml")).await;
        assert!(matches!(missing, Err(Error::ConfigurationMissing(_))));
    }
}
