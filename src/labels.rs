use std::collections::HashMap;

pub const UNKNOWN_CATEGORY_KEY: &str = "_unknown_";
pub const DEFAULT_UNKNOWN_CATEGORY: &str = "Unknown";

/// ラベルからチームとカテゴリを求める
pub trait TeamCategoryResolver: Send + Sync {
    /// 一致するチームがなければ空文字
    fn find_team(&self, labels: &[String]) -> String;

    /// 一致するカテゴリがなければ既定のカテゴリ
    fn find_category(&self, labels: &[String]) -> String;
}

/// 設定から作られる大文字小文字を区別しない対応表
#[derive(Debug, Clone, Default)]
pub struct LabelLookup {
    teams: HashMap<String, String>,
    categories: HashMap<String, String>,
}

impl LabelLookup {
    pub fn new<T, C>(teams: T, categories: C) -> Self
    where
        T: IntoIterator<Item = (String, String)>,
        C: IntoIterator<Item = (String, String)>,
    {
        Self {
            teams: teams.into_iter().map(|(k, v)| (fold(&k), v)).collect(),
            categories: categories.into_iter().map(|(k, v)| (fold(&k), v)).collect(),
        }
    }

    fn unknown_category(&self) -> String {
        self.categories
            .get(UNKNOWN_CATEGORY_KEY)
            .cloned()
            .unwrap_or_else(|| DEFAULT_UNKNOWN_CATEGORY.to_string())
    }
}

impl TeamCategoryResolver for LabelLookup {
    fn find_team(&self, labels: &[String]) -> String {
        labels
            .iter()
            .find_map(|label| self.teams.get(&fold(label)))
            .cloned()
            .unwrap_or_default()
    }

    fn find_category(&self, labels: &[String]) -> String {
        labels
            .iter()
            .find_map(|label| self.categories.get(&fold(label)))
            .cloned()
            .unwrap_or_else(|| self.unknown_category())
    }
}

fn fold(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Issueキーのプロジェクト部分（最初の `-` より前、小文字）
pub fn project_key(issue_key: &str) -> String {
    let prefix = issue_key.split('-').next().unwrap_or(issue_key);
    fold(prefix)
}

/// ラベルでチームを探し、見つからなければプロジェクトキーで再試行する
///
/// それでも見つからない場合は空文字を返す（抽出は中断しない）。
pub fn resolve_team(resolver: &dyn TeamCategoryResolver, issue_key: &str, labels: &[String]) -> String {
    let team = resolver.find_team(labels);
    if !team.is_empty() {
        return team;
    }

    let team = resolver.find_team(&[project_key(issue_key)]);
    if team.is_empty() {
        log::warn!("** Team Not Found [{}, {:?}]", issue_key, labels);
    }
    team
}
