use crate::client::JiraClient;
use crate::config::ExtractConfig;
use crate::error::Result;

/// 抽出対象のクエリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySource {
    /// サーバーに保存されたフィルターのID
    SavedFilter(String),
    /// フィルター解決を行わない生のJQL
    Jql { jql: String, name: String },
}

impl QuerySource {
    /// フィルター名として設定を引き、なければIDとみなす
    pub fn from_identifier(identifier: &str, config: &ExtractConfig) -> Self {
        let id = config
            .find_filter_id(identifier)
            .unwrap_or_else(|| identifier.trim().to_string());
        QuerySource::SavedFilter(id)
    }

    pub fn jql(jql: impl Into<String>, name: impl Into<String>) -> Self {
        QuerySource::Jql {
            jql: jql.into(),
            name: name.into(),
        }
    }
}

/// 実行するJQLと出力先のグループ名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuery {
    pub jql: String,
    pub display_name: String,
}

impl ResolvedQuery {
    pub async fn resolve(client: &JiraClient, source: &QuerySource) -> Result<Self> {
        match source {
            QuerySource::SavedFilter(id) => {
                let filter = client.get_filter(id).await?;
                Ok(Self {
                    display_name: filter.display_name(),
                    jql: filter.jql,
                })
            }
            QuerySource::Jql { jql, name } => Ok(Self {
                jql: jql.clone(),
                display_name: name.clone(),
            }),
        }
    }
}
