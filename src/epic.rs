use crate::client::{ApiNamespace, JiraClient};
use crate::error::Result;
use crate::models::EpicReference;
use serde_json::Value;
use std::collections::HashMap;

/// 行に出力するEpic情報
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpicName {
    pub name: Option<String>,
    pub id: Option<String>,
}

/// Epic名の解決とキャッシュ
///
/// 旧方式のEpic Linkは別リクエストで名前を取得し、キーごとにキャッシュする。
/// キャッシュは実行中に無効化しない。
#[derive(Debug, Default)]
pub struct EpicResolver {
    cache: HashMap<String, String>,
}

impl EpicResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self, epic_key: &str) -> Option<&str> {
        self.cache.get(epic_key).map(String::as_str)
    }

    pub async fn resolve(&mut self, client: &JiraClient, reference: &EpicReference) -> Result<EpicName> {
        match reference {
            EpicReference::Parent { key, summary } => Ok(EpicName {
                name: Some(summary.clone()),
                id: Some(key.clone()),
            }),
            EpicReference::EpicLink(key) => {
                let name = self.epic_name(client, key).await?;
                Ok(EpicName {
                    name: Some(name).filter(|n| !n.is_empty()),
                    id: Some(key.clone()),
                })
            }
            EpicReference::None => Ok(EpicName::default()),
        }
    }

    async fn epic_name(&mut self, client: &JiraClient, epic_key: &str) -> Result<String> {
        if let Some(name) = self.cache.get(epic_key) {
            log::debug!("Epic cache hit: {}", epic_key);
            return Ok(name.clone());
        }

        let path = format!("agile/1.0/epic/{}", urlencoding::encode(epic_key));
        let epic = client.get_json(ApiNamespace::Legacy, &path).await?;
        let name = ["name", "summary"]
            .iter()
            .filter_map(|field| epic.get(*field).and_then(Value::as_str))
            .find(|s| !s.trim().is_empty())
            .unwrap_or_default()
            .to_string();

        log::debug!("Epic cache miss: {} -> {:?}", epic_key, name);
        self.cache.insert(epic_key.to_string(), name.clone());
        Ok(name)
    }
}
