use crate::client::JiraClient;
use crate::error::Result;
use std::collections::HashMap;

/// ステータスID → ステータス名の対応表
///
/// 初回使用時に一度だけステータス一覧を取得し、以降は再取得しない。
/// パイプラインごとに所有されるため、実行間で状態は共有されない。
#[derive(Debug, Default)]
pub struct StatusDirectory {
    names: Option<HashMap<String, String>>,
}

impl StatusDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既知のID→名前の対応から作成（取得済みとして扱う）
    pub fn from_names<I, K, V>(names: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            names: Some(names.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.names.is_some()
    }

    /// 未取得であればステータス一覧を取得する
    ///
    /// 取得に失敗した場合はエラーをそのまま返す（縮退動作はない）。
    pub async fn ensure_loaded(&mut self, client: &JiraClient) -> Result<()> {
        if self.names.is_none() {
            let statuses = client.get_statuses().await?;
            log::debug!("Loaded {} workflow statuses", statuses.len());
            self.names = Some(statuses.into_iter().map(|s| (s.id, s.name)).collect());
        }
        Ok(())
    }

    /// 取得済みの対応表からステータス名を引く
    pub fn lookup(&self, status_id: &str) -> Option<&str> {
        self.names.as_ref()?.get(status_id).map(String::as_str)
    }

    /// ステータス名を返す（必要なら初回取得を行う）
    pub async fn name_for(&mut self, client: &JiraClient, status_id: &str) -> Result<Option<String>> {
        self.ensure_loaded(client).await?;
        Ok(self.lookup(status_id).map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Auth, JiraConfig};
    use crate::error::Error;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mock_client(uri: String) -> JiraClient {
        let config = JiraConfig::new(
            uri,
            Auth::Basic {
                username: "test@example.com".to_string(),
                api_token: "test_token".to_string(),
            },
        )
        .unwrap();
        JiraClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_statuses_loaded_once() {
        // Given: ステータス一覧を1回だけ返すモック
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "3", "name": "To Do" },
                { "id": "10000", "name": "In Progress" }
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = mock_client(mock_server.uri());
        let mut directory = StatusDirectory::new();

        // When: 複数回問い合わせる
        let to_do = directory.name_for(&client, "3").await.unwrap();
        let in_progress = directory.name_for(&client, "10000").await.unwrap();
        let unknown = directory.name_for(&client, "42").await.unwrap();

        // Then: 取得は1回のみで、未知のIDはNone
        assert_eq!(to_do.as_deref(), Some("To Do"));
        assert_eq!(in_progress.as_deref(), Some("In Progress"));
        assert_eq!(unknown, None);
        assert!(directory.is_loaded());
    }

    #[tokio::test]
    async fn test_load_failure_propagates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/status"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = mock_client(mock_server.uri());
        let mut directory = StatusDirectory::new();

        let result = directory.name_for(&client, "3").await;

        assert!(matches!(result, Err(Error::RequestFailed { status: 500, .. })));
        assert!(!directory.is_loaded());
    }

    #[test]
    fn test_lookup_before_load_is_none() {
        let directory = StatusDirectory::new();
        assert_eq!(directory.lookup("3"), None);

        let directory = StatusDirectory::from_names([("3", "To Do")]);
        assert_eq!(directory.lookup("3"), Some("To Do"));
    }
}
