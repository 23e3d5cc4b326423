use crate::error::{Error, Result};
use crate::models::{SavedFilter, SearchPage, Status};
use base64::Engine;
use reqwest::{Client, header};
use serde_json::Value;
use std::sync::Arc;
use url::Url;

#[derive(Debug, Clone)]
pub enum Auth {
    Basic { username: String, api_token: String },
}

#[derive(Debug, Clone)]
pub struct JiraConfig {
    pub base_url: String,
    pub auth: Auth,
}

impl JiraConfig {
    pub fn new(base_url: impl Into<String>, auth: Auth) -> Result<Self> {
        let base_url = base_url.into();

        // Validate URL
        let _ = Url::parse(&base_url)
            .map_err(|_| Error::InvalidConfiguration("Invalid base URL".to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn from_env() -> Result<Self> {
        use std::env;

        let base_url = env::var("JIRA_URL")
            .map_err(|_| Error::ConfigurationMissing("JIRA_URL not found in environment".to_string()))?;

        let username = env::var("JIRA_USER")
            .map_err(|_| Error::ConfigurationMissing("JIRA_USER not found in environment".to_string()))?;

        let api_token = env::var("JIRA_API_TOKEN")
            .map_err(|_| Error::ConfigurationMissing("JIRA_API_TOKEN not found in environment".to_string()))?;

        let auth = Auth::Basic { username, api_token };

        Self::new(base_url, auth)
    }
}

/// REST APIの名前空間
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiNamespace {
    /// `{base_url}/rest/{path}` (agileなどのレガシーAPI)
    Legacy,
    /// `{base_url}/rest/api/2/{path}`
    V2,
    /// `{base_url}/rest/api/3/{path}`
    V3,
}

impl ApiNamespace {
    /// ベースURLとパスからリクエストURLを組み立てる
    pub fn url(&self, base_url: &str, path_and_query: &str) -> String {
        let path = path_and_query.trim_start_matches('/');
        match self {
            ApiNamespace::Legacy => format!("{}/rest/{}", base_url, path),
            ApiNamespace::V2 => format!("{}/rest/api/2/{}", base_url, path),
            ApiNamespace::V3 => format!("{}/rest/api/3/{}", base_url, path),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JiraClient {
    pub(crate) client: Client,
    pub(crate) config: Arc<JiraConfig>,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        // 認証ヘッダーを追加
        let auth_value = match &config.auth {
            Auth::Basic { username, api_token } => {
                let credentials = format!("{}:{}", username, api_token);
                let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());
                format!("Basic {}", encoded)
            }
        };
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_value)
                .map_err(|_| Error::InvalidConfiguration("Invalid auth header".to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::InvalidConfiguration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    /// 指定した名前空間にGETリクエストを送り、JSONボディを返す
    ///
    /// 2xx以外のレスポンスは `Error::RequestFailed` として返す。リトライはしない。
    pub async fn get_json(&self, namespace: ApiNamespace, path_and_query: &str) -> Result<Value> {
        self.get(namespace, path_and_query).await
    }

    pub(crate) async fn get<T>(&self, namespace: ApiNamespace, path_and_query: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = namespace.url(&self.config.base_url, path_and_query);
        log::debug!("GET {}", url);

        let response = self.client
            .get(&url)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::RequestFailed { status, body });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// 全ワークフローステータスを取得
    pub async fn get_statuses(&self) -> Result<Vec<Status>> {
        self.get(ApiNamespace::V3, "status").await
    }

    /// 保存済みフィルターを取得
    pub async fn get_filter(&self, filter_id: &str) -> Result<SavedFilter> {
        let path = format!("filter/{}", urlencoding::encode(filter_id));
        self.get(ApiNamespace::V3, &path).await
    }

    /// JQLで1ページ分のIssueを検索
    pub async fn search(&self, jql: &str, start_at: u32, max_results: u32, fields: &[String]) -> Result<SearchPage> {
        let mut path = format!(
            "search?jql={}&startAt={}&maxResults={}",
            urlencoding::encode(jql),
            start_at,
            max_results
        );
        if !fields.is_empty() {
            path.push_str("&fields=");
            path.push_str(&urlencoding::encode(&fields.join(",")));
        }

        self.get(ApiNamespace::V3, &path).await
    }
}
