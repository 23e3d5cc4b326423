use serde::{Deserialize, Serialize};

/// サーバーに保存されたフィルター（JQLと表示名）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedFilter {
    pub id: String,
    pub name: String,
    pub jql: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SavedFilter {
    /// 出力先のグループ名として使う表示名
    ///
    /// 説明が空でなければ説明、次にフィルター名、どちらも空ならIDを使う。
    pub fn display_name(&self) -> String {
        [self.description.as_deref(), Some(self.name.as_str())]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or(&self.id)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_deserialization() {
        let json_data = json!({
            "self": "https://example.atlassian.net/rest/api/3/filter/10000",
            "id": "10000",
            "name": "Work done",
            "description": "  Team tickets  ",
            "jql": "project = ABC ORDER BY created",
            "favourite": true
        });

        let filter: SavedFilter = serde_json::from_value(json_data).unwrap();

        assert_eq!(filter.id, "10000");
        assert_eq!(filter.jql, "project = ABC ORDER BY created");
        assert_eq!(filter.display_name(), "Team tickets");
    }

    #[test]
    fn test_display_name_falls_back_to_name_then_id() {
        let mut filter = SavedFilter {
            id: "10000".to_string(),
            name: "Work done".to_string(),
            jql: "project = ABC".to_string(),
            description: Some("   ".to_string()),
        };
        assert_eq!(filter.display_name(), "Work done");

        filter.name = String::new();
        filter.description = None;
        assert_eq!(filter.display_name(), "10000");
    }
}
