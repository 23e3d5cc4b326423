use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::row::{ColumnSet, DerivedRow};

/// 抽出結果の書き出し先の抽象化トレイト
#[async_trait]
pub trait TabularSink: Send + Sync {
    /// 行を書き出し、作成したファイルのパスを返す
    async fn write_rows(&self, query_name: &str, columns: ColumnSet, rows: &[DerivedRow]) -> Result<PathBuf>;
}

/// `{root}/{クエリ名}/{YYYY-MM}/{DD}_tickets.csv` に書き出すCSVシンク
pub struct CsvSink {
    root: PathBuf,
    date: Option<NaiveDate>,
}

impl CsvSink {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            date: None,
        }
    }

    /// 出力日を固定する（未指定なら実行日）
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn output_path(&self, query_name: &str) -> PathBuf {
        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        output_path(&self.root, query_name, date)
    }
}

#[async_trait]
impl TabularSink for CsvSink {
    async fn write_rows(&self, query_name: &str, columns: ColumnSet, rows: &[DerivedRow]) -> Result<PathBuf> {
        let path = self.output_path(query_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut contents = csv_line(columns.columns().iter().copied());
        for row in rows {
            contents.push_str(&csv_line(row.to_record(columns).iter().map(String::as_str)));
        }

        let mut file = fs::File::create(&path).await?;
        file.write_all(contents.as_bytes()).await?;
        file.sync_all().await?;

        log::info!("Extracted {} tickets to \"{}\"", rows.len(), path.display());
        Ok(path)
    }
}

/// パスに使えない文字を置き換える
pub fn sanitize_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        sanitized
    }
}

pub fn output_path(root: &Path, query_name: &str, date: NaiveDate) -> PathBuf {
    root.join(sanitize_name(query_name))
        .join(date.format("%Y-%m").to_string())
        .join(format!("{}_tickets.csv", date.format("%d")))
}

fn csv_line<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    let mut line = fields.map(escape_field).collect::<Vec<_>>().join(",");
    line.push_str("\r\n");
    line
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_in_status::TimeInStatus;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    fn row(key: &str, summary: &str) -> DerivedRow {
        DerivedRow {
            key: key.to_string(),
            summary: summary.to_string(),
            category: "BAU".to_string(),
            team: "My team".to_string(),
            status: "Done".to_string(),
            created: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            resolved: NaiveDate::from_ymd_opt(2024, 3, 5),
            epic_name: None,
            epic_id: None,
            issue_type: "Bug".to_string(),
            story_points: Some(2.0),
            lead_time_ms: Some(345_600_000),
            time_in_status: TimeInStatus::default(),
            lead_days: Some(4.0),
            cycle_days: None,
        }
    }

    #[test]
    fn test_output_path_layout() {
        let path = output_path(Path::new("data"), "Team A/B tickets", date());

        assert_eq!(path, PathBuf::from("data/Team A_B tickets/2024-03/07_tickets.csv"));
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_name("  Work done  "), "Work done");
        assert_eq!(sanitize_name(".."), "_");
        assert_eq!(sanitize_name(""), "_");
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a, b"), "\"a, b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[tokio::test]
    async fn test_write_rows_creates_directories() {
        // Given: 空の出力ディレクトリ
        let temp_dir = TempDir::new().unwrap();
        let sink = CsvSink::new(temp_dir.path().join("data")).with_date(date());
        let rows = vec![row("ABC-1", "Fix login"), row("ABC-2", "Handle \"quotes\", commas")];

        // When: 行を書き出す
        let path = sink.write_rows("Work/done", ColumnSet::Summary, &rows).await.unwrap();

        // Then: 決まったパスにヘッダーと行が書かれる
        assert_eq!(path, temp_dir.path().join("data/Work_done/2024-03/07_tickets.csv"));
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Key,Summary,Category,Team,Status,Created,Resolved,Epic,Epic ID");
        assert_eq!(lines[1], "ABC-1,Fix login,BAU,My team,Done,2024-03-01,2024-03-05,,");
        assert_eq!(
            lines[2],
            "ABC-2,\"Handle \"\"quotes\"\", commas\",BAU,My team,Done,2024-03-01,2024-03-05,,"
        );
    }

    #[tokio::test]
    async fn test_write_rows_detail_header() {
        let temp_dir = TempDir::new().unwrap();
        let sink = CsvSink::new(temp_dir.path()).with_date(date());

        let path = sink.write_rows("detail", ColumnSet::Detail, &[row("ABC-1", "x")]).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let header = contents.lines().next().unwrap();
        assert_eq!(header, ColumnSet::Detail.columns().join(","));
        assert!(contents.lines().nth(1).unwrap().ends_with(",4,"));
    }
}
