use std::path::PathBuf;

use crate::client::JiraClient;
use crate::config::{DEFAULT_PAGE_SIZE, ExtractConfig};
use crate::epic::EpicResolver;
use crate::error::{Error, Result};
use crate::labels::{TeamCategoryResolver, resolve_team};
use crate::models::{FieldMapping, IssueRecord, RawIssue, SearchPage};
use crate::query::{QuerySource, ResolvedQuery};
use crate::row::{ColumnSet, DerivedRow};
use crate::sink::TabularSink;
use crate::status_directory::StatusDirectory;
use crate::time_in_status::{TimeInStatus, TrackedStatus, millis_to_days};

/// 抽出処理の設定
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// 1ページあたりの要求件数（サーバーが縮小する場合がある）
    pub page_size: u32,
    pub fields: FieldMapping,
    pub tracked_statuses: Vec<TrackedStatus>,
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            fields: FieldMapping::default(),
            tracked_statuses: TrackedStatus::ALL.to_vec(),
        }
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn fields(mut self, fields: FieldMapping) -> Self {
        self.fields = fields;
        self
    }

    pub fn tracked_statuses(mut self, statuses: Vec<TrackedStatus>) -> Self {
        self.tracked_statuses = statuses;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// ページングの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Paging { start_at: u32 },
    Done,
}

impl PageState {
    /// 受信したページから次の状態を決める
    ///
    /// `startAt + maxResults >= total` で終了。終了条件を満たさないのに
    /// 位置が進まない場合はプロトコル違反としてエラーにする。
    pub fn next(requested_start_at: u32, page: &SearchPage) -> Result<Self> {
        let next_start = page.start_at as u64 + page.max_results as u64;
        if next_start >= page.total as u64 {
            return Ok(PageState::Done);
        }

        if page.max_results == 0 || next_start <= requested_start_at as u64 {
            return Err(Error::PaginationStalled {
                start_at: page.start_at,
                total: page.total,
            });
        }

        Ok(PageState::Paging {
            start_at: next_start as u32,
        })
    }
}

/// 検索結果を取得して出力行に変換するパイプライン
///
/// ステータス一覧とEpic名のキャッシュはインスタンスごとに持ち、
/// 実行をまたいで共有しない。ページは1つずつ順に取得・処理する。
pub struct ExtractionPipeline {
    client: JiraClient,
    resolver: Box<dyn TeamCategoryResolver>,
    options: ExtractOptions,
    statuses: StatusDirectory,
    epics: EpicResolver,
}

impl ExtractionPipeline {
    pub fn new<R>(client: JiraClient, resolver: R, options: ExtractOptions) -> Self
    where
        R: TeamCategoryResolver + 'static,
    {
        Self {
            client,
            resolver: Box::new(resolver),
            options,
            statuses: StatusDirectory::new(),
            epics: EpicResolver::new(),
        }
    }

    pub fn from_config(client: JiraClient, config: &ExtractConfig) -> Self {
        let options = ExtractOptions::new()
            .page_size(config.page_size)
            .fields(config.fields.clone());
        Self::new(client, config.label_lookup(), options)
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub fn status_directory(&self) -> &StatusDirectory {
        &self.statuses
    }

    pub fn epic_resolver(&self) -> &EpicResolver {
        &self.epics
    }

    /// JQLの検索結果を全ページ取得して行に変換する
    pub async fn extract(&mut self, jql: &str) -> Result<Vec<DerivedRow>> {
        let fields = self.options.fields.search_fields();
        let mut rows = Vec::new();
        let mut state = PageState::Paging { start_at: 0 };

        while let PageState::Paging { start_at } = state {
            let page = self
                .client
                .search(jql, start_at, self.options.page_size, &fields)
                .await?;
            log::info!(
                "Fetched {} issues (startAt={}, total={})",
                page.issues.len(),
                page.start_at,
                page.total
            );

            for issue in &page.issues {
                rows.push(self.derive_row(issue).await?);
            }

            state = PageState::next(start_at, &page)?;
        }

        Ok(rows)
    }

    /// 1件のIssueを出力行に変換する
    pub async fn derive_row(&mut self, issue: &RawIssue) -> Result<DerivedRow> {
        let record = IssueRecord::from_raw(issue, &self.options.fields)?;

        let category = self.resolver.find_category(&record.labels);
        let team = resolve_team(self.resolver.as_ref(), &record.key, &record.labels);

        if record.time_in_status.is_some() {
            self.statuses.ensure_loaded(&self.client).await?;
        }
        let time_in_status = TimeInStatus::decode(
            record.time_in_status.as_deref(),
            &self.statuses,
            &self.options.tracked_statuses,
        )?;

        let epic = self.epics.resolve(&self.client, &record.epic).await?;

        // リードタイムは丸めた日付ではなくタイムスタンプの差から求める
        let lead_time_ms = record
            .resolved
            .map(|resolved| (resolved - record.created).num_milliseconds());
        let cycle_days = match (lead_time_ms, time_in_status.millis(TrackedStatus::ToDo)) {
            (Some(lead), Some(to_do)) => Some(millis_to_days(lead - to_do)),
            _ => None,
        };

        Ok(DerivedRow {
            created: record.created.date_naive(),
            resolved: record.resolved.map(|r| r.date_naive()),
            lead_days: lead_time_ms.map(millis_to_days),
            lead_time_ms,
            cycle_days,
            time_in_status,
            epic_name: epic.name,
            epic_id: epic.id,
            story_points: record.story_points,
            category,
            team,
            key: record.key,
            summary: record.summary,
            status: record.status,
            issue_type: record.issue_type,
        })
    }

    /// クエリを解決して抽出し、シンクに書き出す
    ///
    /// クエリの解決に失敗した場合のみエラーを記録して `None` を返す。
    /// それ以外の失敗は呼び出し元に返す。
    pub async fn save_query_data(
        &mut self,
        source: &QuerySource,
        columns: ColumnSet,
        sink: &dyn TabularSink,
    ) -> Result<Option<PathBuf>> {
        let resolved = match ResolvedQuery::resolve(&self.client, source).await {
            Ok(resolved) => resolved,
            Err(e) => {
                log::error!("Unable to resolve query {:?}: {}", source, e);
                return Ok(None);
            }
        };

        let rows = self.extract(&resolved.jql).await?;
        let path = sink.write_rows(&resolved.display_name, columns, &rows).await?;
        Ok(Some(path))
    }
}
