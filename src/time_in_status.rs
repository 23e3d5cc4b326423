use crate::error::{Error, Result};
use crate::status_directory::StatusDirectory;
use std::collections::BTreeMap;

const RECORD_SEPARATOR: &str = "_*|*_";
const FIELD_SEPARATOR: &str = "_*:*_";
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// 滞留時間を集計する対象のワークフローステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrackedStatus {
    ToDo,
    InProgress,
    ReadyForReview,
    QaTest,
    ReadyToRelease,
    QaTestDev,
    ReadyForStage,
    QaTestStage,
    ReadyForProd,
}

impl TrackedStatus {
    pub const ALL: [TrackedStatus; 9] = [
        TrackedStatus::ToDo,
        TrackedStatus::InProgress,
        TrackedStatus::ReadyForReview,
        TrackedStatus::QaTest,
        TrackedStatus::ReadyToRelease,
        TrackedStatus::QaTestDev,
        TrackedStatus::ReadyForStage,
        TrackedStatus::QaTestStage,
        TrackedStatus::ReadyForProd,
    ];

    /// ワークフロー上のステータス名（小文字）
    pub fn workflow_name(&self) -> &'static str {
        match self {
            TrackedStatus::ToDo => "to do",
            TrackedStatus::InProgress => "in progress",
            TrackedStatus::ReadyForReview => "ready for review",
            TrackedStatus::QaTest => "qa test",
            TrackedStatus::ReadyToRelease => "ready to release",
            TrackedStatus::QaTestDev => "qa/test dev",
            TrackedStatus::ReadyForStage => "ready to promote to stage",
            TrackedStatus::QaTestStage => "qa test stage",
            TrackedStatus::ReadyForProd => "ready to promote to prod",
        }
    }

    /// 出力列の見出し
    pub fn column(&self) -> &'static str {
        match self {
            TrackedStatus::ToDo => "To Do",
            TrackedStatus::InProgress => "In Progress",
            TrackedStatus::ReadyForReview => "Ready for Review",
            TrackedStatus::QaTest => "QA Test",
            TrackedStatus::ReadyToRelease => "Ready to Release",
            TrackedStatus::QaTestDev => "QA Test Dev",
            TrackedStatus::ReadyForStage => "Ready for Stage",
            TrackedStatus::QaTestStage => "QA Test Stage",
            TrackedStatus::ReadyForProd => "Ready for Prod",
        }
    }

    pub fn from_workflow_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.workflow_name() == normalized)
    }
}

/// エンコード文字列中の1ステータス分のレコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    pub status_id: String,
    pub transitions: u32,
    pub duration_ms: i64,
}

/// Time in Status のエンコード文字列を分解する
///
/// 文法: `record ("_*|*_" record)*`、`record = status_id "_*:*_" count "_*:*_" millis`
pub fn parse_records(encoding: &str) -> Result<Vec<StatusRecord>> {
    encoding
        .split(RECORD_SEPARATOR)
        .filter(|segment| !segment.trim().is_empty())
        .map(parse_record)
        .collect()
}

fn parse_record(segment: &str) -> Result<StatusRecord> {
    let parts: Vec<&str> = segment.split(FIELD_SEPARATOR).map(str::trim).collect();
    let [status_id, transitions, duration_ms] = parts.as_slice() else {
        return Err(Error::InvalidData(format!(
            "Malformed time-in-status record '{}'",
            segment
        )));
    };

    let invalid = |field: &str| {
        Error::InvalidData(format!("Invalid {} in time-in-status record '{}'", field, segment))
    };

    Ok(StatusRecord {
        status_id: status_id.to_string(),
        transitions: transitions.parse().map_err(|_| invalid("transition count"))?,
        duration_ms: duration_ms.parse().map_err(|_| invalid("duration"))?,
    })
}

/// ミリ秒を日数に変換（小数第2位で丸め、端数0.5は偶数側）
pub fn millis_to_days(milliseconds: i64) -> f64 {
    (milliseconds as f64 / MILLIS_PER_DAY * 100.0).round_ties_even() / 100.0
}

/// 追跡対象ステータスごとの滞留時間
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeInStatus {
    durations: BTreeMap<TrackedStatus, i64>,
}

impl TimeInStatus {
    /// エンコード文字列を追跡対象ステータスごとのミリ秒に変換する
    ///
    /// 入力がない場合は空の結果を返す。名前を解決できないステータスIDや
    /// 追跡対象外のステータスは無視する。
    ///
    /// 同名のステータスが複数IDで現れた場合、後の記録で上書きせず時間を合算する。
    pub fn decode(
        encoding: Option<&str>,
        directory: &StatusDirectory,
        tracked: &[TrackedStatus],
    ) -> Result<Self> {
        let mut result = Self::default();
        let Some(encoding) = encoding else {
            return Ok(result);
        };

        for record in parse_records(encoding)? {
            let Some(name) = directory.lookup(&record.status_id) else {
                log::debug!("Unknown status id {} ignored", record.status_id);
                continue;
            };
            let Some(status) = TrackedStatus::from_workflow_name(name) else {
                continue;
            };
            if tracked.contains(&status) {
                *result.durations.entry(status).or_insert(0) += record.duration_ms;
            }
        }

        Ok(result)
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    pub fn millis(&self, status: TrackedStatus) -> Option<i64> {
        self.durations.get(&status).copied()
    }

    pub fn days(&self, status: TrackedStatus) -> Option<f64> {
        self.millis(status).map(millis_to_days)
    }
}
