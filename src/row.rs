use crate::time_in_status::{TimeInStatus, TrackedStatus};
use chrono::NaiveDate;

/// 出力する列の組
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSet {
    Summary,
    Detail,
}

const SUMMARY_COLUMNS: &[&str] = &[
    "Key", "Summary", "Category", "Team", "Status", "Created", "Resolved", "Epic", "Epic ID",
];

const DETAIL_COLUMNS: &[&str] = &[
    "Key",
    "Summary",
    "Category",
    "Team",
    "Status",
    "Created",
    "Resolved",
    "Epic",
    "Epic ID",
    "Issue Type",
    "Story Points",
    "Lead Time (ms)",
    "To Do",
    "In Progress",
    "Ready for Review",
    "QA Test",
    "Ready to Release",
    "QA Test Dev",
    "Ready for Stage",
    "QA Test Stage",
    "Ready for Prod",
    "Lead Days",
    "Cycle Days",
];

impl ColumnSet {
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ColumnSet::Summary => SUMMARY_COLUMNS,
            ColumnSet::Detail => DETAIL_COLUMNS,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColumnSet::Summary => "SUMMARY",
            ColumnSet::Detail => "DETAIL",
        }
    }
}

/// 1 Issue分の出力行
///
/// 値がないフィールドは `None` のまま保持し、出力時は空欄にする。
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub key: String,
    pub summary: String,
    pub category: String,
    pub team: String,
    pub status: String,
    pub created: NaiveDate,
    pub resolved: Option<NaiveDate>,
    pub epic_name: Option<String>,
    pub epic_id: Option<String>,
    pub issue_type: String,
    pub story_points: Option<f64>,
    pub lead_time_ms: Option<i64>,
    pub time_in_status: TimeInStatus,
    pub lead_days: Option<f64>,
    pub cycle_days: Option<f64>,
}

impl DerivedRow {
    pub fn days_in(&self, status: TrackedStatus) -> Option<f64> {
        self.time_in_status.days(status)
    }

    /// 列の組に合わせて文字列の行に変換する
    pub fn to_record(&self, columns: ColumnSet) -> Vec<String> {
        let mut record = vec![
            self.key.clone(),
            self.summary.clone(),
            self.category.clone(),
            self.team.clone(),
            self.status.clone(),
            self.created.to_string(),
            optional(self.resolved),
            optional(self.epic_name.as_ref()),
            optional(self.epic_id.as_ref()),
        ];

        if columns == ColumnSet::Detail {
            record.push(self.issue_type.clone());
            record.push(optional(self.story_points));
            record.push(optional(self.lead_time_ms));
            record.extend(TrackedStatus::ALL.iter().map(|s| optional(self.days_in(*s))));
            record.push(optional(self.lead_days));
            record.push(optional(self.cycle_days));
        }

        record
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
