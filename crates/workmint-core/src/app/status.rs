//! Status - 同期パスの結果

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::TaskId;

/// Why a pass did not push anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum SkipReason {
    Offline,
    PassInProgress,
    StoreUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedPush {
    pub task_id: TaskId,
    pub error: String,
}

/// Outcome of one sync pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Unsynced drafts found at the start of the pass.
    pub attempted: usize,
    pub synced: Vec<TaskId>,
    pub failed: Vec<FailedPush>,
    pub skipped: Option<SkipReason>,
}

impl SyncReport {
    pub fn started(at: DateTime<Utc>) -> Self {
        Self {
            started_at: at,
            finished_at: at,
            attempted: 0,
            synced: Vec::new(),
            failed: Vec::new(),
            skipped: None,
        }
    }

    pub fn skipped(at: DateTime<Utc>, reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::started(at)
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

/// Running totals kept by `SyncLoop`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub running: bool,
    pub passes: u64,
    pub skipped_passes: u64,
    pub last_report: Option<SyncReport>,
}

impl SyncStatus {
    pub fn record(&mut self, report: &SyncReport) {
        if report.is_skipped() {
            self.skipped_passes += 1;
        } else {
            self.passes += 1;
        }
        self.last_report = Some(report.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn status_counts_skipped_separately() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut status = SyncStatus::default();

        status.record(&SyncReport::started(at));
        status.record(&SyncReport::skipped(at, SkipReason::Offline));

        assert_eq!(status.passes, 1);
        assert_eq!(status.skipped_passes, 1);
        assert_eq!(
            status.last_report.unwrap().skipped,
            Some(SkipReason::Offline)
        );
    }

    #[test]
    fn skip_reason_json_shape() {
        let json = serde_json::to_value(SkipReason::StoreUnavailable("io".into())).unwrap();
        assert_eq!(json, serde_json::json!({ "reason": "store_unavailable", "detail": "io" }));

        let json = serde_json::to_value(SkipReason::Offline).unwrap();
        assert_eq!(json, serde_json::json!({ "reason": "offline" }));
    }
}
