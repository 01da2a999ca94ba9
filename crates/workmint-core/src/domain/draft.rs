//! DraftRecord: one locally-entered progress value per task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TaskId;

/// The last quantity entered locally for a task.
///
/// - `synced` is false right after every local write.
/// - It flips to true only once the remote side acknowledged this exact value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRecord {
    pub task_id: TaskId,
    pub completed_qty: f64,
    pub last_updated: DateTime<Utc>,
    pub synced: bool,
}

impl DraftRecord {
    /// A fresh, unsynced record.
    pub fn new(task_id: TaskId, completed_qty: f64, now: DateTime<Utc>) -> Self {
        Self {
            task_id,
            completed_qty,
            last_updated: now,
            synced: false,
        }
    }

    /// Payload handed to the remote collaborator.
    pub fn to_push(&self) -> DraftPush {
        DraftPush {
            task_id: self.task_id.clone(),
            completed_qty: self.completed_qty,
        }
    }
}

/// What the remote side receives for one draft: `{taskId, completedQty}`.
///
/// The receiver must treat it as an idempotent overwrite; an unacknowledged
/// push is retried with the same body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPush {
    pub task_id: TaskId,
    pub completed_qty: f64,
}

/// Quantities are non-negative and finite.
pub fn is_valid_quantity(qty: f64) -> bool {
    qty.is_finite() && qty >= 0.0
}
