//! Snapshot - ストレージ上の表現（バージョン付き）
//!
//! 1 つのキーに全ドラフトを JSON で保存します。
//!
//! ```text
//! { "version": 1, "drafts": { "<taskId>": { "taskId": ..., "completedQty": ..., ... } } }
//! ```
//!
//! # 互換性
//! - バージョンの無い旧形式（taskId -> DraftRecord の裸のオブジェクト）も読める
//! - 読んだ時点で v1 に変換し、次の書き込みで v1 として保存される
//! - 未知の新しいバージョンは拒否する（書き戻して壊さないため）

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::errors::StoreError;
use super::{DraftRecord, TaskId};

pub const CURRENT_SCHEMA_VERSION: u64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    pub version: u64,
    #[serde(default)]
    pub drafts: BTreeMap<TaskId, DraftRecord>,
}

impl DraftSnapshot {
    pub fn empty() -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION,
            drafts: BTreeMap::new(),
        }
    }

    /// Decode a stored blob, upgrading the legacy layout.
    pub fn decode(raw: &str) -> Result<Self, StoreError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;

        match value.get("version").and_then(serde_json::Value::as_u64) {
            Some(found) if found > CURRENT_SCHEMA_VERSION => Err(StoreError::UnsupportedSchema {
                found,
                supported: CURRENT_SCHEMA_VERSION,
            }),
            Some(_) => {
                let mut snapshot: DraftSnapshot = serde_json::from_value(value)?;
                snapshot.version = CURRENT_SCHEMA_VERSION;
                Ok(snapshot)
            }
            None => {
                let drafts: BTreeMap<TaskId, DraftRecord> = serde_json::from_value(value)?;
                tracing::info!(count = drafts.len(), "upgrading legacy draft blob to v{CURRENT_SCHEMA_VERSION}");
                Ok(Self {
                    version: CURRENT_SCHEMA_VERSION,
                    drafts,
                })
            }
        }
    }

    pub fn encode(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Default for DraftSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
