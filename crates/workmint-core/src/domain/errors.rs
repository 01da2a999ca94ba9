//! Errors - エラー型と分類
//!
//! ストア操作は例外を投げず、必ず `Result` で失敗を返します。
//! 呼び出し側がユーザーに見せるかログに留めるかを決めます。

use thiserror::Error;

use super::TaskId;

/// Failure of the underlying key/value storage (browser local storage in the
/// original product, a directory of files here).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage quota exceeded: need {needed} bytes, limit {limit}")]
    QuotaExceeded { limit: usize, needed: usize },

    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}

/// Errors surfaced by `DraftStore` operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("draft blob is not valid json: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("draft blob schema v{found} is newer than supported v{supported}")]
    UnsupportedSchema { found: u64, supported: u64 },

    #[error("task id must not be blank")]
    InvalidTaskId,

    #[error("invalid quantity {qty} for task {task_id}: must be finite and >= 0")]
    InvalidQuantity { task_id: TaskId, qty: f64 },

    #[error("store task failed: {0}")]
    Task(String),
}

/// Why a single remote push did not go through.
///
/// Every variant is treated the same by the sync pass: log it, keep the draft
/// unsynced, retry on the next pass.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PushError {
    #[error("remote rejected push (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("transport: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
