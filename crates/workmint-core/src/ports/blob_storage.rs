//! BlobStorage port - localStorage 相当のキー・バリューストア
//!
//! # 設計原則
//! - 値は文字列（JSON）のみ
//! - 同期 API（ブラウザの localStorage と同じ）
//! - プロセス間のロックは提供しない（最後の書き込みが勝つ）

use crate::domain::StorageError;

/// String key/value storage that survives a restart.
///
/// Implementations must make `set` all-or-nothing: after a failed `set` the
/// previous value is still readable.
pub trait BlobStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
