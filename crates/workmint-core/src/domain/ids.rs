//! Domain identifiers.
//!
//! タスク ID はサーバ側で採番された不透明な文字列です。
//! クライアントは形式を解釈せず、ストアのキーとしてのみ使います。

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a task whose progress is tracked as a draft.
///
/// # 例
/// ```ignore
/// let id = TaskId::new("T1");
/// assert_eq!(id.as_str(), "T1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blank ids cannot be used as store keys.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
