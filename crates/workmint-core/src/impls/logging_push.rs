//! LoggingPush - リモート送信のスタブ
//!
//! 実際のエンドポイントはまだ無いので、送信内容をログに出して成功を返します。

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::{DraftPush, PushError};
use crate::ports::RemotePush;

#[derive(Debug, Default)]
pub struct LoggingPush {
    pushed: AtomicUsize,
}

impl LoggingPush {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of acknowledged pushes since creation.
    pub fn pushed(&self) -> usize {
        self.pushed.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RemotePush for LoggingPush {
    async fn push(&self, draft: &DraftPush) -> Result<(), PushError> {
        tracing::info!(
            task_id = %draft.task_id,
            completed_qty = draft.completed_qty,
            "push (stub): accepted"
        );
        self.pushed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
