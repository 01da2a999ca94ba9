//! ScriptedPush - 結果を指定できるリモート送信（開発用・テスト用）
//!
//! - 指定した task_id だけ失敗させる
//! - 送信された内容を記録する
//! - gate を渡すと、送信ごとに `Notify` を待つ（送信中の状態を作れる）

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::domain::{DraftPush, PushError, TaskId};
use crate::ports::RemotePush;

#[derive(Debug, Default)]
pub struct ScriptedPush {
    rejected: Mutex<HashSet<TaskId>>,
    log: Mutex<Vec<DraftPush>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedPush {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TaskId>,
    {
        let push = Self::new();
        for id in ids {
            push.reject(id);
        }
        push
    }

    /// Every push waits for one `notify_one` on `gate` before answering.
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn reject(&self, id: impl Into<TaskId>) {
        self.rejected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.into());
    }

    pub fn accept(&self, id: &TaskId) {
        self.rejected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id);
    }

    /// Everything pushed so far, in order.
    pub fn pushes(&self) -> Vec<DraftPush> {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl RemotePush for ScriptedPush {
    async fn push(&self, draft: &DraftPush) -> Result<(), PushError> {
        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(draft.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let rejected = self
            .rejected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&draft.task_id);
        if rejected {
            return Err(PushError::Rejected {
                status: 503,
                message: format!("scripted rejection for {}", draft.task_id),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(id: &str) -> DraftPush {
        DraftPush {
            task_id: TaskId::new(id),
            completed_qty: 1.0,
        }
    }

    #[tokio::test]
    async fn rejects_only_listed_ids() {
        let push = ScriptedPush::rejecting(["T2"]);
        assert!(push.push(&draft("T1")).await.is_ok());
        assert!(matches!(
            push.push(&draft("T2")).await,
            Err(PushError::Rejected { status: 503, .. })
        ));

        push.accept(&TaskId::new("T2"));
        assert!(push.push(&draft("T2")).await.is_ok());
        assert_eq!(push.pushes().len(), 3);
    }
}
