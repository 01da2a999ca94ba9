//! RemotePush port - ドラフトをサーバへ送る
//!
//! 受け取り側は同じ `{taskId, completedQty}` の再送を上書きとして扱うこと（冪等）。
//! ack が返らなかった送信は失敗と区別できず、次のパスで再送されます。

use async_trait::async_trait;

use crate::domain::{DraftPush, PushError};

#[async_trait]
pub trait RemotePush: Send + Sync {
    async fn push(&self, draft: &DraftPush) -> Result<(), PushError>;
}
