//! sync_pass - 1 回の同期パス
//!
//! # フロー
//! 1. オフラインなら何もしない
//! 2. 未同期のドラフトを列挙（task_id 順）
//! 3. 1 件ずつ順番に送信（並列にしない。1 件が遅いと後続も遅れる）
//! 4. 成功したら、送った値がまだ最新の場合だけ synced にする
//! 5. 失敗はログに出して次へ。ドラフトは未同期のまま次のパスで再送
//!
//! ストアの読み書きはファイル I/O を伴うので spawn_blocking で実行します。
//!
//! バックオフもリトライ上限も無い。失敗し続けるドラフトは毎パス再送される。

use std::sync::Arc;

use crate::app::status::{FailedPush, SkipReason, SyncReport};
use crate::domain::StoreError;
use crate::ports::RemotePush;
use crate::store::DraftStore;

/// Run a blocking store operation on the blocking thread pool.
async fn on_blocking_pool<T, F>(store: &Arc<DraftStore>, op: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce(&DraftStore) -> Result<T, StoreError> + Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
}

pub async fn sync_pass(store: &Arc<DraftStore>, push: &dyn RemotePush) -> SyncReport {
    if !store.is_online() {
        tracing::debug!("offline, skipping sync pass");
        return SyncReport::skipped(store.now(), SkipReason::Offline);
    }

    let mut report = SyncReport::started(store.now());

    let candidates = match on_blocking_pool(store, |s| s.list_unsynced()).await {
        Ok(candidates) => candidates,
        Err(e) => {
            report.skipped = Some(SkipReason::StoreUnavailable(e.to_string()));
            report.finished_at = store.now();
            return report;
        }
    };
    report.attempted = candidates.len();

    for draft in candidates {
        let body = draft.to_push();
        if let Err(e) = push.push(&body).await {
            tracing::warn!(task_id = %draft.task_id, error = %e, "push failed, will retry next pass");
            report.failed.push(FailedPush {
                task_id: draft.task_id,
                error: e.to_string(),
            });
            continue;
        }

        let task_id = draft.task_id.clone();
        let qty = draft.completed_qty;
        match on_blocking_pool(store, move |s| s.mark_synced_if_current(&task_id, qty)).await {
            Ok(true) => {
                tracing::debug!(task_id = %draft.task_id, "draft synced");
                report.synced.push(draft.task_id);
            }
            Ok(false) => {
                // changed or removed while the push was in flight
                tracing::debug!(task_id = %draft.task_id, "draft changed during push, left unsynced");
            }
            Err(e) => report.failed.push(FailedPush {
                task_id: draft.task_id,
                error: format!("pushed but not recorded: {e}"),
            }),
        }
    }

    report.finished_at = store.now();
    tracing::info!(
        attempted = report.attempted,
        synced = report.synced.len(),
        failed = report.failed.len(),
        "sync pass finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::thread::{self, ThreadId};

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use crate::domain::{DraftPush, PushError, StorageError, TaskId};
    use crate::impls::{InMemoryBlobStorage, ManualConnectivity, ScriptedPush};
    use crate::ports::{BlobStorage, FixedClock};

    fn store_with(online: bool) -> (Arc<DraftStore>, Arc<ManualConnectivity>, Arc<InMemoryBlobStorage>) {
        let storage = Arc::new(InMemoryBlobStorage::new());
        let connectivity = Arc::new(ManualConnectivity::new(online));
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()));
        let store = Arc::new(DraftStore::new(storage.clone(), clock, connectivity.clone()));
        (store, connectivity, storage)
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_pass() {
        let (store, _conn, _storage) = store_with(true);
        store.save_draft("T1", 10.0).unwrap();
        store.save_draft("T2", 20.0).unwrap();
        let push = ScriptedPush::rejecting(["T1"]);

        let report = sync_pass(&store, &push).await;

        assert_eq!(report.attempted, 2);
        assert_eq!(report.synced, vec![TaskId::new("T2")]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].task_id, TaskId::new("T1"));

        assert!(!store.get_draft(&TaskId::new("T1")).unwrap().unwrap().synced);
        assert!(store.get_draft(&TaskId::new("T2")).unwrap().unwrap().synced);

        // the failed draft is a candidate again
        let next: Vec<TaskId> = store.list_unsynced().unwrap().into_iter().map(|d| d.task_id).collect();
        assert_eq!(next, vec![TaskId::new("T1")]);
    }

    #[tokio::test]
    async fn pushes_in_order_with_exact_payload() {
        let (store, _conn, _storage) = store_with(true);
        store.save_draft("B", 2.0).unwrap();
        store.save_draft("A", 1.5).unwrap();
        let push = ScriptedPush::new();

        sync_pass(&store, &push).await;

        assert_eq!(
            push.pushes(),
            vec![
                DraftPush { task_id: TaskId::new("A"), completed_qty: 1.5 },
                DraftPush { task_id: TaskId::new("B"), completed_qty: 2.0 },
            ]
        );
    }

    #[tokio::test]
    async fn synced_drafts_are_not_pushed_again() {
        let (store, _conn, _storage) = store_with(true);
        store.save_draft("T1", 1.0).unwrap();
        let push = ScriptedPush::new();

        sync_pass(&store, &push).await;
        let second = sync_pass(&store, &push).await;

        assert_eq!(second.attempted, 0);
        assert_eq!(push.pushes().len(), 1);
    }

    #[tokio::test]
    async fn offline_pass_pushes_nothing() {
        let (store, conn, _storage) = store_with(false);
        store.save_draft("T1", 1.0).unwrap();
        let push = ScriptedPush::new();

        let report = sync_pass(&store, &push).await;
        assert_eq!(report.skipped, Some(SkipReason::Offline));
        assert!(push.pushes().is_empty());

        conn.set_online(true);
        let report = sync_pass(&store, &push).await;
        assert_eq!(report.synced.len(), 1);
    }

    #[tokio::test]
    async fn corrupt_store_skips_the_pass() {
        let (store, _conn, storage) = store_with(true);
        storage.set(store.storage_key(), "oops").unwrap();
        let push = ScriptedPush::new();

        let report = sync_pass(&store, &push).await;
        assert!(matches!(report.skipped, Some(SkipReason::StoreUnavailable(_))));
        assert!(push.pushes().is_empty());
    }

    /// Saves a newer quantity for the same task while its push is in flight.
    struct RacingPush {
        store: Arc<DraftStore>,
    }

    #[async_trait]
    impl RemotePush for RacingPush {
        async fn push(&self, draft: &DraftPush) -> Result<(), PushError> {
            self.store
                .save_draft(draft.task_id.clone(), draft.completed_qty + 5.0)
                .map_err(|e| PushError::Transport(e.to_string()))?;
            Ok(())
        }
    }

    #[tokio::test]
    async fn save_during_push_stays_unsynced() {
        let (store, _conn, _storage) = store_with(true);
        store.save_draft("T1", 10.0).unwrap();
        let push = RacingPush { store: store.clone() };

        let report = sync_pass(&store, &push).await;
        assert!(report.synced.is_empty());
        assert!(report.failed.is_empty());

        let record = store.get_draft(&TaskId::new("T1")).unwrap().unwrap();
        assert_eq!(record.completed_qty, 15.0);
        assert!(!record.synced);
    }

    /// Records which threads touch the storage.
    struct ThreadRecordingStorage {
        inner: InMemoryBlobStorage,
        threads: Mutex<HashSet<ThreadId>>,
    }

    impl ThreadRecordingStorage {
        fn note(&self) {
            self.threads.lock().unwrap().insert(thread::current().id());
        }
    }

    impl BlobStorage for ThreadRecordingStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.note();
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.note();
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.note();
            self.inner.remove(key)
        }
    }

    #[tokio::test]
    async fn storage_is_not_touched_on_the_runtime_thread() {
        let storage = Arc::new(ThreadRecordingStorage {
            inner: InMemoryBlobStorage::new(),
            threads: Mutex::new(HashSet::new()),
        });
        let connectivity = Arc::new(ManualConnectivity::online());
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()));
        let store = Arc::new(DraftStore::new(storage.clone(), clock, connectivity));
        store.save_draft("T1", 1.0).unwrap();
        store.save_draft("T2", 2.0).unwrap();
        storage.threads.lock().unwrap().clear();

        let report = sync_pass(&store, &ScriptedPush::new()).await;
        assert_eq!(report.synced.len(), 2);

        // current_thread runtime: this thread is the runtime thread
        let threads = storage.threads.lock().unwrap();
        assert!(!threads.is_empty());
        assert!(!threads.contains(&thread::current().id()));
    }
}
