//! DraftStore - タスク進捗のローカルドラフト
//!
//! 1 つのストレージキーに全ドラフトを 1 つの JSON として保存します。
//! 各操作は「全体を読む → 1 件変更 → 全体を書く」だけです。
//!
//! # 並行性
//! - プロセス内では Mutex で read-modify-write を直列化する
//! - プロセス間（同じディレクトリを使う別プロセス）のロックは無い。最後の書き込みが勝つ
//!
//! # エラー
//! - 失敗は `Result` で返す（panic しない）
//! - 境界で `tracing::warn!` にも出す。呼び出し側が無視してもログには残る

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::domain::{DraftRecord, DraftSnapshot, StoreError, TaskId, is_valid_quantity};
use crate::ports::{BlobStorage, Clock, Connectivity};

pub const DEFAULT_STORAGE_KEY: &str = "workmint.task_drafts";

pub struct DraftStore {
    storage: Arc<dyn BlobStorage>,
    clock: Arc<dyn Clock>,
    connectivity: Arc<dyn Connectivity>,
    key: String,
    write_lock: Mutex<()>,
}

impl DraftStore {
    pub fn new(
        storage: Arc<dyn BlobStorage>,
        clock: Arc<dyn Clock>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        Self::with_key(storage, clock, connectivity, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(
        storage: Arc<dyn BlobStorage>,
        clock: Arc<dyn Clock>,
        connectivity: Arc<dyn Connectivity>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            clock,
            connectivity,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Record a locally-entered quantity, replacing any previous draft for
    /// the task. The new record is always unsynced.
    pub fn save_draft(
        &self,
        task_id: impl Into<TaskId>,
        completed_qty: f64,
    ) -> Result<DraftRecord, StoreError> {
        let task_id = task_id.into();
        if task_id.is_blank() {
            return Err(StoreError::InvalidTaskId);
        }
        if !is_valid_quantity(completed_qty) {
            return Err(StoreError::InvalidQuantity {
                task_id,
                qty: completed_qty,
            });
        }

        let record = DraftRecord::new(task_id, completed_qty, self.clock.now());
        let saved = record.clone();
        self.update("save_draft", move |snapshot| {
            snapshot.drafts.insert(record.task_id.clone(), record);
            true
        })?;

        tracing::debug!(task_id = %saved.task_id, completed_qty, "draft saved");
        Ok(saved)
    }

    pub fn get_draft(&self, task_id: &TaskId) -> Result<Option<DraftRecord>, StoreError> {
        let snapshot = self.read("get_draft")?;
        Ok(snapshot.drafts.get(task_id).cloned())
    }

    /// All drafts, ordered by task id.
    pub fn list_drafts(&self) -> Result<Vec<DraftRecord>, StoreError> {
        let snapshot = self.read("list_drafts")?;
        Ok(snapshot.drafts.into_values().collect())
    }

    pub fn list_unsynced(&self) -> Result<Vec<DraftRecord>, StoreError> {
        let snapshot = self.read("list_unsynced")?;
        Ok(snapshot
            .drafts
            .into_values()
            .filter(|record| !record.synced)
            .collect())
    }

    pub fn pending_count(&self) -> Result<usize, StoreError> {
        let snapshot = self.read("pending_count")?;
        Ok(snapshot.drafts.values().filter(|r| !r.synced).count())
    }

    /// Returns whether a record was marked. Never creates a record.
    pub fn mark_synced(&self, task_id: &TaskId) -> Result<bool, StoreError> {
        self.update("mark_synced", |snapshot| match snapshot.drafts.get_mut(task_id) {
            Some(record) if !record.synced => {
                record.synced = true;
                true
            }
            _ => false,
        })
    }

    /// Like `mark_synced`, but only if the stored quantity is still the one
    /// that was pushed. A save that landed while the push was in flight keeps
    /// the record unsynced.
    pub fn mark_synced_if_current(
        &self,
        task_id: &TaskId,
        pushed_qty: f64,
    ) -> Result<bool, StoreError> {
        self.update("mark_synced_if_current", |snapshot| match snapshot.drafts.get_mut(task_id) {
            Some(record) if !record.synced && record.completed_qty == pushed_qty => {
                record.synced = true;
                true
            }
            _ => false,
        })
    }

    /// Returns whether a record was removed.
    pub fn remove_draft(&self, task_id: &TaskId) -> Result<bool, StoreError> {
        self.update("remove_draft", |snapshot| {
            snapshot.drafts.remove(task_id).is_some()
        })
    }

    pub fn clear_all(&self) -> Result<(), StoreError> {
        let _guard = self.lock();
        self.storage
            .remove(&self.key)
            .map_err(StoreError::from)
            .inspect_err(|e| tracing::warn!(op = "clear_all", error = %e, "draft store failure"))
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn load(&self) -> Result<DraftSnapshot, StoreError> {
        match self.storage.get(&self.key)? {
            Some(raw) => DraftSnapshot::decode(&raw),
            None => Ok(DraftSnapshot::empty()),
        }
    }

    fn read(&self, op: &'static str) -> Result<DraftSnapshot, StoreError> {
        let _guard = self.lock();
        self.load()
            .inspect_err(|e| tracing::warn!(op, error = %e, "draft store failure"))
    }

    /// Read, mutate, write back. `mutate` returns whether anything changed;
    /// unchanged snapshots are not rewritten.
    fn update<F>(&self, op: &'static str, mutate: F) -> Result<bool, StoreError>
    where
        F: FnOnce(&mut DraftSnapshot) -> bool,
    {
        let _guard = self.lock();
        self.apply(mutate)
            .inspect_err(|e| tracing::warn!(op, error = %e, "draft store failure"))
    }

    fn apply<F>(&self, mutate: F) -> Result<bool, StoreError>
    where
        F: FnOnce(&mut DraftSnapshot) -> bool,
    {
        let mut snapshot = self.load()?;
        if !mutate(&mut snapshot) {
            return Ok(false);
        }
        let encoded = snapshot.encode()?;
        self.storage.set(&self.key, &encoded)?;
        Ok(true)
    }
}
