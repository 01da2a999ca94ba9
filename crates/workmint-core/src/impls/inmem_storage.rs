//! InMemoryBlobStorage - テスト用の localStorage
//!
//! # 学習ポイント
//! - Mutex による内部可変性（`&self` で書き込む）
//! - ブラウザと同じく「全値の合計サイズ」に容量制限をかけられる

use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::StorageError;
use crate::ports::BlobStorage;

#[derive(Debug, Default)]
pub struct InMemoryBlobStorage {
    values: Mutex<HashMap<String, String>>,
    /// Total bytes across all values; `None` means unlimited.
    quota: Mutex<Option<usize>>,
}

impl InMemoryBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(limit: usize) -> Self {
        let storage = Self::new();
        storage.set_quota(Some(limit));
        storage
    }

    pub fn set_quota(&self, limit: Option<usize>) {
        *self.quota.lock().unwrap_or_else(|e| e.into_inner()) = limit;
    }

    pub fn len(&self) -> usize {
        self.values.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStorage for InMemoryBlobStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(limit) = *self.quota.lock().unwrap_or_else(|e| e.into_inner()) {
            let others: usize = values
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded { limit, needed });
            }
        }

        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_and_remove() {
        let storage = InMemoryBlobStorage::new();
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));

        storage.remove("k").unwrap();
        storage.remove("k").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn quota_rejects_oversized_write_and_keeps_old_value() {
        let storage = InMemoryBlobStorage::with_quota(8);
        storage.set("k", "1234").unwrap();

        let err = storage.set("k", "123456789").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { limit: 8, needed: 9 }));
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("1234"));
    }

    #[test]
    fn quota_counts_other_keys() {
        let storage = InMemoryBlobStorage::with_quota(10);
        storage.set("a", "123456").unwrap();
        assert!(storage.set("b", "12345").is_err());
        // replacing a key only counts its new size
        storage.set("a", "1234567890").unwrap();
    }
}
