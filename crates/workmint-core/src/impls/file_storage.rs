//! FileBlobStorage - one file per key under a directory.
//!
//! Writes go to `<key>.tmp` and are renamed over `<key>.json`, so a crash or
//! a full disk mid-write leaves the previous value intact.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::domain::StorageError;
use crate::ports::BlobStorage;

#[derive(Debug, Clone)]
pub struct FileBlobStorage {
    dir: PathBuf,
}

impl FileBlobStorage {
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl BlobStorage for FileBlobStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let tmp = path.with_extension("tmp");
        let written = (|| -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        })();

        if let Err(e) = written {
            // best effort; the original file is untouched either way
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileBlobStorage::new(dir.path().join("nested"));

        assert_eq!(storage.get("drafts").unwrap(), None);

        storage.set("drafts", "{\"a\":1}").unwrap();
        assert_eq!(storage.get("drafts").unwrap().as_deref(), Some("{\"a\":1}"));

        storage.set("drafts", "{}").unwrap();
        assert_eq!(storage.get("drafts").unwrap().as_deref(), Some("{}"));
        assert!(!dir.path().join("nested").join("drafts.tmp").exists());

        storage.remove("drafts").unwrap();
        assert_eq!(storage.get("drafts").unwrap(), None);
    }

    #[test]
    fn removing_missing_key_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileBlobStorage::new(dir.path());
        storage.remove("nothing.here").unwrap();
    }

    #[test]
    fn values_survive_a_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        FileBlobStorage::new(dir.path()).set("k", "v").unwrap();

        let reopened = FileBlobStorage::new(dir.path());
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }

    #[rstest]
    #[case("")]
    #[case("../escape")]
    #[case("a/b")]
    #[case(".hidden")]
    #[case("with space")]
    fn rejects_unsafe_keys(#[case] key: &str) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileBlobStorage::new(dir.path());
        assert!(matches!(storage.set(key, "x"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(storage.get(key), Err(StorageError::InvalidKey(_))));
    }
}
