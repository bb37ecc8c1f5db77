use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::StoreError;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_KEY: &str = "user";

/// Persisted client state: independent string entries, like browser local
/// storage.
///
/// `set_many` and `remove_many` must apply all their entries in one step so a
/// reader never sees half of a session.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError>;
    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError>;
}

/// Entries kept in a single JSON object file, replaced through a temp file and
/// rename.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(StoreError::Serde(err)) => {
                tracing::warn!(path = %self.path.display(), "rewriting unreadable session file: {}", err);
                BTreeMap::new()
            }
            Err(err) => return Err(err),
        };
        change(&mut entries);
        self.write_all(&entries)
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(self.read_all()?.remove(key))
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        self.update(|all| {
            for (key, value) in entries {
                all.insert(key.to_string(), value.clone());
            }
        })
    }

    /// Falls back to emptying the whole file when it cannot be rewritten, so
    /// removed keys never come back on the next read.
    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let rewritten = self.update(|all| {
            for key in keys {
                all.remove(*key);
            }
        });
        let Err(err) = rewritten else {
            return Ok(());
        };

        tracing::warn!(path = %self.path.display(), "rewriting session file failed, truncating it: {}", err);
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match fs::write(&self.path, "") {
            Ok(()) => Ok(()),
            Err(_) => Err(err),
        }
    }
}

/// Process-local storage, lost on exit.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        let mut all = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for (key, value) in entries {
            all.insert(key.to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut all = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for key in keys {
            all.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let storage = FileStorage::open(&path).unwrap();
        storage
            .set_many(&[(ACCESS_TOKEN_KEY, "T1".to_string()), (USER_KEY, "{}".to_string())])
            .unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("T1"));
        assert_eq!(reopened.get(REFRESH_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn removing_keys_leaves_others() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("session.json")).unwrap();
        storage
            .set_many(&[("theme", "dark".to_string()), (ACCESS_TOKEN_KEY, "T1".to_string())])
            .unwrap();
        storage.remove_many(&[ACCESS_TOKEN_KEY, USER_KEY]).unwrap();

        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get("theme").unwrap().as_deref(), Some("dark"));
        assert!(!storage.path().with_extension("tmp").exists());
    }

    #[test]
    fn failed_rewrite_truncates_instead() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let storage = FileStorage::open(&path).unwrap();
        storage
            .set_many(&[(ACCESS_TOKEN_KEY, "T1".to_string()), (USER_KEY, "{}".to_string())])
            .unwrap();
        // the temp file cannot be written over a directory
        fs::create_dir(path.with_extension("tmp")).unwrap();

        storage.remove_many(&[ACCESS_TOKEN_KEY, USER_KEY]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("absent.json")).unwrap();
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        let storage = FileStorage::open(&path).unwrap();
        assert!(matches!(storage.get(USER_KEY), Err(StoreError::Serde(_))));

        storage.remove_many(&[USER_KEY]).unwrap();
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }
}
