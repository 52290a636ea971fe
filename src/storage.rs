//! Local key-value storage and the record shim on top of it.
//!
//! Values are raw JSON text, the same shape a browser keeps in
//! `localStorage`. When opened on a path, every write rewrites the file.

use crate::config::DEFAULT_STORAGE_QUOTA;
use crate::errors::StoreError;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::{debug, error, warn};

#[derive(Debug)]
pub struct LocalStorage {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
    quota: usize,
}

impl LocalStorage {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: BTreeMap::new(),
            quota: DEFAULT_STORAGE_QUOTA,
        }
    }

    /// Opens storage backed by `path`. A missing or unreadable file yields
    /// empty storage; the file is created on the first write.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_entries(&path).await;
        Self {
            path: Some(path),
            entries,
            quota: DEFAULT_STORAGE_QUOTA,
        }
    }

    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub async fn set_item(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let replaced = self
            .entries
            .get(key)
            .map(|old| key.len() + old.len())
            .unwrap_or(0);
        let needed = self.used_bytes() - replaced + key.len() + value.len();
        if needed > self.quota {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                needed,
                quota: self.quota,
            });
        }

        self.entries.insert(key.to_string(), value);
        self.flush().await
    }

    pub async fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.flush().await?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes of keys plus values, the figure the quota is checked against.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }

    async fn flush(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let payload = serde_json::to_vec_pretty(&self.entries)?;
        fs::write(path, payload).await?;
        Ok(())
    }
}

async fn read_entries(path: &Path) -> BTreeMap<String, String> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse storage file {}: {err}", path.display());
                BTreeMap::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(err) => {
            error!("failed to read storage file {}: {err}", path.display());
            BTreeMap::new()
        }
    }
}

/// Reads the record under `key`, or returns `fallback` when it is absent,
/// empty, or does not parse.
pub fn load<T: DeserializeOwned>(storage: &LocalStorage, key: &str, fallback: T) -> T {
    let Some(raw) = storage.get_item(key).filter(|raw| !raw.is_empty()) else {
        debug!("no stored value for {key}, using fallback");
        return fallback;
    };

    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            warn!("stored value for {key} is unreadable ({err}), using fallback");
            fallback
        }
    }
}

pub async fn save<T: Serialize>(
    storage: &mut LocalStorage,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value)?;
    storage.set_item(key, raw).await
}
