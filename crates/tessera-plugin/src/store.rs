// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable key-value stores backing per-plugin configuration.
//!
//! Every call may fail; callers in the capability facade treat failures as
//! "store unavailable" and fall back to memory.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tessera_core::TesseraError;

/// String key-value store, shared across plugins with per-plugin keys.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, TesseraError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), TesseraError>;
}

/// Process-local store, mostly for tests and hosts without a data directory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, TesseraError> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), TesseraError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store persisted as a single JSON object file.
///
/// The file is re-read on every access so that several processes sharing a
/// data directory observe each other's writes. Writes go through a sibling
/// temp file and a rename.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, TesseraError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(TesseraError::Storage { source: Box::new(e) }),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| TesseraError::Storage { source: Box::new(e) })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, TesseraError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), TesseraError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());

        let encoded = serde_json::to_string_pretty(&items)
            .map_err(|e| TesseraError::Storage { source: Box::new(e) })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| TesseraError::Storage { source: Box::new(e) })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, encoded).map_err(|e| TesseraError::Storage { source: Box::new(e) })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| TesseraError::Storage { source: Box::new(e) })
    }
}
