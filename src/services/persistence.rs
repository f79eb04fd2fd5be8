// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Durable storage for the session store.
//!
//! Mirrors browser local storage: a flat string-keyed map, with the whole
//! session serialized under a single key.

use crate::error::ClientError;
use anyhow::Context;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Key-value storage the session store persists into.
pub trait SessionPersistence: Send + Sync + 'static {
    /// Raw persisted value, `None` if nothing was stored yet.
    fn load(&self) -> Result<Option<String>, ClientError>;

    fn save(&self, value: &str) -> Result<(), ClientError>;

    fn clear(&self) -> Result<(), ClientError>;
}

/// JSON file of `{key: value}` pairs; other keys in the file are preserved.
pub struct FilePersistence {
    path: PathBuf,
    key: String,
    // Serializes read-modify-write cycles on the file.
    write_lock: Mutex<()>,
}

impl FilePersistence {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, ClientError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to read {}", self.path.display()))
                    .into())
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        let entries = serde_json::from_str(&raw)
            .with_context(|| format!("Corrupt storage file {}", self.path.display()))?;
        Ok(entries)
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), ClientError> {
        let raw = serde_json::to_string_pretty(entries).context("Failed to encode storage")?;

        // Write then rename, so a crash never leaves a half-written file.
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, raw).with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

impl SessionPersistence for FilePersistence {
    fn load(&self) -> Result<Option<String>, ClientError> {
        let mut entries = self.read_entries()?;
        Ok(entries.remove(&self.key))
    }

    fn save(&self, value: &str) -> Result<(), ClientError> {
        let _guard = self.write_lock.lock();
        let mut entries = self.read_entries().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Discarding unreadable storage file");
            BTreeMap::new()
        });
        entries.insert(self.key.clone(), value.to_string());
        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<(), ClientError> {
        let _guard = self.write_lock.lock();
        let mut entries = self.read_entries()?;
        if entries.remove(&self.key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

/// In-process storage, lost on exit.
#[derive(Default)]
pub struct MemoryPersistence {
    value: Mutex<Option<String>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a raw value, as if left by a previous run.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }

    pub fn snapshot(&self) -> Option<String> {
        self.value.lock().clone()
    }
}

impl SessionPersistence for MemoryPersistence {
    fn load(&self) -> Result<Option<String>, ClientError> {
        Ok(self.value.lock().clone())
    }

    fn save(&self, value: &str) -> Result<(), ClientError> {
        *self.value.lock() = Some(value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.value.lock() = None;
        Ok(())
    }
}
