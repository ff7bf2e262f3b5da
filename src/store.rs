//! File-backed document store: the single source of truth for the
//! registry.
//!
//! The authoritative collection lives in a `BTreeMap` behind an `RwLock`
//! (id-ascending iteration gives ordered snapshots); a dedicated writer
//! mutex serializes every mutation across validate, version merge, durable
//! swap, and in-memory publish.
//!
//! # Durability protocol
//!
//! Every `put` writes the full updated collection to a temp file in the
//! store's directory, fsyncs it, then atomically renames it over the
//! canonical path. A crash before the rename leaves the prior file intact;
//! a crash after leaves the new file intact. The in-memory map is only
//! swapped once the rename has completed, so a failed swap leaves both the
//! file and the visible state exactly as before the attempt.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use chrono::Utc;
use uuid::Uuid;

use crate::codec;
use crate::error::{RegistryError, Result};
use crate::models::{DocumentRecord, StoredRecord};

#[derive(Debug)]
pub struct DocumentStore {
    path: PathBuf,
    records: RwLock<BTreeMap<String, StoredRecord>>,
    write_lock: Mutex<()>,
}

impl DocumentStore {
    /// Open the store, rehydrating the collection from the backing file.
    ///
    /// A missing file is an empty store, not an error. An unreadable or
    /// unparseable file fails fast with [`RegistryError::StoreCorrupt`]
    /// rather than silently discarding data.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records: BTreeMap<String, StoredRecord> = if path.exists() {
            let bytes = std::fs::read(&path).map_err(|e| RegistryError::StoreCorrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            let decoded =
                codec::decode_collection(&bytes).map_err(|reason| RegistryError::StoreCorrupt {
                    path: path.clone(),
                    reason,
                })?;
            decoded
                .into_iter()
                .map(|r| (r.document_id.clone(), r))
                .collect()
        } else {
            BTreeMap::new()
        };

        tracing::debug!(
            path = %path.display(),
            count = records.len(),
            "loaded document store"
        );

        Ok(Self {
            path,
            records: RwLock::new(records),
            write_lock: Mutex::new(()),
        })
    }

    /// Create or update a record, durably, and return the stored form.
    ///
    /// A payload without a `document_id` (or with an unknown one) becomes a
    /// new record at version 1 with `ingested_at` set now. A payload whose
    /// id matches an existing record becomes the next version: immutable
    /// fields are carried over, the version increments by exactly one, and
    /// the prior entry is replaced (last-write-wins per id).
    ///
    /// Success is only acknowledged after the atomic file swap completes.
    pub fn put(&self, record: DocumentRecord) -> Result<StoredRecord> {
        if record.document_type.trim().is_empty() {
            return Err(RegistryError::validation(
                "document_type",
                "must be present and non-empty",
            ));
        }
        if record.version == Some(0) {
            return Err(RegistryError::validation(
                "version",
                "must be a positive integer",
            ));
        }

        let _writer = self.write_lock.lock().unwrap();

        let mut next = self.records.read().unwrap().clone();

        let existing = record
            .document_id
            .as_deref()
            .and_then(|id| next.get(id).cloned());

        let stored = match existing {
            Some(prev) => StoredRecord {
                document_id: prev.document_id,
                ingested_at: prev.ingested_at,
                version: prev.version + 1,
                tenant_id: record.tenant_id,
                source: record.source,
                issuer: record.issuer,
                product: record.product,
                document_type: record.document_type,
                reporting_period: record.reporting_period,
                language: record.language,
                status: record.status.unwrap_or_default(),
            },
            None => StoredRecord {
                document_id: record
                    .document_id
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
                ingested_at: Utc::now(),
                version: 1,
                tenant_id: record.tenant_id,
                source: record.source,
                issuer: record.issuer,
                product: record.product,
                document_type: record.document_type,
                reporting_period: record.reporting_period,
                language: record.language,
                status: record.status.unwrap_or_default(),
            },
        };

        next.insert(stored.document_id.clone(), stored.clone());
        self.persist(&next)?;

        *self.records.write().unwrap() = next;

        tracing::debug!(
            document_id = %stored.document_id,
            version = stored.version,
            "stored document record"
        );

        Ok(stored)
    }

    /// Retrieve the current record for an id.
    pub fn get(&self, document_id: &str) -> Result<StoredRecord> {
        self.records
            .read()
            .unwrap()
            .get(document_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(document_id.to_string()))
    }

    /// A point-in-time, internally consistent copy of all current records,
    /// ordered by `document_id` ascending. Safe to iterate without holding
    /// any lock on the store; never observes a half-applied write.
    pub fn snapshot(&self) -> Vec<StoredRecord> {
        self.records.read().unwrap().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }

    /// Write the current collection to the backing file, creating it (and
    /// its parent directory) if missing. Idempotent.
    pub fn flush(&self) -> Result<()> {
        let _writer = self.write_lock.lock().unwrap();
        let current = self.records.read().unwrap().clone();
        self.persist(&current)
    }

    fn persist(&self, records: &BTreeMap<String, StoredRecord>) -> Result<()> {
        let collection: Vec<StoredRecord> = records.values().cloned().collect();
        let bytes = codec::encode_collection(&collection)?;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| RegistryError::Durability {
            reason: format!("failed to create {}: {}", dir.display(), e),
        })?;

        // Full write + fsync + atomic rename; the canonical path is never
        // observed in a partially-written state.
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| RegistryError::Durability {
                reason: e.to_string(),
            })?;
        use std::io::Write;
        tmp.write_all(&bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| RegistryError::Durability {
                reason: e.to_string(),
            })?;
        tmp.persist(&self.path).map_err(|e| RegistryError::Durability {
            reason: e.to_string(),
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> DocumentStore {
        DocumentStore::load(dir.path().join("documents.json")).unwrap()
    }

    fn payload(document_type: &str) -> DocumentRecord {
        DocumentRecord {
            document_type: document_type.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn put_assigns_id_version_and_timestamp() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let stored = store.put(payload("factsheet")).unwrap();
        assert!(!stored.document_id.is_empty());
        assert_eq!(stored.version, 1);
        assert_eq!(stored.status, crate::models::DocumentStatus::Received);
    }

    #[test]
    fn put_rejects_blank_document_type() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let err = store.put(payload("  ")).unwrap_err();
        assert!(matches!(err, RegistryError::Validation { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn update_increments_version_and_keeps_identity() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let first = store.put(payload("factsheet")).unwrap();

        let mut update = payload("factsheet");
        update.document_id = Some(first.document_id.clone());
        update.issuer = Some("Acme Capital Group".to_string());
        let second = store.put(update).unwrap();

        assert_eq!(second.document_id, first.document_id);
        assert_eq!(second.version, 2);
        assert_eq!(second.ingested_at, first.ingested_at);
        assert_eq!(second.issuer.as_deref(), Some("Acme Capital Group"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn put_with_unknown_id_creates_at_version_one() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let mut record = payload("report");
        record.document_id = Some("caller-chosen".to_string());
        let stored = store.put(record).unwrap();
        assert_eq!(stored.document_id, "caller-chosen");
        assert_eq!(stored.version, 1);
    }

    #[test]
    fn get_misses_with_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let err = store.get("nope").unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }

    #[test]
    fn snapshot_is_ordered_by_id() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        for id in ["zeta", "alpha", "mid"] {
            let mut record = payload("report");
            record.document_id = Some(id.to_string());
            store.put(record).unwrap();
        }

        let ids: Vec<String> = store
            .snapshot()
            .into_iter()
            .map(|r| r.document_id)
            .collect();
        assert_eq!(ids, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn reload_sees_persisted_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("documents.json");

        let stored = {
            let store = DocumentStore::load(&path).unwrap();
            store.put(payload("factsheet")).unwrap()
        };

        let reloaded = DocumentStore::load(&path).unwrap();
        let found = reloaded.get(&stored.document_id).unwrap();
        assert_eq!(found.version, 1);
        assert_eq!(found.document_type, "factsheet");
    }

    #[test]
    fn missing_file_is_an_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::load(dir.path().join("absent.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_file_fails_fast() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("documents.json");
        std::fs::write(&path, b"{definitely not a collection").unwrap();

        let err = DocumentStore::load(&path).unwrap_err();
        assert!(matches!(err, RegistryError::StoreCorrupt { .. }));
    }

    #[test]
    fn failed_swap_leaves_visible_state_untouched() {
        let dir = TempDir::new().unwrap();
        // A regular file where the store directory should be makes the
        // durable-write phase fail for every put.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let store = DocumentStore::load(blocker.join("documents.json")).unwrap();

        let err = store.put(payload("factsheet")).unwrap_err();
        assert!(matches!(err, RegistryError::Durability { .. }));
        assert!(store.is_empty());
    }
}
