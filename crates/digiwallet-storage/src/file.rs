//! JSON-lines file backend.
//!
//! Each line is one `{"key": ..., "value": ...}` record. The whole file is
//! rewritten on every save through a sibling temporary file and an atomic
//! rename, so a crash mid-write leaves the previous contents intact.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StorageError;
use crate::memory::MemoryStore;
use crate::store::Store;

#[derive(Serialize, Deserialize)]
struct FileRecord {
    key: String,
    value: Value,
}

/// Store persisted to a JSON-lines file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: MemoryStore,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open the store at `path`, loading any records already present.
    ///
    /// A missing file is an empty store. Lines that fail to parse are
    /// skipped with a warning.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = MemoryStore::new();

        if path.exists() {
            let reader = BufReader::new(fs::File::open(&path)?);
            for (line_no, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<FileRecord>(&line) {
                    Ok(rec) if !rec.key.is_empty() => {
                        entries.save_value(&rec.key, rec.value)?;
                    }
                    Ok(_) => {
                        tracing::warn!(path = %path.display(), line = line_no + 1, "skipping record with empty key");
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), line = line_no + 1, error = %e, "skipping unparseable record");
                    }
                }
            }
        }

        tracing::info!(path = %path.display(), entries = entries.len(), "file store opened");

        Ok(Self {
            path,
            entries,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, records: &[(String, Value)]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("jsonl.tmp");
        {
            let mut writer = BufWriter::new(fs::File::create(&tmp)?);
            for (key, value) in records {
                let line = serde_json::to_string(&FileRecord {
                    key: key.clone(),
                    value: value.clone(),
                })
                .map_err(|source| StorageError::Serialization {
                    key: key.clone(),
                    source,
                })?;
                writer.write_all(line.as_bytes())?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Store for FileStore {
    fn save_value(&self, key: &str, value: Value) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::EmptyKey);
        }
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut records = self.entries.snapshot();
        match records.binary_search_by(|(k, _)| k.as_str().cmp(key)) {
            Ok(i) => records[i].1 = value.clone(),
            Err(i) => records.insert(i, (key.to_string(), value.clone())),
        }
        self.persist(&records)?;

        // Memory only changes once the file holds the new value.
        self.entries.save_value(key, value)
    }

    fn load_value(&self, key: &str) -> Result<Value, StorageError> {
        self.entries.load_value(key)
    }

    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.entries.list_keys(prefix)
    }
}
