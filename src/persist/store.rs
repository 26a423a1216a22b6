use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a valid record file: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record `{key}` could not be converted: {source}")]
    Convert {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String-keyed JSON records
pub trait RecordStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;
    fn delete(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Records kept only for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Map<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.records.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.records.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.records.remove(key);
        Ok(())
    }
}

/// One JSON object on disk, rewritten after every change
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: Map<String, Value>,
}

impl JsonFileStore {
    /// Open the store; a missing file starts empty
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match fs::read_to_string(&path) {
            Ok(json) if json.trim().is_empty() => Map::new(),
            Ok(json) => serde_json::from_str(&json).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        // Create parent directories if needed
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(&self.records).map_err(|source| StoreError::Convert {
            key: self.path.display().to_string(),
            source,
        })?;
        // Write beside the target then swap it in
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)
    }
}

impl RecordStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.records.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.records.insert(key.to_string(), value);
        self.flush()
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        if self.records.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
