//! Save/load port
//!
//! Settings and the leaderboard are stored as JSON through [`Store`]:
//! - `JsonFileStore` writes `<path>.tmp` then renames it over the target
//! - `MemoryStore` keeps the serialized value in memory (tests, demos)
//!
//! A missing file is not an error; it loads as `None`.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed stored data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store path {0:?} has no file name")]
    BadPath(PathBuf),
}

/// Load/save contract for one persisted value
pub trait Store<T> {
    /// `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<T>, PersistenceError>;
    fn save(&mut self, value: &T) -> Result<(), PersistenceError>;
}

/// Load a value, falling back to its default on absence or failure
pub fn load_or_default<T: Default, S: Store<T> + ?Sized>(store: &S) -> T {
    match store.load() {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            log::warn!("Failed to load stored value, using defaults: {e}");
            T::default()
        }
    }
}

/// JSON document on the local filesystem
#[derive(Debug, Clone)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    _value: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _value: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> Result<PathBuf, PersistenceError> {
        let name = self
            .path
            .file_name()
            .ok_or_else(|| PersistenceError::BadPath(self.path.clone()))?;
        let mut tmp_name = OsString::from(name);
        tmp_name.push(".tmp");
        Ok(self.path.with_file_name(tmp_name))
    }
}

impl<T: Serialize + DeserializeOwned> Store<T> for JsonFileStore<T> {
    fn load(&self) -> Result<Option<T>, PersistenceError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = serde_json::from_str(&json)?;
        log::info!("Loaded {}", self.path.display());
        Ok(Some(value))
    }

    fn save(&mut self, value: &T) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.tmp_path()?;
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        log::info!("Saved {}", self.path.display());
        Ok(())
    }
}

/// In-memory store holding the serialized form, so values round-trip
/// through serde exactly like the file store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    json: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored document, if any
    pub fn raw(&self) -> Option<&str> {
        self.json.as_deref()
    }

    /// Store a raw document (e.g. to emulate corruption)
    pub fn set_raw(&mut self, json: impl Into<String>) {
        self.json = Some(json.into());
    }
}

impl<T: Serialize + DeserializeOwned> Store<T> for MemoryStore {
    fn load(&self) -> Result<Option<T>, PersistenceError> {
        match &self.json {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, value: &T) -> Result<(), PersistenceError> {
        self.json = Some(serde_json::to_string(value)?);
        Ok(())
    }
}
