//! JSON document stored as a single file.

use std::fs;
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use super::StoreError;

/// A JSON document persisted as one file and always read or replaced whole.
///
/// An absent file loads as `T::default()`. A file that exists but cannot be
/// read or parsed is an error, so a transient failure never looks like an
/// empty history to callers.
///
/// Saves go through a temporary file in the same directory that is renamed
/// over the target, so readers see either the old or the new document.
pub struct JsonDocument<T> {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the last saved document.
    pub fn load(&self) -> Result<T, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Document absent, using default");
                return Ok(T::default());
            }
            Err(source) => {
                tracing::error!(path = %self.path.display(), error = %source, "Failed to read document");
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| {
            tracing::error!(path = %self.path.display(), error = %source, "Document is corrupt");
            StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Replace the stored document.
    pub fn save(&self, document: &T) -> Result<(), StoreError> {
        let mut bytes =
            serde_json::to_vec_pretty(document).map_err(|source| StoreError::Encode {
                path: self.path.clone(),
                source,
            })?;
        bytes.push(b'\n');

        self.write_atomically(&bytes).map_err(|source| {
            tracing::error!(path = %self.path.display(), error = %source, "Failed to save document");
            StoreError::Write {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Load, mutate and save the document as one step.
    ///
    /// The document is only written back if `mutate` succeeds.
    pub fn update<R, E>(&self, mutate: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut document = self.load()?;
        let result = mutate(&mut document)?;
        self.save(&document)?;
        Ok(result)
    }

    fn write_atomically(&self, bytes: &[u8]) -> std::io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}
