use std::{
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use taskmate_core::storage::{StateStore, StateStoreError};
use tempfile::NamedTempFile;
use tracing::instrument;

/// File-backed store implementing the shared `StateStore` contract: each key
/// maps to one `<key>.json` file under the root directory. Writes go through
/// a named temp file in the same directory followed by a rename, so a crash
/// mid-write never leaves a torn file behind.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

impl StateStore for JsonFileStore {
    #[instrument(skip_all, fields(key))]
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StateStoreError> {
        let path = self.path_for(key);
        write_atomic(&path, value)
    }

    #[instrument(skip_all, fields(key))]
    fn get(&self, key: &str) -> Result<Vec<u8>, StateStoreError> {
        let path = self.path_for(key);
        read_bytes(&path, key)
    }

    #[instrument(skip_all, fields(key))]
    fn delete(&self, key: &str) -> Result<(), StateStoreError> {
        let path = self.path_for(key);
        match fs::remove_file(path) {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_err(err)),
        }
    }
}

fn write_atomic(path: &Path, value: &[u8]) -> Result<(), StateStoreError> {
    let parent = path.parent().ok_or_else(|| StateStoreError::Storage {
        reason: "invalid storage path".to_string(),
    })?;
    fs::create_dir_all(parent).map_err(storage_err)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(storage_err)?;
    tmp.write_all(value).map_err(storage_err)?;
    tmp.flush().map_err(storage_err)?;
    tmp.persist(path).map_err(|e| storage_err(e.error))?;
    Ok(())
}

fn read_bytes(path: &Path, key: &str) -> Result<Vec<u8>, StateStoreError> {
    let mut file = File::open(path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            StateStoreError::NotFound {
                key: key.to_string(),
            }
        } else {
            storage_err(err)
        }
    })?;

    let mut buf = Vec::new();
    file.read_to_end(&mut buf).map_err(storage_err)?;
    Ok(buf)
}

/// Keys become file names; anything outside a conservative character set is
/// replaced so a key can never escape the root directory.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn storage_err<E: ToString>(err: E) -> StateStoreError {
    StateStoreError::Storage {
        reason: err.to_string(),
    }
}
