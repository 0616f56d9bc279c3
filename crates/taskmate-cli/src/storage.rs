use std::path::PathBuf;

use crate::config::Config;
use color_eyre::Result;
use dirs::data_dir;
use taskmate_storage::json_file_store::JsonFileStore;
use tracing::debug;

/// Resolve the default data directory for TaskMate.
pub fn default_data_dir() -> Result<PathBuf> {
    let base = data_dir().ok_or_else(|| color_eyre::eyre::eyre!("no data dir available"))?;
    Ok(base.join("taskmate"))
}

/// Build the durable store, honoring a config override for the data
/// directory. The store is a stateless handle; building several over the
/// same root is cheap and safe.
pub fn store_from_config(config: &Config) -> Result<JsonFileStore> {
    let root = match &config.data_dir {
        Some(root) => {
            debug!(?root, "initializing store (config override)");
            root.clone()
        }
        None => {
            let root = default_data_dir()?;
            debug!(?root, "initializing store");
            root
        }
    };
    Ok(JsonFileStore::new(root))
}

/// Helper for tests to construct a store rooted at a temp dir.
#[cfg(test)]
pub fn test_store(root: impl Into<PathBuf>) -> JsonFileStore {
    JsonFileStore::new(root)
}
