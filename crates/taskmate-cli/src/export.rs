use std::{fs, path::Path};

use color_eyre::Result;
use taskmate_core::tasks::Task;
use taskmate_task::TaskStore;

use crate::{config::Config, storage};

/// Default export file name.
pub const DEFAULT_EXPORT_FILE: &str = "mytasks.json";

/// Writes a read-only snapshot of the collection as pretty JSON. There is no
/// re-import path; `task add --id` covers one-off imports.
pub fn write_snapshot(tasks: &[Task], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(tasks)?;
    fs::write(path, json)?;
    Ok(())
}

/// `export` subcommand: snapshot the persisted collection to `path`.
pub fn run(config: &Config, path: &Path) -> Result<()> {
    let store = TaskStore::open(storage::store_from_config(config)?);
    write_snapshot(store.all(), path)?;
    println!("Exported {} tasks to {}", store.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskmate_core::tasks::TaskDraft;

    #[test]
    fn snapshot_round_trips_through_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = TaskStore::open(storage::test_store(dir.path()));
        store.create(TaskDraft::titled("first")).expect("create");
        store.create(TaskDraft::titled("second")).expect("create");

        let path = dir.path().join(DEFAULT_EXPORT_FILE);
        write_snapshot(store.all(), &path).expect("export");

        let json = fs::read_to_string(&path).expect("read");
        let restored: Vec<Task> = serde_json::from_str(&json).expect("parse");
        assert_eq!(restored, store.all());
    }
}
