// File: src/persistence.rs
use crate::store::{StoreError, StoreState};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Bumped whenever `StoreState` changes shape.
const SNAPSHOT_VERSION: u32 = 1;

/// What actually lands on disk: the store state tagged with its format version.
#[derive(serde::Serialize, serde::Deserialize)]
struct Snapshot {
    version: u32,
    state: StoreState,
}

/// Borrowed twin of [`Snapshot`]; encodes to the same bytes without cloning the state.
#[derive(serde::Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    state: &'a StoreState,
}

/// Writes `state` to `path` atomically: a temp file in the same directory is
/// fully written, then renamed over the target.
pub(crate) fn save_snapshot(state: &StoreState, path: &Path) -> Result<(), StoreError> {
    let parent_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;

    let snapshot = SnapshotRef {
        version: SNAPSHOT_VERSION,
        state,
    };

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        bincode::serialize_into(&mut writer, &snapshot)?;
        writer.flush()?;
    }
    temp_file.as_file().sync_all()?;

    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub(crate) fn load_snapshot(path: &Path) -> Result<StoreState, StoreError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let snapshot: Snapshot = bincode::deserialize_from(reader)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(StoreError::IncompatibleSnapshot {
            found: snapshot.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    Ok(snapshot.state)
}
