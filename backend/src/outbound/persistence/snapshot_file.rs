//! JSON snapshot files read and written through `cap-std` directories.
//!
//! Writes go to a uniquely named staging file in the target directory which
//! is then renamed over the destination, so readers never observe a partially
//! written snapshot.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use super::snapshot::MappingSnapshot;

/// Errors raised while reading or writing snapshot files.
#[derive(Debug, Error)]
pub enum SnapshotFileError {
    /// The file or its directory could not be accessed.
    #[error("snapshot io failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file did not contain a valid snapshot.
    #[error("snapshot at {path} is malformed: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The snapshot could not be encoded.
    #[error("snapshot encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
    /// The path does not name a file.
    #[error("snapshot path {0} must name a file")]
    NotAFile(PathBuf),
}

impl SnapshotFileError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn split_path(path: &Path) -> Result<(&Path, &Path), SnapshotFileError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| SnapshotFileError::NotAFile(path.to_path_buf()))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok((parent, Path::new(file_name)))
}

/// Read a snapshot, returning `None` when the file does not exist.
pub fn load_snapshot(path: &Path) -> Result<Option<MappingSnapshot>, SnapshotFileError> {
    let (parent, file_name) = split_path(path)?;
    let dir = match Dir::open_ambient_dir(parent, ambient_authority()) {
        Ok(dir) => dir,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(SnapshotFileError::io(parent, error)),
    };
    let contents = match dir.read_to_string(file_name) {
        Ok(contents) => contents,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no snapshot file; starting empty");
            return Ok(None);
        }
        Err(error) => return Err(SnapshotFileError::io(path, error)),
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| SnapshotFileError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Atomically replace the snapshot at `path`, creating parent directories.
pub fn store_snapshot(path: &Path, snapshot: &MappingSnapshot) -> Result<(), SnapshotFileError> {
    let (parent, file_name) = split_path(path)?;
    let payload = serde_json::to_vec_pretty(snapshot).map_err(SnapshotFileError::Encode)?;

    Dir::create_ambient_dir_all(parent, ambient_authority())
        .map_err(|error| SnapshotFileError::io(parent, error))?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .map_err(|error| SnapshotFileError::io(parent, error))?;

    let staging_name = PathBuf::from(format!(".tmp-mapping-snapshot-{}", Uuid::new_v4().simple()));
    if let Err(error) = dir.write(&staging_name, &payload) {
        let _cleanup_result = dir.remove_file(&staging_name);
        return Err(SnapshotFileError::io(&parent.join(&staging_name), error));
    }
    if let Err(error) = dir.rename(&staging_name, &dir, file_name) {
        let _cleanup_result = dir.remove_file(&staging_name);
        return Err(SnapshotFileError::io(path, error));
    }
    debug!(path = %path.display(), "snapshot stored");
    Ok(())
}
