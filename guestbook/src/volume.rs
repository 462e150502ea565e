//! Sequential id marker on a mounted volume
//!
//! Each append writes `last id + 1` on its own line. Reading the file back
//! after a pod restart shows whether the volume outlived the pod.

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::Mutex;

/// Errors touching the marker file
#[derive(Debug, thiserror::Error)]
pub enum VolumeError {
    /// Filesystem error
    #[error("volume marker {path}: {source}")]
    Io {
        /// marker file
        path: PathBuf,
        /// underlying error
        #[source]
        source: io::Error,
    },
    /// The blocking task running the file I/O died
    #[error("volume marker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Handle to the marker file. Clones share the append lock.
#[derive(Debug, Clone)]
pub struct VolumeMarker {
    path: Arc<PathBuf>,
    append_lock: Arc<Mutex<()>>,
}

impl VolumeMarker {
    /// Marker stored at `path`; nothing is touched until the first append
    pub fn new(path: impl Into<PathBuf>) -> Self {
        VolumeMarker {
            path: Arc::new(path.into()),
            append_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Location of the marker file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends the next id, creating the file and its parent directories as
    /// needed, and returns it. The first id is 1.
    pub async fn append_next(&self) -> Result<u64, VolumeError> {
        let _guard = self.append_lock.lock().await;
        let path = Arc::clone(&self.path);
        let appended = tokio::task::spawn_blocking(move || append_next(&path)).await?;
        appended.map_err(|source| self.io_error(source))
    }

    /// Every id in the file, oldest first. A missing file holds no ids.
    pub async fn read_all(&self) -> Result<Vec<u64>, VolumeError> {
        let path = Arc::clone(&self.path);
        let contents = tokio::task::spawn_blocking(move || read_contents(&path)).await?;
        contents
            .map(|contents| parse_ids(&contents))
            .map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: io::Error) -> VolumeError {
        VolumeError::Io {
            path: self.path.to_path_buf(),
            source,
        }
    }
}

fn read_contents(path: &Path) -> io::Result<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(err),
    }
}

// blank and non-numeric lines are ignored
fn parse_ids(contents: &str) -> Vec<u64> {
    contents
        .lines()
        .filter_map(|line| line.trim().parse().ok())
        .collect()
}

fn append_next(path: &Path) -> io::Result<u64> {
    let contents = read_contents(path)?;
    let next = parse_ids(&contents).last().map_or(1, |last| last + 1);
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if !contents.is_empty() && !contents.ends_with('\n') {
        writeln!(file)?;
    }
    writeln!(file, "{}", next)?;
    Ok(next)
}
