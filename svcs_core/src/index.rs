//! The tracked file list (`index.txt`).

use crate::error::{Error, Result};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Ordered, append-only list of tracked paths.
///
/// Paths are stored verbatim, one per line, in the order they were added.
/// Duplicates are kept. There is no removal.
#[derive(Debug)]
pub struct TrackedFiles {
    path: PathBuf,
    work_tree: PathBuf,
}

impl TrackedFiles {
    /// Create a handle for the index file at `path`; tracked paths resolve against `work_tree`.
    pub fn new(path: impl Into<PathBuf>, work_tree: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            work_tree: work_tree.into(),
        }
    }

    /// Path of the index file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start tracking `path`.
    ///
    /// Fails with [`Error::PathNotFound`] if nothing exists at `path` right now.
    pub fn add(&self, path: &str) -> Result<()> {
        if path.is_empty() || !self.work_tree.join(path).exists() {
            return Err(Error::path_not_found(path));
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::path_io(&self.path, e))?;
        writeln!(file, "{}", path).map_err(|e| Error::path_io(&self.path, e))?;
        file.flush()?;

        debug!(path = %path, "tracking file");
        Ok(())
    }

    /// All tracked paths in insertion order. Empty means nothing is tracked.
    pub fn list(&self) -> Result<Vec<String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::path_io(&self.path, e)),
        };

        Ok(parse_index(&content))
    }

    /// Like [`list`](Self::list), but an empty list is [`Error::NothingTracked`].
    pub fn require(&self) -> Result<Vec<String>> {
        let paths = self.list()?;
        if paths.is_empty() {
            return Err(Error::NothingTracked);
        }
        Ok(paths)
    }
}

fn parse_index(content: &str) -> Vec<String> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
