//! Snapshot storage: one directory per commit under `commits/`.
//!
//! A snapshot directory holds a full copy of every tracked file that was
//! readable at commit time, plus a `.manifest` mapping each tracked path to
//! the file name it was stored under:
//!
//! ```text
//! a.txt	a.txt
//! a.txt.1	docs/a.txt
//! ```
//!
//! Directories without a manifest are looked up by base name.

use crate::error::{Error, Result};
use crate::hash::{CommitId, open_regular};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the manifest file inside a snapshot directory.
pub const MANIFEST_NAME: &str = ".manifest";

/// Prefix for snapshot directories that have not been committed yet.
const STAGING_PREFIX: &str = ".staging-";

/// A stored file inside a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// File name inside the snapshot directory.
    pub blob: String,
    /// Tracked path as written in the index.
    pub path: String,
}

/// Mapping from tracked paths to stored files, in tracked-list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Stored file name for a tracked path.
    pub fn blob_for(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.path == path)
            .map(|entry| entry.blob.as_str())
    }

    fn contains_path(&self, path: &str) -> bool {
        self.blob_for(path).is_some()
    }

    /// Pick a free file name for `path`: its base name, or `<base>.<n>` when
    /// the base name is taken.
    fn allocate_blob(&self, path: &str) -> String {
        let base = Path::new(path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("file")
            .replace('\t', "_");
        let base = base.as_str();

        let taken: HashSet<&str> = self
            .entries
            .iter()
            .map(|entry| entry.blob.as_str())
            .chain(std::iter::once(MANIFEST_NAME))
            .collect();

        if !taken.contains(base) {
            return base.to_string();
        }

        (1..)
            .map(|n| format!("{}.{}", base, n))
            .find(|candidate| !taken.contains(candidate.as_str()))
            .unwrap_or_else(|| base.to_string())
    }

    /// Serialize to the tab-separated manifest format.
    pub fn encode(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{}\t{}\n", entry.blob, entry.path))
            .collect()
    }

    /// Parse the tab-separated manifest format.
    pub fn decode(content: &str, source: &Path) -> Result<Self> {
        let mut entries = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.is_empty() {
                continue;
            }

            let (blob, path) = line.split_once('\t').ok_or_else(|| {
                Error::corrupted_manifest(source, format!("line {}: missing tab", lineno + 1))
            })?;

            if blob.is_empty() || blob == "." || blob == ".." || blob.contains(['/', '\\']) {
                return Err(Error::corrupted_manifest(
                    source,
                    format!("line {}: invalid blob name '{}'", lineno + 1, blob),
                ));
            }

            entries.push(ManifestEntry {
                blob: blob.to_string(),
                path: path.to_string(),
            });
        }
        Ok(Self { entries })
    }
}

/// Directory-per-commit snapshot store.
#[derive(Debug)]
pub struct SnapshotStore {
    commits_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(commits_dir: impl Into<PathBuf>) -> Self {
        Self {
            commits_dir: commits_dir.into(),
        }
    }

    /// Directory holding all snapshots.
    pub fn commits_dir(&self) -> &Path {
        &self.commits_dir
    }

    /// Path of the snapshot directory for `id`.
    ///
    /// Returns: `commits/{id}`
    pub fn snapshot_path(&self, id: &CommitId) -> PathBuf {
        self.commits_dir.join(id.to_hex())
    }

    /// Whether a snapshot for `id` has been committed.
    pub fn exists(&self, id: &CommitId) -> bool {
        self.snapshot_path(id).is_dir()
    }

    /// Copy every readable tracked file into a fresh staging directory.
    ///
    /// Nothing is visible under `commits/<id>` until
    /// [`StagedSnapshot::persist`] is called; dropping the staged snapshot
    /// removes the staging directory.
    pub fn stage(&self, work_tree: &Path, paths: &[String]) -> Result<StagedSnapshot> {
        fs::create_dir_all(&self.commits_dir)
            .map_err(|e| Error::path_io(&self.commits_dir, e))?;

        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.commits_dir)?;

        let mut manifest = Manifest::default();
        let mut skipped = Vec::new();

        for path in paths {
            if manifest.contains_path(path) {
                continue;
            }

            let source = work_tree.join(path);
            let mut reader = match open_regular(&source) {
                Ok(file) => file,
                Err(e) => {
                    warn!(path = %path, error = %e, "not snapshotting unreadable tracked file");
                    skipped.push(path.clone());
                    continue;
                }
            };

            let blob = manifest.allocate_blob(path);
            let dest = dir.path().join(&blob);
            let mut writer = fs::File::create(&dest).map_err(|e| Error::path_io(&dest, e))?;
            io::copy(&mut reader, &mut writer).map_err(|e| Error::path_io(&source, e))?;

            debug!(path = %path, blob = %blob, "staged tracked file");
            manifest.entries.push(ManifestEntry {
                blob,
                path: path.clone(),
            });
        }

        let manifest_path = dir.path().join(MANIFEST_NAME);
        fs::write(&manifest_path, manifest.encode())
            .map_err(|e| Error::path_io(&manifest_path, e))?;

        Ok(StagedSnapshot {
            dir,
            manifest,
            skipped,
        })
    }

    /// Open the committed snapshot for `id`.
    pub fn open(&self, id: &CommitId) -> Result<Snapshot> {
        let dir = self.snapshot_path(id);
        if !dir.is_dir() {
            return Err(Error::commit_not_found(id.to_hex()));
        }

        let manifest_path = dir.join(MANIFEST_NAME);
        let manifest = match fs::read_to_string(&manifest_path) {
            Ok(content) => Some(Manifest::decode(&content, &manifest_path)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(Error::path_io(&manifest_path, e)),
        };

        Ok(Snapshot { dir, manifest })
    }

    /// Remove staging directories left behind by interrupted commits.
    pub fn clean_staging(&self) -> Result<usize> {
        let entries = match fs::read_dir(&self.commits_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(Error::path_io(&self.commits_dir, e)),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry?;
            let is_staging = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(STAGING_PREFIX));
            if is_staging && entry.file_type()?.is_dir() {
                fs::remove_dir_all(entry.path())?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Snapshot written to a staging directory, not yet committed.
#[derive(Debug)]
pub struct StagedSnapshot {
    dir: tempfile::TempDir,
    manifest: Manifest,
    skipped: Vec<String>,
}

impl StagedSnapshot {
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Tracked paths that could not be read while staging.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Atomically move the staged files to `commits/<id>`.
    pub fn persist(self, store: &SnapshotStore, id: &CommitId) -> Result<PathBuf> {
        let dest = store.snapshot_path(id);
        fs::rename(self.dir.path(), &dest).map_err(|e| Error::path_io(&dest, e))?;
        Ok(dest)
    }
}

/// A committed snapshot opened for reading.
#[derive(Debug)]
pub struct Snapshot {
    dir: PathBuf,
    manifest: Option<Manifest>,
}

impl Snapshot {
    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    /// Location of the stored copy of `tracked_path`, if the snapshot has one.
    pub fn lookup(&self, tracked_path: &str) -> Option<PathBuf> {
        let blob = match &self.manifest {
            Some(manifest) => manifest.blob_for(tracked_path)?.to_string(),
            None => Path::new(tracked_path)
                .file_name()?
                .to_str()?
                .to_string(),
        };

        let path = self.dir.join(blob);
        path.is_file().then_some(path)
    }
}
