//! Repository layout and the commit workflow.

use crate::config::AuthorConfig;
use crate::error::{Error, Result};
use crate::hash::{CommitId, compute_commit_id};
use crate::history::{History, HistoryRecord};
use crate::index::TrackedFiles;
use crate::snapshot::SnapshotStore;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default name of the repository directory inside the work tree.
pub const DEFAULT_VCS_DIR: &str = "vcs";

const CONFIG_FILE: &str = "config.txt";
const INDEX_FILE: &str = "index.txt";
const LOG_FILE: &str = "log.txt";
const COMMITS_DIR: &str = "commits";

/// Where the repository lives and which directory it versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPaths {
    /// Directory holding `config.txt`, `index.txt`, `log.txt` and `commits/`.
    pub vcs_dir: PathBuf,
    /// Working area that tracked paths are relative to.
    pub work_tree: PathBuf,
}

impl RepoPaths {
    pub fn new(vcs_dir: impl Into<PathBuf>, work_tree: impl Into<PathBuf>) -> Self {
        Self {
            vcs_dir: vcs_dir.into(),
            work_tree: work_tree.into(),
        }
    }

    /// Repository in `<work_tree>/vcs`.
    pub fn in_work_tree(work_tree: impl Into<PathBuf>) -> Self {
        let work_tree = work_tree.into();
        Self {
            vcs_dir: work_tree.join(DEFAULT_VCS_DIR),
            work_tree,
        }
    }
}

/// Outcome of [`Repository::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new snapshot and history record were written.
    Committed(CommitSummary),
    /// Nothing readable was tracked, or the content matches an existing commit.
    NothingToCommit,
}

/// Details of a newly created commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub id: CommitId,
    pub author: String,
    pub message: String,
    /// Number of files stored in the snapshot.
    pub files: usize,
    /// Tracked paths left out because they could not be read.
    pub skipped: Vec<String>,
}

/// A version-controlled work tree.
#[derive(Debug)]
pub struct Repository {
    paths: RepoPaths,
}

impl Repository {
    /// Open the repository at `paths`, creating its directory layout if needed.
    pub fn open(paths: RepoPaths) -> Result<Self> {
        let commits_dir = paths.vcs_dir.join(COMMITS_DIR);
        fs::create_dir_all(&commits_dir).map_err(|e| Error::path_io(&commits_dir, e))?;

        debug!(
            vcs_dir = %paths.vcs_dir.display(),
            work_tree = %paths.work_tree.display(),
            "opened repository"
        );
        Ok(Self { paths })
    }

    pub fn vcs_dir(&self) -> &Path {
        &self.paths.vcs_dir
    }

    pub fn work_tree(&self) -> &Path {
        &self.paths.work_tree
    }

    /// The author name store.
    pub fn author(&self) -> AuthorConfig {
        AuthorConfig::new(self.paths.vcs_dir.join(CONFIG_FILE))
    }

    /// The tracked file list.
    pub fn tracked(&self) -> TrackedFiles {
        TrackedFiles::new(self.paths.vcs_dir.join(INDEX_FILE), &self.paths.work_tree)
    }

    /// The snapshot store.
    pub fn snapshots(&self) -> SnapshotStore {
        SnapshotStore::new(self.paths.vcs_dir.join(COMMITS_DIR))
    }

    /// The commit log.
    pub fn history(&self) -> History {
        History::new(self.paths.vcs_dir.join(LOG_FILE))
    }

    /// Start tracking `path`.
    pub fn track(&self, path: &str) -> Result<()> {
        self.tracked().add(path)
    }

    /// Tracked paths in insertion order.
    pub fn tracked_paths(&self) -> Result<Vec<String>> {
        self.tracked().list()
    }

    /// Snapshot the tracked files and record the commit.
    ///
    /// The snapshot is staged first, the history record appended next, and
    /// the staged directory moved into place last, so `commits/<id>` only
    /// ever appears fully written and with its record in the log.
    pub fn commit(&self, message: &str) -> Result<CommitOutcome> {
        let author = self.author().require()?;
        let paths = self.tracked().require()?;

        let digest = compute_commit_id(&self.paths.work_tree, &paths)?;
        if !digest.is_ok() {
            debug!("no tracked file could be read");
            return Ok(CommitOutcome::NothingToCommit);
        }

        let snapshots = self.snapshots();
        if snapshots.exists(&digest.id) {
            debug!(id = %digest.id, "content matches an existing commit");
            return Ok(CommitOutcome::NothingToCommit);
        }

        let stale = snapshots.clean_staging()?;
        if stale > 0 {
            debug!(stale, "removed leftover staging directories");
        }

        let staged = snapshots.stage(&self.paths.work_tree, &paths)?;
        let files = staged.manifest().entries().len();
        let skipped = staged.skipped().to_vec();

        let record = HistoryRecord::new(digest.id, author, message);
        self.history().append(&record)?;

        staged.persist(&snapshots, &digest.id)?;
        info!(id = %digest.id, files, "created commit");

        Ok(CommitOutcome::Committed(CommitSummary {
            id: digest.id,
            author: record.author,
            message: record.message,
            files,
            skipped,
        }))
    }

    /// Commit history, newest first.
    ///
    /// Records whose snapshot is missing belong to interrupted commits and
    /// are not listed. When an interrupted commit was later completed, only
    /// the latest record for that id is shown.
    pub fn log(&self) -> Result<Vec<HistoryRecord>> {
        let snapshots = self.snapshots();
        let mut seen = HashSet::new();
        let records = self
            .history()
            .read_newest_first()?
            .into_iter()
            .filter(|record| snapshots.exists(&record.id))
            .filter(|record| seen.insert(record.id))
            .collect();
        Ok(records)
    }
}
