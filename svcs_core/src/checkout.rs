//! Restoring tracked files from a snapshot.

use crate::error::{Error, Result};
use crate::hash::CommitId;
use crate::repo::Repository;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// What a checkout did to the work tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutReport {
    pub id: CommitId,
    /// Tracked paths overwritten from the snapshot.
    pub restored: Vec<String>,
    /// Tracked paths the snapshot has no copy of; left as they are.
    pub untouched: Vec<String>,
}

impl Repository {
    /// Overwrite tracked files in the work tree with their copies from commit `id`.
    ///
    /// Every copy is read before any work tree file is written. If the
    /// commit does not exist nothing is touched. Tracked files without a
    /// copy in the snapshot are left alone, never deleted.
    pub fn checkout(&self, id: &str) -> Result<CheckoutReport> {
        let commit_id = CommitId::from_hex(id).map_err(|_| Error::commit_not_found(id))?;
        let snapshot = self.snapshots().open(&commit_id)?;
        let paths = self.tracked().require()?;

        let mut pending: Vec<(String, PathBuf, Vec<u8>)> = Vec::new();
        let mut untouched = Vec::new();

        for path in paths {
            if pending.iter().any(|(done, _, _)| *done == path) || untouched.contains(&path) {
                continue;
            }

            match snapshot.lookup(&path) {
                Some(source) => {
                    let content = fs::read(&source).map_err(|e| Error::path_io(&source, e))?;
                    let dest = self.work_tree().join(&path);
                    pending.push((path, dest, content));
                }
                None => {
                    debug!(path = %path, "no copy in snapshot, leaving file as is");
                    untouched.push(path);
                }
            }
        }

        let mut restored = Vec::with_capacity(pending.len());
        for (path, dest, content) in pending {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::path_io(parent, e))?;
            }
            fs::write(&dest, content).map_err(|e| Error::path_io(&dest, e))?;
            debug!(path = %path, "restored");
            restored.push(path);
        }

        info!(id = %commit_id, restored = restored.len(), "checked out commit");
        Ok(CheckoutReport {
            id: commit_id,
            restored,
            untouched,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::repo::{CommitOutcome, RepoPaths, Repository};
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Repository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::open(RepoPaths::in_work_tree(temp_dir.path())).unwrap();
        repo.author().set("Alice").unwrap();
        (temp_dir, repo)
    }

    fn commit(repo: &Repository, message: &str) -> String {
        match repo.commit(message).unwrap() {
            CommitOutcome::Committed(summary) => summary.id.to_hex(),
            CommitOutcome::NothingToCommit => panic!("expected a commit"),
        }
    }

    #[test]
    fn test_checkout_restores_content() {
        let (temp_dir, repo) = setup();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, b"A").unwrap();
        repo.track("a.txt").unwrap();

        let first = commit(&repo, "first");
        fs::write(&file, b"B").unwrap();
        let second = commit(&repo, "second");
        assert_ne!(first, second);

        let report = repo.checkout(&first).unwrap();
        assert_eq!(report.id.to_hex(), first);
        assert_eq!(report.restored, vec!["a.txt".to_string()]);
        assert_eq!(fs::read(&file).unwrap(), b"A");

        repo.checkout(&second).unwrap();
        assert_eq!(fs::read(&file).unwrap(), b"B");
    }

    #[test]
    fn test_checkout_missing_commit_changes_nothing() {
        let (temp_dir, repo) = setup();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, b"A").unwrap();
        repo.track("a.txt").unwrap();
        commit(&repo, "first");
        fs::write(&file, b"edited").unwrap();

        let err = repo.checkout(&"0".repeat(64)).unwrap_err();
        assert!(matches!(err, Error::CommitNotFound { .. }));
        assert_eq!(err.to_string(), "Commit does not exist.");
        assert_eq!(fs::read(&file).unwrap(), b"edited");
    }

    #[test]
    fn test_checkout_malformed_id() {
        let (_temp_dir, repo) = setup();

        let not_hex = "g".repeat(64);
        for id in ["", "abc", "../../etc", not_hex.as_str()] {
            let err = repo.checkout(id).unwrap_err();
            assert!(matches!(err, Error::CommitNotFound { .. }));
        }
    }

    #[test]
    fn test_checkout_without_tracked_files() {
        let (temp_dir, repo) = setup();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, b"A").unwrap();
        repo.track("a.txt").unwrap();
        let id = commit(&repo, "first");

        fs::remove_file(repo.tracked().path()).unwrap();
        let err = repo.checkout(&id).unwrap_err();
        assert!(matches!(err, Error::NothingTracked));
    }

    #[test]
    fn test_checkout_leaves_files_added_later() {
        let (temp_dir, repo) = setup();
        let a = temp_dir.path().join("a.txt");
        let b = temp_dir.path().join("b.txt");
        fs::write(&a, b"A1").unwrap();
        repo.track("a.txt").unwrap();
        let first = commit(&repo, "first");

        fs::write(&a, b"A2").unwrap();
        fs::write(&b, b"B2").unwrap();
        repo.track("b.txt").unwrap();
        commit(&repo, "second");

        let report = repo.checkout(&first).unwrap();
        assert_eq!(report.untouched, vec!["b.txt".to_string()]);
        assert_eq!(fs::read(&a).unwrap(), b"A1");
        assert_eq!(fs::read(&b).unwrap(), b"B2");
    }

    #[test]
    fn test_checkout_recreates_deleted_file() {
        let (temp_dir, repo) = setup();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, b"A").unwrap();
        repo.track("a.txt").unwrap();
        let id = commit(&repo, "first");

        fs::remove_file(&file).unwrap();
        repo.checkout(&id).unwrap();
        assert_eq!(fs::read(&file).unwrap(), b"A");
    }

    #[test]
    fn test_checkout_nested_paths_with_shared_base_name() {
        let (temp_dir, repo) = setup();
        let work = temp_dir.path();
        fs::create_dir_all(work.join("x")).unwrap();
        fs::create_dir_all(work.join("y")).unwrap();
        fs::write(work.join("x/notes.txt"), b"x1").unwrap();
        fs::write(work.join("y/notes.txt"), b"y1").unwrap();
        repo.track("x/notes.txt").unwrap();
        repo.track("y/notes.txt").unwrap();
        let id = commit(&repo, "first");

        fs::write(work.join("x/notes.txt"), b"x2").unwrap();
        fs::write(work.join("y/notes.txt"), b"y2").unwrap();
        repo.checkout(&id).unwrap();

        assert_eq!(fs::read(work.join("x/notes.txt")).unwrap(), b"x1");
        assert_eq!(fs::read(work.join("y/notes.txt")).unwrap(), b"y1");
    }

    #[test]
    fn test_checkout_snapshot_without_manifest() {
        let (temp_dir, repo) = setup();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, b"current").unwrap();
        repo.track("a.txt").unwrap();

        let id = "ab".repeat(32);
        let dir = repo.snapshots().commits_dir().join(&id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.txt"), b"stored").unwrap();

        repo.checkout(&id).unwrap();
        assert_eq!(fs::read(&file).unwrap(), b"stored");
    }
}
