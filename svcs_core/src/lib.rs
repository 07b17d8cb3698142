//! # SVCS Core
//!
//! A minimal, single-user version control system for a flat set of files.
//!
//! Tracked files are snapshotted on demand into directories named by the
//! SHA-256 of their concatenated contents. Each commit gets a record in an
//! append-only, human-readable log, and any past snapshot can be restored
//! over the work tree.
//!
//! ## Layout
//!
//! - `config.txt`: author name
//! - `index.txt`: tracked paths, one per line
//! - `log.txt`: commit records separated by blank lines
//! - `commits/<id>/`: full copy of the tracked files for each commit
//!
//! ## Example
//!
//! ```no_run
//! use svcs_core::{CommitOutcome, RepoPaths, Repository};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = Repository::open(RepoPaths::in_work_tree("."))?;
//! repo.author().set("Alice")?;
//! repo.track("a.txt")?;
//!
//! if let CommitOutcome::Committed(summary) = repo.commit("first")? {
//!     println!("created {}", summary.id);
//!     repo.checkout(&summary.id.to_hex())?;
//! }
//! # Ok(())
//! # }
//! ```

mod checkout;
mod config;
mod error;
mod hash;
mod history;
mod index;
mod repo;
mod snapshot;

pub use checkout::CheckoutReport;
pub use config::AuthorConfig;
pub use error::{Error, Result};
pub use hash::{CommitDigest, CommitId, HASH_SIZE, compute_commit_id};
pub use history::{History, HistoryRecord, render_log};
pub use index::TrackedFiles;
pub use repo::{CommitOutcome, CommitSummary, DEFAULT_VCS_DIR, RepoPaths, Repository};
pub use snapshot::{MANIFEST_NAME, Manifest, ManifestEntry, Snapshot, SnapshotStore, StagedSnapshot};
