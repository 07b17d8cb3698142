//! Commit identifiers: SHA-256 over the contents of the tracked files.

use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Digest size in bytes (SHA-256 produces 256-bit hashes).
pub const HASH_SIZE: usize = 32;

/// A 32-byte SHA-256 commit identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommitId([u8; HASH_SIZE]);

impl CommitId {
    /// Create a CommitId from raw bytes.
    pub fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        CommitId(bytes)
    }

    /// Create a CommitId from a hex string (64 hex characters).
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        if hex_str.len() != HASH_SIZE * 2 {
            return Err(Error::invalid_commit_id(format!(
                "Expected {} hex characters, got {}",
                HASH_SIZE * 2,
                hex_str.len()
            )));
        }

        let bytes = hex::decode(hex_str)
            .map_err(|e| Error::invalid_commit_id(format!("Invalid hex: {}", e)))?;

        let mut id = [0u8; HASH_SIZE];
        id.copy_from_slice(&bytes);
        Ok(CommitId(id))
    }

    /// Convert to lowercase hex string (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitId({})", self.to_hex())
    }
}

impl Serialize for CommitId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Result of hashing the tracked files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDigest {
    /// Digest over every readable tracked file, in list order.
    pub id: CommitId,
    /// Number of tracked entries whose bytes went into the digest.
    pub contributed: usize,
    /// Tracked paths that could not be read and were left out.
    pub skipped: Vec<String>,
}

impl CommitDigest {
    /// True when at least one file contributed bytes. A digest of nothing is
    /// never a valid commit.
    pub fn is_ok(&self) -> bool {
        self.contributed > 0
    }
}

/// Compute the commit id for `paths`, resolved against `work_tree`.
///
/// File contents are fed to the hasher back to back, with no names or
/// separators. Paths that cannot be opened as regular files are skipped.
pub fn compute_commit_id(work_tree: &Path, paths: &[String]) -> Result<CommitDigest> {
    let mut hasher = Sha256::new();
    let mut contributed = 0;
    let mut skipped = Vec::new();

    for path in paths {
        let full = work_tree.join(path);
        match open_regular(&full) {
            Ok(mut file) => {
                let n = io::copy(&mut file, &mut hasher).map_err(|e| Error::path_io(&full, e))?;
                debug!(path = %path, bytes = n, "hashed tracked file");
                contributed += 1;
            }
            Err(e) => {
                warn!(path = %path, error = %e, "skipping unreadable tracked file");
                skipped.push(path.clone());
            }
        }
    }

    let id = CommitId::from_bytes(hasher.finalize().into());
    Ok(CommitDigest {
        id,
        contributed,
        skipped,
    })
}

/// Open `path` for reading if it is a regular file.
pub(crate) fn open_regular(path: &Path) -> io::Result<fs::File> {
    let file = fs::File::open(path)?;
    if !file.metadata()?.is_file() {
        return Err(io::Error::other("not a regular file"));
    }
    Ok(file)
}
