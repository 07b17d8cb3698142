//! Author name store (`config.txt`).

use crate::error::{Error, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Single-value store holding the current author name.
#[derive(Debug)]
pub struct AuthorConfig {
    path: PathBuf,
}

impl AuthorConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current author, trimmed. A missing or blank file means no author.
    pub fn get(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let name = single_line(&content);
                Ok((!name.is_empty()).then_some(name))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::path_io(&self.path, e)),
        }
    }

    /// Like [`get`](Self::get), but a missing author is [`Error::AuthorNotSet`].
    pub fn require(&self) -> Result<String> {
        self.get()?.ok_or(Error::AuthorNotSet)
    }

    /// Replace the stored author name and return it as stored.
    ///
    /// Line breaks are folded into single spaces; the author must fit on
    /// the `Author:` line of a history record.
    pub fn set(&self, name: &str) -> Result<String> {
        let name = single_line(name);
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp_file = tempfile::NamedTempFile::new_in(dir)?;
        temp_file.write_all(name.as_bytes())?;
        temp_file.flush()?;
        temp_file.persist(&self.path)?;
        Ok(name)
    }
}

/// Join the non-blank lines of `name` with spaces.
fn single_line(name: &str) -> String {
    name.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
