//! Commit history (`log.txt`).
//!
//! Records are appended oldest-first as
//!
//! ```text
//! commit <id>
//! Author: <name>
//! <message>
//!
//! ```
//!
//! and read back newest-first.

use crate::error::{Error, Result};
use crate::hash::CommitId;
use serde::Serialize;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Separator between records in the log file.
const RECORD_SEPARATOR: &str = "\n\n";

/// One commit in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRecord {
    pub id: CommitId,
    pub author: String,
    pub message: String,
}

impl HistoryRecord {
    /// Create a record. Blank lines in `message` are dropped so that the
    /// record separator stays unambiguous.
    pub fn new(id: CommitId, author: impl Into<String>, message: &str) -> Self {
        let message = message
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            id,
            author: author.into(),
            message,
        }
    }

    /// Serialize the record including its trailing separator.
    pub fn to_record(&self) -> String {
        format!("{}{}", self, RECORD_SEPARATOR)
    }

    /// Parse a record from one separator-delimited chunk of the log.
    pub fn from_record(chunk: &str) -> Result<Self> {
        let mut lines = chunk.splitn(3, '\n');

        let id = lines
            .next()
            .and_then(|line| line.strip_prefix("commit "))
            .ok_or_else(|| Error::corrupted_history("record does not start with 'commit '"))?;
        let id = CommitId::from_hex(id.trim())?;

        let author = lines
            .next()
            .and_then(|line| line.strip_prefix("Author: "))
            .ok_or_else(|| Error::corrupted_history(format!("record {} has no author", id)))?
            .to_string();

        let message = lines.next().unwrap_or_default().to_string();

        Ok(Self {
            id,
            author,
            message,
        })
    }
}

impl fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "commit {}\nAuthor: {}\n{}", self.id, self.author, self.message)
    }
}

/// Append-only commit log.
#[derive(Debug)]
pub struct History {
    path: PathBuf,
}

impl History {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record to the end of the log.
    pub fn append(&self, record: &HistoryRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::path_io(&self.path, e))?;
        file.write_all(record.to_record().as_bytes())
            .map_err(|e| Error::path_io(&self.path, e))?;
        file.flush()?;
        Ok(())
    }

    /// All records, oldest first. Chunks that do not parse are skipped.
    pub fn read_all(&self) -> Result<Vec<HistoryRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::path_io(&self.path, e)),
        };

        let mut records = Vec::new();
        for chunk in content.split(RECORD_SEPARATOR) {
            let chunk = chunk.trim_matches('\n');
            if chunk.is_empty() {
                continue;
            }

            match HistoryRecord::from_record(chunk) {
                Ok(record) => records.push(record),
                Err(e) => warn!(error = %e, "skipping malformed history record"),
            }
        }

        Ok(records)
    }

    /// All records, newest first.
    pub fn read_newest_first(&self) -> Result<Vec<HistoryRecord>> {
        let mut records = self.read_all()?;
        records.reverse();
        Ok(records)
    }
}

/// Render records in log display form: one blank line between records, none
/// after the last.
pub fn render_log(records: &[HistoryRecord]) -> String {
    records
        .iter()
        .map(HistoryRecord::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HASH_SIZE;
    use tempfile::TempDir;

    fn id(byte: u8) -> CommitId {
        CommitId::from_bytes([byte; HASH_SIZE])
    }

    #[test]
    fn test_record_format() {
        let record = HistoryRecord::new(id(1), "Alice", "first");
        assert_eq!(
            record.to_record(),
            format!("commit {}\nAuthor: Alice\nfirst\n\n", id(1))
        );
    }

    #[test]
    fn test_record_parse() {
        let record = HistoryRecord::new(id(2), "Bob", "line one\nline two");
        let parsed = HistoryRecord::from_record(&record.to_string()).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_record_drops_blank_message_lines() {
        let record = HistoryRecord::new(id(3), "Alice", "title\n\nbody\n");
        assert_eq!(record.message, "title\nbody");
    }

    #[test]
    fn test_record_invalid_format() {
        assert!(HistoryRecord::from_record("garbage").is_err());
        assert!(HistoryRecord::from_record("commit nothex\nAuthor: A\nm").is_err());
        assert!(HistoryRecord::from_record(&format!("commit {}\nm", id(1))).is_err());
    }

    #[test]
    fn test_empty_history() {
        let temp_dir = TempDir::new().unwrap();
        let history = History::new(temp_dir.path().join("log.txt"));

        assert!(history.read_all().unwrap().is_empty());
        assert!(history.read_newest_first().unwrap().is_empty());
    }

    #[test]
    fn test_append_and_read_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let history = History::new(temp_dir.path().join("log.txt"));

        for i in 1..=3 {
            let record = HistoryRecord::new(id(i), "Alice", &format!("commit {}", i));
            history.append(&record).unwrap();
        }

        let oldest_first = history.read_all().unwrap();
        assert_eq!(oldest_first.len(), 3);
        assert_eq!(oldest_first[0].id, id(1));

        let newest_first = history.read_newest_first().unwrap();
        assert_eq!(newest_first[0].id, id(3));
        assert_eq!(newest_first[2].id, id(1));
    }

    #[test]
    fn test_reads_hand_written_log() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("log.txt");
        let content = format!(
            "commit {}\nAuthor: Alice\nfirst\n\ncommit {}\nAuthor: Bob\nsecond\n\n",
            id(1),
            id(2)
        );
        fs::write(&path, content).unwrap();

        let records = History::new(path).read_newest_first().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].author, "Bob");
        assert_eq!(records[1].message, "first");
    }

    #[test]
    fn test_malformed_chunks_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("log.txt");
        let content = format!("junk\n\ncommit {}\nAuthor: Alice\nok\n\n", id(1));
        fs::write(&path, content).unwrap();

        let records = History::new(path).read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "ok");
    }

    #[test]
    fn test_render_log() {
        let records = vec![
            HistoryRecord::new(id(2), "Alice", "second"),
            HistoryRecord::new(id(1), "Alice", "first"),
        ];
        let rendered = render_log(&records);
        assert_eq!(
            rendered,
            format!(
                "commit {}\nAuthor: Alice\nsecond\n\ncommit {}\nAuthor: Alice\nfirst",
                id(2),
                id(1)
            )
        );
        assert_eq!(render_log(&[]), "");
    }

    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Records survive a write/read cycle through the log file.
        #[test]
        fn prop_append_then_read(
            author in "[A-Za-z][A-Za-z ]{0,20}",
            message in "[a-z0-9 ]{1,40}(\n[a-z0-9 ]{1,40}){0,3}",
            bytes in prop::array::uniform32(any::<u8>()),
        ) {
            let temp_dir = TempDir::new().unwrap();
            let history = History::new(temp_dir.path().join("log.txt"));
            let record = HistoryRecord::new(CommitId::from_bytes(bytes), author.trim(), &message);
            prop_assume!(!record.message.is_empty());

            history.append(&record)?;
            let records = history.read_all()?;
            prop_assert_eq!(records, vec![record]);
        }
    }
}
