//! Output formatting for CLI commands.
//!
//! Text mode prints the fixed SVCS messages scripts may depend on;
//! JSON mode prints one object per command.

use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};
use svcs_core::{CheckoutReport, CommitSummary, HistoryRecord};

/// `result_code` for a command that did what was asked.
pub const RESULT_OK: u8 = 0;
/// `result_code` for an ordinary condition such as "Nothing to commit.".
pub const RESULT_NOTICE: u8 = 1;
/// `result_code` for a failure.
pub const RESULT_ERROR: u8 = 2;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Writer for command output with format abstraction.
pub struct OutputWriter {
    format: OutputFormat,
    stdout: io::Stdout,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            stdout: io::stdout(),
        }
    }

    /// Write output using the configured format.
    ///
    /// `text_fn` is only called in text mode and must include the trailing
    /// newline.
    pub fn write<T: Serialize>(&self, data: &T, text_fn: impl FnOnce() -> String) -> Result<()> {
        let mut out = self.stdout.lock();
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                writeln!(out, "{}", json)?;
            }
            OutputFormat::Text => {
                let text = text_fn();
                if !text.is_empty() {
                    write!(out, "{}", text)?;
                }
            }
        }
        out.flush()?;
        Ok(())
    }

    /// Write a user-facing message that ends the command without doing anything.
    pub fn write_notice(&self, message: &str) -> Result<()> {
        let data = NoticeOutput {
            success: false,
            result_code: RESULT_NOTICE,
            message: message.to_string(),
        };
        self.write(&data, || format!("{}\n", message))
    }

    /// Write a failure to stderr.
    pub fn write_error(&self, error: &anyhow::Error) {
        match self.format {
            OutputFormat::Json => {
                let error_output = ErrorOutput {
                    success: false,
                    result_code: RESULT_ERROR,
                    error: format!("{:#}", error),
                };
                if let Ok(json) = serde_json::to_string_pretty(&error_output) {
                    let _ = writeln!(io::stderr(), "{}", json);
                }
            }
            OutputFormat::Text => {
                let _ = writeln!(io::stderr(), "Error: {:#}", error);
            }
        }
    }

    /// Write a side note to stderr in text mode. JSON output carries the
    /// same information in its data.
    pub fn write_note(&self, note: &str) {
        if self.format == OutputFormat::Text {
            let _ = writeln!(io::stderr(), "{}", note);
        }
    }
}

// ============================================================================
// Data Transfer Objects (DTOs) for JSON output
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub success: bool,
    pub result_code: u8,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct NoticeOutput {
    pub success: bool,
    pub result_code: u8,
    pub message: String,
}

/// Output for `config`.
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub success: bool,
    pub result_code: u8,
    pub username: String,
}

/// Output for `add <path>`.
#[derive(Debug, Serialize)]
pub struct AddOutput {
    pub success: bool,
    pub result_code: u8,
    pub path: String,
}

/// Output for `add` without a path.
#[derive(Debug, Serialize)]
pub struct TrackedOutput {
    pub success: bool,
    pub result_code: u8,
    pub files: Vec<String>,
}

/// Output for `commit`.
#[derive(Debug, Serialize)]
pub struct CommitOutput {
    pub success: bool,
    pub result_code: u8,
    #[serde(flatten)]
    pub commit: CommitSummary,
}

/// Output for `log`.
#[derive(Debug, Serialize)]
pub struct LogOutput {
    pub success: bool,
    pub result_code: u8,
    pub commits: Vec<HistoryRecord>,
}

/// Output for `checkout`.
#[derive(Debug, Serialize)]
pub struct CheckoutOutput {
    pub success: bool,
    pub result_code: u8,
    #[serde(flatten)]
    pub report: CheckoutReport,
}
