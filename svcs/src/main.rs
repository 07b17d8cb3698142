mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use output::{
    AddOutput, CheckoutOutput, CommitOutput, ConfigOutput, LogOutput, OutputWriter, RESULT_OK,
    TrackedOutput,
};
use std::path::PathBuf;
use std::process::ExitCode;
use svcs_core::{CommitOutcome, DEFAULT_VCS_DIR, RepoPaths, Repository, render_log};
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
These are SVCS commands:
config     Get and set a username.
add        Add a file to the index.
log        Show commit logs.
commit     Save changes.
checkout   Restore a file.
";

const COMMANDS: [&str; 5] = ["config", "add", "log", "commit", "checkout"];

/// SVCS - a minimal version control system
#[derive(Parser)]
#[command(name = "svcs")]
#[command(about = "Minimal single-user version control", long_about = None)]
#[command(version, disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Repository directory (defaults to SVCS_DIR env var or <work-tree>/vcs)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Working area tracked paths are relative to (defaults to SVCS_WORK_TREE env var or .)
    #[arg(long, global = true)]
    work_tree: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Print the list of commands
    #[arg(long, global = true)]
    help: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Get and set a username
    Config {
        /// New username
        #[arg(allow_hyphen_values = true)]
        name: Option<String>,
    },

    /// Add a file to the index, or list tracked files
    Add {
        /// Path to track
        #[arg(allow_hyphen_values = true)]
        path: Option<String>,
    },

    /// Show commit logs
    Log,

    /// Save changes
    Commit {
        /// Commit message
        #[arg(allow_hyphen_values = true)]
        message: Option<String>,
    },

    /// Restore tracked files from a commit
    Checkout {
        /// Commit id
        #[arg(allow_hyphen_values = true)]
        id: Option<String>,
    },

    #[command(external_subcommand)]
    Other(Vec<String>),
}

fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse_from(normalize_args(std::env::args()));
    let out = OutputWriter::new(cli.json);

    let command = match cli.command {
        Some(command) if !cli.help => command,
        _ => {
            print!("{}", HELP);
            return ExitCode::SUCCESS;
        }
    };

    // Resolve paths: CLI arg > env var > default
    let work_tree = cli
        .work_tree
        .or_else(|| std::env::var_os("SVCS_WORK_TREE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let vcs_dir = cli
        .dir
        .or_else(|| std::env::var_os("SVCS_DIR").map(PathBuf::from))
        .unwrap_or_else(|| work_tree.join(DEFAULT_VCS_DIR));
    tracing::debug!(
        vcs_dir = %vcs_dir.display(),
        work_tree = %work_tree.display(),
        "resolved repository paths"
    );
    let paths = RepoPaths::new(vcs_dir, work_tree);

    match run(command, paths, &out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<svcs_core::Error>() {
            Some(core_err) if core_err.is_user_facing() => {
                match out.write_notice(&core_err.to_string()) {
                    Ok(()) => ExitCode::SUCCESS,
                    Err(write_err) => {
                        out.write_error(&write_err);
                        ExitCode::FAILURE
                    }
                }
            }
            _ => {
                out.write_error(&err);
                ExitCode::FAILURE
            }
        },
    }
}

/// Logs go to stderr so stdout only carries command output.
/// Set SVCS_LOG=debug for verbose logging.
fn init_logging() {
    let filter = EnvFilter::try_from_env("SVCS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Accept `--add`, `--log`, ... as spellings of the plain command names.
fn normalize_args(args: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut args: Vec<String> = args.into_iter().collect();
    if let Some(arg) = args
        .iter_mut()
        .skip(1)
        .find(|arg| matches!(arg.strip_prefix("--"), Some(name) if COMMANDS.contains(&name)))
    {
        *arg = arg.trim_start_matches("--").to_string();
    }
    args
}

fn run(command: Commands, paths: RepoPaths, out: &OutputWriter) -> Result<()> {
    if let Commands::Other(args) = &command {
        let name = args.first().map(String::as_str).unwrap_or_default();
        return out.write_notice(&format!("'{}' is not a SVCS command.", name));
    }

    let repo = Repository::open(paths.clone())
        .with_context(|| format!("Failed to open repository at {}", paths.vcs_dir.display()))?;

    match command {
        Commands::Config { name } => cmd_config(&repo, name, out),
        Commands::Add { path } => cmd_add(&repo, path, out),
        Commands::Log => cmd_log(&repo, out),
        Commands::Commit { message: None } => out.write_notice("Message was not passed."),
        Commands::Commit {
            message: Some(message),
        } => cmd_commit(&repo, &message, out),
        Commands::Checkout { id: None } => out.write_notice("Commit id was not passed."),
        Commands::Checkout { id: Some(id) } => cmd_checkout(&repo, &id, out),
        Commands::Other(_) => Ok(()),
    }
}

fn cmd_config(repo: &Repository, name: Option<String>, out: &OutputWriter) -> Result<()> {
    let author = repo.author();

    let username = match name {
        Some(name) => author
            .set(&name)
            .with_context(|| format!("Failed to write {}", author.path().display()))?,
        None => match author
            .get()
            .with_context(|| format!("Failed to read {}", author.path().display()))?
        {
            Some(name) => name,
            None => return out.write_notice("Please, tell me who you are."),
        },
    };

    let data = ConfigOutput {
        success: true,
        result_code: RESULT_OK,
        username: username.clone(),
    };
    out.write(&data, || format!("The username is {}.\n", username))
}

fn cmd_add(repo: &Repository, path: Option<String>, out: &OutputWriter) -> Result<()> {
    let Some(path) = path else {
        let files = repo
            .tracked_paths()
            .with_context(|| "Failed to read the tracked file list")?;
        if files.is_empty() {
            return out.write_notice("Add a file to the index.");
        }

        let text: String = files.iter().map(|file| format!("{}\n", file)).collect();
        let data = TrackedOutput {
            success: true,
            result_code: RESULT_OK,
            files,
        };
        return out.write(&data, || format!("Tracked files:\n{}\n", text));
    };

    repo.track(&path)
        .with_context(|| format!("Failed to track {}", path))?;

    let data = AddOutput {
        success: true,
        result_code: RESULT_OK,
        path: path.clone(),
    };
    out.write(&data, || format!("The file '{}' is tracked.\n", path))
}

fn cmd_commit(repo: &Repository, message: &str, out: &OutputWriter) -> Result<()> {
    let outcome = repo
        .commit(message)
        .with_context(|| "Failed to commit changes")?;

    let summary = match outcome {
        CommitOutcome::Committed(summary) => summary,
        CommitOutcome::NothingToCommit => return out.write_notice("Nothing to commit."),
    };

    if !summary.skipped.is_empty() {
        out.write_note(&format!(
            "Skipped {} unreadable tracked file(s).",
            summary.skipped.len()
        ));
    }

    let data = CommitOutput {
        success: true,
        result_code: RESULT_OK,
        commit: summary,
    };
    out.write(&data, || "Changes are committed.\n".to_string())
}

fn cmd_log(repo: &Repository, out: &OutputWriter) -> Result<()> {
    let commits = repo.log().with_context(|| "Failed to read the commit log")?;
    if commits.is_empty() {
        return out.write_notice("No commits yet.");
    }

    let text = render_log(&commits);
    let data = LogOutput {
        success: true,
        result_code: RESULT_OK,
        commits,
    };
    out.write(&data, || format!("{}\n", text))
}

fn cmd_checkout(repo: &Repository, id: &str, out: &OutputWriter) -> Result<()> {
    let report = repo
        .checkout(id)
        .with_context(|| format!("Failed to check out {}", id))?;

    let data = CheckoutOutput {
        success: true,
        result_code: RESULT_OK,
        report,
    };
    out.write(&data, || format!("Switched to commit {}.\n", id))
}
