//! CLI definition and action dispatch
//!
//! The command line mirrors a single action selector plus flags. Flags are
//! validated per action before the configuration is touched, so a usage
//! error never reaches the bucket.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use s3h_core::{ConfigManager, ObjectStore, SyncReport, Transfer};
use s3h_s3::S3Client;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod copy;
mod create;
mod delete;
mod download;
mod list;
mod upload;

#[cfg(test)]
mod fake_store;

/// s3h - directory-level transfers for an S3-compatible bucket
///
/// Uploads and downloads whole directory trees, copies and deletes by
/// prefix, creates folders and renders the bucket as a tree.
#[derive(Parser, Debug)]
#[command(name = "s3h")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Action to perform
    #[arg(value_enum)]
    pub action: Action,

    /// Local directory to upload
    #[arg(long)]
    pub local_dir: Option<PathBuf>,

    /// Remote prefix for upload, delete and create
    #[arg(long)]
    pub s3_dir: Option<String>,

    /// Source prefix for copy
    #[arg(long)]
    pub source_dir: Option<String>,

    /// Destination prefix for copy
    #[arg(long)]
    pub destination_dir: Option<String>,

    /// Remote prefix to download
    #[arg(long)]
    pub s3_folder: Option<String>,

    /// Local directory to download into
    #[arg(long)]
    pub local_download_dir: Option<PathBuf>,

    /// Path to the JSON configuration file
    #[arg(long, env = "S3H_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// File the tree listing is appended to
    #[arg(long, default_value = s3h_core::sync::DEFAULT_TREE_FILE)]
    pub output: PathBuf,

    /// Output format: human-readable or JSON
    #[arg(long, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, default_value = "false")]
    pub no_color: bool,

    /// Disable progress spinner
    #[arg(long, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    pub debug: bool,
}

/// Actions accepted by the CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Upload a local directory tree below a prefix
    Upload,
    /// Delete every object under a prefix
    Delete,
    /// Copy every object under a prefix to another prefix
    Copy,
    /// Create a folder marker object
    Create,
    /// Download a prefix into a local directory
    Download,
    /// Render the bucket as a tree
    List,
}

/// A fully validated action with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Upload {
        local_dir: PathBuf,
        s3_dir: String,
    },
    Delete {
        s3_dir: String,
    },
    Copy {
        source_dir: String,
        destination_dir: String,
    },
    Create {
        s3_dir: String,
    },
    Download {
        s3_folder: String,
        local_download_dir: PathBuf,
    },
    List {
        output: PathBuf,
    },
}

impl Cli {
    /// Output configuration derived from the global flags
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            json: self.json,
            no_color: self.no_color,
            no_progress: self.no_progress,
            quiet: self.quiet,
        }
    }

    /// Check the flags required by the selected action
    pub fn request(&self) -> Result<Request, String> {
        match self.action {
            Action::Upload => match (&self.local_dir, &self.s3_dir) {
                (Some(local_dir), Some(s3_dir)) => Ok(Request::Upload {
                    local_dir: local_dir.clone(),
                    s3_dir: s3_dir.clone(),
                }),
                _ => Err("Both --local-dir and --s3-dir are required for upload action.".into()),
            },
            Action::Delete => match &self.s3_dir {
                Some(s3_dir) => Ok(Request::Delete {
                    s3_dir: s3_dir.clone(),
                }),
                None => Err("--s3-dir is required for delete action.".into()),
            },
            Action::Copy => match (&self.source_dir, &self.destination_dir) {
                (Some(source_dir), Some(destination_dir)) => Ok(Request::Copy {
                    source_dir: source_dir.clone(),
                    destination_dir: destination_dir.clone(),
                }),
                _ => Err(
                    "Both --source-dir and --destination-dir are required for copy action."
                        .into(),
                ),
            },
            Action::Create => match &self.s3_dir {
                Some(s3_dir) => Ok(Request::Create {
                    s3_dir: s3_dir.clone(),
                }),
                None => Err("--s3-dir is required for create action.".into()),
            },
            Action::Download => match (&self.s3_folder, &self.local_download_dir) {
                (Some(s3_folder), Some(local_download_dir)) => Ok(Request::Download {
                    s3_folder: s3_folder.clone(),
                    local_download_dir: local_download_dir.clone(),
                }),
                _ => Err(
                    "Both --s3-folder and --local-download-dir are required for download action."
                        .into(),
                ),
            },
            Action::List => Ok(Request::List {
                output: self.output.clone(),
            }),
        }
    }
}

/// Execute the CLI action and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let formatter = Formatter::new(cli.output_config());

    let request = match cli.request() {
        Ok(request) => request,
        Err(message) => {
            formatter.error(&message);
            return ExitCode::UsageError;
        }
    };

    let config = match ConfigManager::locate(cli.config_file.as_deref()).load() {
        Ok(config) => config,
        Err(e) => {
            formatter.error(&format!("Failed to load configuration: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    let client = match S3Client::new(&config).await {
        Ok(client) => client,
        Err(e) => {
            formatter.error(&format!("Failed to create S3 client: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    tracing::debug!(?request, bucket = client.bucket(), "Dispatching action");
    run(request, &client, &formatter).await
}

/// Run a validated request against a store
pub async fn run(request: Request, store: &dyn ObjectStore, formatter: &Formatter) -> ExitCode {
    match request {
        Request::Upload { local_dir, s3_dir } => {
            upload::execute(store, &local_dir, &s3_dir, formatter).await
        }
        Request::Delete { s3_dir } => delete::execute(store, &s3_dir, formatter).await,
        Request::Copy {
            source_dir,
            destination_dir,
        } => copy::execute(store, &source_dir, &destination_dir, formatter).await,
        Request::Create { s3_dir } => create::execute(store, &s3_dir, formatter).await,
        Request::Download {
            s3_folder,
            local_download_dir,
        } => download::execute(store, &s3_folder, &local_download_dir, formatter).await,
        Request::List { output } => list::execute(store, &output, formatter).await,
    }
}

#[derive(Debug, Serialize)]
struct FailureOutput {
    item: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct ReportOutput<'a> {
    status: &'static str,
    action: &'static str,
    completed: &'a [Transfer],
    skipped: &'a [String],
    failed: Vec<FailureOutput>,
    total_bytes: i64,
    total_human: String,
}

/// Print a transfer report and derive the exit code
///
/// `describe` renders one completed transfer in human mode; `verb` leads
/// the summary line ("Uploaded 3 file(s)").
fn print_report(
    formatter: &Formatter,
    action: &'static str,
    report: &SyncReport,
    describe: impl Fn(&Transfer) -> String,
    verb: &str,
) -> ExitCode {
    let total_bytes = report.total_bytes();
    let total_human = humansize::format_size(total_bytes.max(0) as u64, humansize::BINARY);

    if formatter.is_json() {
        let output = ReportOutput {
            status: if report.is_success() { "success" } else { "partial" },
            action,
            completed: &report.completed,
            skipped: &report.skipped,
            failed: report
                .failed
                .iter()
                .map(|f| FailureOutput {
                    item: f.item.clone(),
                    error: f.error.to_string(),
                })
                .collect(),
            total_bytes,
            total_human,
        };
        formatter.json(&output);
    } else {
        for transfer in &report.completed {
            formatter.println(&describe(transfer));
        }
        for failure in &report.failed {
            formatter.error(&format!("Unable to {action} {}: {}", failure.item, failure.error));
        }

        let succeeded = report.completed.len();
        if report.is_success() {
            formatter.success(&format!("{verb} {succeeded} file(s) ({total_human})."));
        } else {
            formatter.warning(&format!(
                "Completed with errors: {succeeded} succeeded, {} failed",
                report.failed.len()
            ));
        }
    }

    if report.is_success() {
        ExitCode::Success
    } else {
        ExitCode::GeneralError
    }
}
