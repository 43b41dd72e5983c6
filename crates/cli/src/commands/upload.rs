//! upload action - Local directory tree to a bucket prefix

use std::path::Path;

use s3h_core::{ObjectStore, sync};

use super::print_report;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, ProgressBar};

/// Execute the upload action
pub async fn execute(
    store: &dyn ObjectStore,
    local_dir: &Path,
    s3_dir: &str,
    formatter: &Formatter,
) -> ExitCode {
    let spinner = ProgressBar::spinner(
        formatter.config(),
        &format!("Uploading {} to {s3_dir}", local_dir.display()),
    );
    let result = sync::upload(store, local_dir, s3_dir).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => print_report(
            formatter,
            "upload",
            &report,
            |t| format!("Uploaded {} to {}", t.source, t.target),
            "Uploaded",
        ),
        Err(e) => {
            formatter.error(&format!("Unable to upload {}: {e}", local_dir.display()));
            ExitCode::from_error(&e)
        }
    }
}
