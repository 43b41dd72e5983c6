//! download action - Bucket prefix to a local directory tree

use std::path::Path;

use s3h_core::{ObjectStore, sync};

use super::print_report;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, ProgressBar};

/// Execute the download action
pub async fn execute(
    store: &dyn ObjectStore,
    s3_folder: &str,
    local_download_dir: &Path,
    formatter: &Formatter,
) -> ExitCode {
    let spinner = ProgressBar::spinner(
        formatter.config(),
        &format!("Downloading {s3_folder} to {}", local_download_dir.display()),
    );
    let result = sync::download(store, s3_folder, local_download_dir).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => print_report(
            formatter,
            "download",
            &report,
            |t| format!("Downloaded {} to {}", t.source, t.target),
            "Downloaded",
        ),
        Err(e) => {
            formatter.error(&format!("Unable to download {s3_folder}: {e}"));
            ExitCode::from_error(&e)
        }
    }
}
