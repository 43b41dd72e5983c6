//! copy action - Server-side copy of a prefix within the bucket

use s3h_core::{ObjectStore, sync};

use super::print_report;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, ProgressBar};

/// Execute the copy action
pub async fn execute(
    store: &dyn ObjectStore,
    source_dir: &str,
    destination_dir: &str,
    formatter: &Formatter,
) -> ExitCode {
    let spinner = ProgressBar::spinner(
        formatter.config(),
        &format!("Copying {source_dir} to {destination_dir}"),
    );
    let result = sync::copy_prefix(store, source_dir, destination_dir).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            if report.completed.is_empty() && report.is_success() {
                formatter.warning(&format!("No objects found under {source_dir}"));
            }
            print_report(
                formatter,
                "copy",
                &report,
                |t| format!("Copied {} to {}", t.source, t.target),
                "Copied",
            )
        }
        Err(e) => {
            formatter.error(&format!("Unable to copy {source_dir} to {destination_dir}: {e}"));
            ExitCode::from_error(&e)
        }
    }
}
