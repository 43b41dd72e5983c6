//! delete action - Remove every object under a prefix

use s3h_core::{DeleteOutcome, ObjectStore, sync};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, ProgressBar};

#[derive(Debug, Serialize)]
struct DeleteOutput<'a> {
    status: &'static str,
    prefix: &'a str,
    deleted: &'a [String],
    failed: &'a [String],
    total: usize,
}

/// Execute the delete action
pub async fn execute(store: &dyn ObjectStore, s3_dir: &str, formatter: &Formatter) -> ExitCode {
    let spinner = ProgressBar::spinner(formatter.config(), &format!("Deleting {s3_dir}"));
    let result = sync::delete_prefix(store, s3_dir).await;
    spinner.finish_and_clear();

    let (deleted, failed) = match result {
        Ok(DeleteOutcome::NoObjects) => {
            if formatter.is_json() {
                formatter.json(&DeleteOutput {
                    status: "success",
                    prefix: s3_dir,
                    deleted: &[],
                    failed: &[],
                    total: 0,
                });
            } else {
                formatter.println(&no_objects_message(s3_dir));
            }
            return ExitCode::Success;
        }
        Ok(DeleteOutcome::Deleted { deleted, failed }) => (deleted, failed),
        Err(e) => {
            formatter.error(&format!("Unable to delete {s3_dir}: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    if formatter.is_json() {
        formatter.json(&DeleteOutput {
            status: if failed.is_empty() { "success" } else { "partial" },
            prefix: s3_dir,
            deleted: &deleted,
            failed: &failed,
            total: deleted.len(),
        });
    } else {
        for key in &deleted {
            formatter.println(&format!("Deleted {key}"));
        }
        for key in &failed {
            formatter.error(&format!("Unable to delete {key}"));
        }
        if failed.is_empty() {
            formatter.success(&format!(
                "Deleted folder {s3_dir} ({} object(s)).",
                deleted.len()
            ));
        } else {
            formatter.warning(&format!(
                "Completed with errors: {} deleted, {} failed",
                deleted.len(),
                failed.len()
            ));
        }
    }

    if failed.is_empty() {
        ExitCode::Success
    } else {
        ExitCode::GeneralError
    }
}

fn no_objects_message(prefix: &str) -> String {
    format!("No objects found in folder {prefix}")
}
