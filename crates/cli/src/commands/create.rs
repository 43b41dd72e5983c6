//! create action - Folder marker object

use s3h_core::{ObjectStore, sync};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Debug, Serialize)]
struct CreateOutput {
    status: &'static str,
    key: String,
}

/// Execute the create action
pub async fn execute(store: &dyn ObjectStore, s3_dir: &str, formatter: &Formatter) -> ExitCode {
    match sync::create_folder(store, s3_dir).await {
        Ok(key) => {
            if formatter.is_json() {
                formatter.json(&CreateOutput {
                    status: "success",
                    key,
                });
            } else {
                formatter.success(&format!("Created folder {s3_dir}"));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Unable to create folder {s3_dir}: {e}"));
            ExitCode::from_error(&e)
        }
    }
}
