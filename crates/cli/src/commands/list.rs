//! list action - Render the bucket as a tree
//!
//! Every line is printed and appended to the output file as soon as it is
//! found, so an interrupted listing still leaves a usable prefix of the tree.

use std::path::Path;

use s3h_core::{ObjectStore, Result, TreeFile, TreeLine, sync};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Debug, Serialize)]
struct ListOutput {
    status: &'static str,
    output: String,
    entries: Vec<TreeLine>,
    lines: Vec<String>,
}

/// Execute the list action
pub async fn execute(store: &dyn ObjectStore, output: &Path, formatter: &Formatter) -> ExitCode {
    let mut entries = Vec::new();

    let result = write_tree(store, output, |line, rendered| {
        if formatter.is_json() {
            entries.push(line.clone());
        } else {
            formatter.println(rendered);
        }
    })
    .await;

    match result {
        Ok(count) => {
            if formatter.is_json() {
                let lines = entries.iter().map(ToString::to_string).collect();
                formatter.json(&ListOutput {
                    status: "success",
                    output: output.display().to_string(),
                    entries,
                    lines,
                });
            }
            tracing::debug!(count, output = %output.display(), "Tree written");
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Unable to list bucket: {e}"));
            ExitCode::from_error(&e)
        }
    }
}

/// Append each rendered line to `output`, then hand the same text to `console`
async fn write_tree<F>(store: &dyn ObjectStore, output: &Path, mut console: F) -> Result<usize>
where
    F: FnMut(&TreeLine, &str),
{
    let tree_file = TreeFile::new(output);
    sync::list_tree(store, |line| {
        let rendered = line.to_string();
        tree_file.append_line(&rendered)?;
        console(line, &rendered);
        Ok(())
    })
    .await
}
