//! Recursive tree listing of the whole bucket

use std::fmt;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::path::last_segment;
use crate::traits::ObjectStore;

use super::list_all;

/// Default file the tree rendering is appended to
pub const DEFAULT_TREE_FILE: &str = "s3_tree.txt";

const ANCESTOR_MARKER: &str = "|  ";
const ENTRY_MARKER: &str = "|--";

/// One rendered entry of the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeLine {
    /// Nesting level, 0 for entries at the bucket root
    pub depth: usize,
    pub name: String,
    pub is_dir: bool,
}

impl fmt::Display for TreeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.depth > 0 {
            for _ in 1..self.depth {
                f.write_str(ANCESTOR_MARKER)?;
            }
            f.write_str(ENTRY_MARKER)?;
        }
        f.write_str(&self.name)
    }
}

enum Step {
    Emit(TreeLine),
    Expand { prefix: String, depth: usize },
}

/// Walk the bucket depth-first and hand every line to `sink` as it is found
///
/// Objects of a level come first, then each common prefix followed directly
/// by its subtree. Returns the number of lines emitted.
pub async fn list_tree<F>(store: &dyn ObjectStore, mut sink: F) -> Result<usize>
where
    F: FnMut(&TreeLine) -> Result<()>,
{
    let mut emitted = 0;
    let mut steps = vec![Step::Expand {
        prefix: String::new(),
        depth: 0,
    }];

    while let Some(step) = steps.pop() {
        let (prefix, depth) = match step {
            Step::Emit(line) => {
                sink(&line)?;
                emitted += 1;
                continue;
            }
            Step::Expand { prefix, depth } => (prefix, depth),
        };

        let items = list_all(store, &prefix, false).await?;
        let (dirs, objects): (Vec<_>, Vec<_>) = items.into_iter().partition(|item| item.is_dir);

        // The marker object of the folder being listed is the folder itself
        for object in objects.iter().filter(|o| o.key != prefix) {
            sink(&TreeLine {
                depth,
                name: last_segment(&object.key).to_string(),
                is_dir: false,
            })?;
            emitted += 1;
        }

        for dir in dirs.into_iter().rev() {
            let line = TreeLine {
                depth,
                name: last_segment(&dir.key).to_string(),
                is_dir: true,
            };
            steps.push(Step::Expand {
                prefix: dir.key,
                depth: depth + 1,
            });
            steps.push(Step::Emit(line));
        }
    }

    Ok(emitted)
}

/// Output file the tree is appended to, one line per write
#[derive(Debug, Clone)]
pub struct TreeFile {
    path: PathBuf,
}

impl TreeFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open in append mode, write one line and close again
    pub fn append_line(&self, line: &str) -> Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}
