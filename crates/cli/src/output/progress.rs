//! Progress spinner for long-running actions
//!
//! Transfers run one object at a time; the spinner shows the action is
//! alive while the per-item report is being collected.

use super::OutputConfig;

/// Progress spinner wrapper
///
/// In quiet or JSON mode, or with --no-progress, nothing is drawn.
#[derive(Debug)]
pub struct ProgressBar {
    bar: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    /// Create a spinner for indeterminate progress
    pub fn spinner(config: &OutputConfig, message: &str) -> Self {
        let bar = if config.quiet || config.json || config.no_progress {
            None
        } else {
            let bar = indicatif::ProgressBar::new_spinner();
            if let Ok(style) =
                indicatif::ProgressStyle::default_spinner().template("{spinner:.green} {msg}")
            {
                bar.set_style(style);
            }
            bar.set_message(message.to_string());
            bar.enable_steady_tick(std::time::Duration::from_millis(100));
            Some(bar)
        };

        Self { bar }
    }

    /// Finish and clear the spinner
    pub fn finish_and_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
