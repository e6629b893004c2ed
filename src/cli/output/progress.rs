//! Terminal progress for running jobs.
//!
//! A single indicatif spinner follows the workflow's progress events.

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

use crate::domain::errors::DomainResult;
use crate::domain::models::{ProgressEvent, ProgressStatus};
use crate::domain::ports::ProgressSink;

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a spinner for indeterminate operations
pub fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_CHARS);
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Extension trait for ProgressBar to add common utility methods
pub trait ProgressBarExt {
    /// Finish with a success message (green checkmark)
    fn finish_success(&self, message: impl Into<String>);

    /// Finish with an error message (red X)
    fn finish_error(&self, message: impl Into<String>);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(format!("{} {}", console::style("✓").green(), message.into()));
    }

    fn finish_error(&self, message: impl Into<String>) {
        self.finish_with_message(format!("{} {}", console::style("✗").red(), message.into()));
    }
}

/// Progress sink that drives a spinner. Completed steps are printed above it.
pub struct SpinnerProgressSink {
    spinner: ProgressBar,
}

impl SpinnerProgressSink {
    pub fn new() -> Self {
        Self {
            spinner: create_spinner(),
        }
    }

    /// A sink that draws nothing (tests, non-interactive output).
    pub fn hidden() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_draw_target(ProgressDrawTarget::hidden());
        Self { spinner }
    }

    pub fn finish(&self, success: bool, message: impl Into<String>) {
        if success {
            self.spinner.finish_success(message);
        } else {
            self.spinner.finish_error(message);
        }
    }
}

impl Default for SpinnerProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgressSink for SpinnerProgressSink {
    async fn notify(&self, event: ProgressEvent) -> DomainResult<()> {
        let message = event.message.unwrap_or_else(|| event.step.clone());
        match event.status {
            ProgressStatus::Start => self.spinner.set_message(message),
            ProgressStatus::Complete => {
                self.spinner
                    .println(format!("  {} {message}", console::style("•").dim()));
            }
        }
        Ok(())
    }
}
