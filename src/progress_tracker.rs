use indicatif::{ProgressBar, ProgressStyle};

use crate::batch::CropOutcome;
use crate::errors::{BulkCropError, Result};

/// Progress bar over a batch that also carries the per-file error lines.
pub(crate) struct ProgressTracker {
    progress_bar: ProgressBar,
}

impl ProgressTracker {
    pub(crate) fn new(len: usize, visible: bool) -> Result<Self> {
        if !visible {
            return Ok(Self {
                progress_bar: ProgressBar::hidden(),
            });
        }

        let progress_bar = ProgressBar::new(len as u64);
        progress_bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .map_err(|e| BulkCropError::Setup {
                message: format!("invalid progress template: {}", e),
            })?
            .progress_chars("#>-"),
        );

        Ok(Self { progress_bar })
    }

    /// Prints the error line for a failed file and advances the bar.
    pub(crate) fn record(&self, outcome: &CropOutcome) {
        if let Some(message) = outcome.error_message() {
            self.progress_bar.suspend(|| println!("{}", message));
        }
        self.progress_bar.inc(1);
    }

    pub(crate) fn finish(&self) {
        self.progress_bar.finish_and_clear();
    }
}
