use std::path::{Path, PathBuf};

use crate::errors::{BulkCropError, Result};

/// Result of cropping one input file.
#[derive(Debug)]
pub struct CropOutcome {
    pub path: PathBuf,
    /// Written output path on success
    pub result: Result<PathBuf>,
}

impl CropOutcome {
    pub const fn new(path: PathBuf, result: Result<PathBuf>) -> Self {
        Self { path, result }
    }

    pub const fn is_written(&self) -> bool {
        self.result.is_ok()
    }

    /// Line(s) printed for a failed file, `None` on success.
    pub fn error_message(&self) -> Option<String> {
        let err = self.result.as_ref().err()?;
        Some(format_error(&self.path, err))
    }
}

pub fn format_error(path: &Path, err: &BulkCropError) -> String {
    match err {
        BulkCropError::UnsupportedExtension { .. } => {
            format!("error: {} is not an image.", path.display())
        }
        _ => format!(
            "error: unable to process {}:\n{}",
            path.display(),
            err.detail()
        ),
    }
}

/// Per-file outcomes of one run, in input order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<CropOutcome>,
}

impl BatchSummary {
    pub fn written(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_written()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.written()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn written_paths(&self) -> impl Iterator<Item = &Path> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(PathBuf::as_path)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &BulkCropError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.path.as_path(), e)))
    }
}

impl FromIterator<CropOutcome> for BatchSummary {
    fn from_iter<T: IntoIterator<Item = CropOutcome>>(iter: T) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}
