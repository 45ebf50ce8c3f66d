use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::geometry::CropBox;
use crate::imageops::CropError;

/// Step of the per-file pipeline handed to the `image` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecStage {
    Format,
    Open,
    Save,
}

impl fmt::Display for CodecStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Format => "format detection",
            Self::Open => "open",
            Self::Save => "save",
        })
    }
}

/// Errors raised while cropping a batch.
///
/// Per-file variants carry the offending path so the batch loop can report
/// them as-is; `OutputDir` and `Setup` abort the run.
#[derive(Error, Debug)]
pub enum BulkCropError {
    #[error("Invalid arguments: {message}")]
    InvalidArguments { message: String },

    #[error("Setup failed: {message}")]
    Setup { message: String },

    #[error("Cannot create output directory {}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not an image.", path.display())]
    UnsupportedExtension { path: PathBuf },

    #[error("{stage} failed for {}", path.display())]
    Codec {
        path: PathBuf,
        stage: CodecStage,
        #[source]
        source: image::ImageError,
    },

    #[error("Crop box {crop_box} rejected for {}", path.display())]
    InvalidCropBox {
        path: PathBuf,
        crop_box: CropBox,
        #[source]
        source: CropError,
    },
}

impl BulkCropError {
    /// Message body printed under `error: unable to process <file>:`.
    ///
    /// Joins this error with its source chain so the codec's own reason is
    /// visible to the user.
    pub fn detail(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

pub type Result<T> = std::result::Result<T, BulkCropError>;
