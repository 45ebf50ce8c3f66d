pub mod batch;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod imageops;

mod progress_tracker;

use image::{GenericImageView, ImageFormat};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

pub use batch::{BatchSummary, CropOutcome};
pub use config::Config;
pub use errors::{BulkCropError, CodecStage, Result};
pub use geometry::{shave_to_box, CropBox, CropRegion, ShaveSpec};

use crate::progress_tracker::ProgressTracker;

/// Suffix appended to the file stem of every written image.
pub const OUTPUT_SUFFIX: &str = "_crop";

/// Crops a batch of images into one output directory.
pub struct BatchCropper {
    region: CropRegion,
    output_dir: PathBuf,
    jobs: usize,
    show_progress: bool,
    max_alloc: u64,
}

impl BatchCropper {
    pub fn new(region: CropRegion, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            region,
            output_dir: output_dir.into(),
            jobs: 1,
            show_progress: false,
            max_alloc: imageops::default_max_alloc(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.crop_region()?, &config.output_dir)
            .with_jobs(config.jobs)
            .with_progress(!config.quiet))
    }

    /// Worker count; 1 keeps processing sequential.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Byte limit for a single cropped image; larger boxes fail that file.
    pub const fn with_max_alloc(mut self, max_alloc: u64) -> Self {
        self.max_alloc = max_alloc;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Crops every file in `files`, recording a failure per file and moving on.
    ///
    /// Directories are expanded into the supported images they contain. Only
    /// failing to create the output directory aborts the run.
    pub fn run(&self, files: &[PathBuf]) -> Result<BatchSummary> {
        fs::create_dir_all(&self.output_dir).map_err(|e| BulkCropError::OutputDir {
            path: self.output_dir.clone(),
            source: e,
        })?;

        let jobs = collect_jobs(files);
        debug!(count = jobs.len(), region = ?self.region, "starting batch");

        let tracker = ProgressTracker::new(jobs.len(), self.show_progress)?;
        let process = |path: &PathBuf| {
            let outcome = CropOutcome::new(path.clone(), self.crop_resolved(path));
            tracker.record(&outcome);
            outcome
        };

        let summary = if self.jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .build()
                .map_err(|e| BulkCropError::Setup {
                    message: format!("failed to build worker pool: {}", e),
                })?;
            pool.install(|| jobs.par_iter().map(process).collect::<Vec<_>>())
                .into_iter()
                .collect()
        } else {
            jobs.iter().map(process).collect()
        };

        tracker.finish();
        Ok(summary)
    }

    /// Crops a single image to `crop_box` regardless of the configured region.
    pub fn crop_one(&self, path: &Path, crop_box: CropBox) -> Result<PathBuf> {
        self.crop_with(path, |_| crop_box)
    }

    fn crop_resolved(&self, path: &Path) -> Result<PathBuf> {
        self.crop_with(path, |dimensions| self.region.resolve(dimensions))
    }

    fn crop_with<F>(&self, path: &Path, resolve: F) -> Result<PathBuf>
    where
        F: FnOnce((u32, u32)) -> CropBox,
    {
        if !is_supported_image_format(path) {
            return Err(BulkCropError::UnsupportedExtension {
                path: path.to_path_buf(),
            });
        }

        let codec_error = |stage, source| BulkCropError::Codec {
            path: path.to_path_buf(),
            stage,
            source,
        };

        let format = ImageFormat::from_path(path).map_err(|e| codec_error(CodecStage::Format, e))?;
        let img = image::open(path).map_err(|e| codec_error(CodecStage::Open, e))?;

        let dimensions = img.dimensions();
        let crop_box = resolve(dimensions);
        debug!(path = %path.display(), ?dimensions, %crop_box, "cropping");

        let cropped = imageops::crop_with_limit(&img, &crop_box, self.max_alloc).map_err(|e| {
            BulkCropError::InvalidCropBox {
                path: path.to_path_buf(),
                crop_box,
                source: e,
            }
        })?;
        drop(img);

        let output_file = output_path(&self.output_dir, path);
        cropped
            .save_with_format(&output_file, format)
            .map_err(|e| codec_error(CodecStage::Save, e))?;

        debug!(output = %output_file.display(), "written");
        Ok(output_file)
    }
}

/// Whether `path` ends in a croppable image suffix (case-insensitive).
pub fn is_supported_image_format(path: &Path) -> bool {
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        matches!(extension.to_lowercase().as_str(), "png" | "jpg" | "jpeg")
    } else {
        false
    }
}

/// `<output_dir>/<stem>_crop<.ext>`, keeping the extension as written.
pub fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let mut file_name = input.file_stem().unwrap_or_default().to_os_string();
    file_name.push(OUTPUT_SUFFIX);
    if let Some(extension) = input.extension() {
        file_name.push(".");
        file_name.push(extension);
    }
    output_dir.join(file_name)
}

/// Expands directory entries into the supported images below them.
///
/// Plain paths pass through untouched so unsupported files still get reported.
pub fn collect_jobs(files: &[PathBuf]) -> Vec<PathBuf> {
    let mut jobs = Vec::with_capacity(files.len());

    for path in files {
        if !path.is_dir() {
            jobs.push(path.clone());
            continue;
        }

        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_file() && is_supported_image_format(entry.path()) {
                jobs.push(entry.into_path());
            }
        }
    }

    jobs
}
