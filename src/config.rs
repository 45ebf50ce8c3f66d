use clap::Parser;
use std::path::PathBuf;

use crate::errors::{BulkCropError, Result};
use crate::geometry::CropRegion;

#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Image files (or directories to walk) to crop
    #[arg(short, long, num_args = 1.., required = true)]
    pub files: Vec<PathBuf>,

    /// Crop rectangle, or edge margins when --shave is set
    #[arg(
        short = 'b',
        long,
        num_args = 4,
        required = true,
        allow_negative_numbers = true,
        value_names = ["LEFT", "UPPER", "RIGHT", "LOWER"]
    )]
    pub cropbox: Vec<i64>,

    /// Treat the crop box as margins shaved off each image
    #[arg(short, long, default_value_t = false)]
    pub shave: bool,

    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Number of images processed in parallel
    #[arg(short, long, default_value_t = 1, value_parser = check_jobs)]
    pub jobs: usize,

    /// Hide the progress bar
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Builds the crop region from `--cropbox` and `--shave`.
    pub fn crop_region(&self) -> Result<CropRegion> {
        let values: [i64; 4] =
            self.cropbox
                .as_slice()
                .try_into()
                .map_err(|_| BulkCropError::InvalidArguments {
                    message: format!(
                        "--cropbox expects 4 integers, got {}",
                        self.cropbox.len()
                    ),
                })?;
        Ok(CropRegion::from_values(values, self.shave))
    }
}

fn check_jobs(s: &str) -> std::result::Result<usize, String> {
    let jobs: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a number", s))?;
    if jobs == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(jobs)
}
