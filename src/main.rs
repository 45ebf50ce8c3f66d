use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bulkcrop::{BatchCropper, Config};

fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing(config.verbose);

    let cropper = BatchCropper::from_config(&config)?;
    let summary = cropper
        .run(&config.files)
        .with_context(|| format!("Failed to crop into {}", config.output_dir.display()))?;

    println!("cropped {} of {} files", summary.written(), summary.total());

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
