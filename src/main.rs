//! TMA Cores - extract tissue microarray cores from a tiled slide.
//!
//! This binary parses the configuration, sets up logging and runs one
//! extraction.

use std::fs::OpenOptions;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tma_cores::{Config, CoreExtractor, LocalTileSource};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    if let Err(e) = init_logging(config.verbose, config.log_file.as_deref()) {
        eprintln!("Error: cannot open log file: {}", e);
        return ExitCode::FAILURE;
    }

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Configuration:");
    info!("  Tiles folder: {}", config.tiles_folder.display());
    info!("  Output file: {}", config.output_file.display());
    info!(
        "  Core min area: {}%, height tolerance: {}, saturation threshold: {}",
        config.core_min_area, config.height_tolerance, config.saturation_threshold
    );
    info!("  Concurrency: {}", config.concurrency);

    let source = LocalTileSource::new(&config.tiles_folder);
    let extractor = CoreExtractor::new(source, config.extraction_params());

    match extractor.run(&config.output_file).await {
        Ok(summary) => {
            info!(
                "Done: {} tiles, {}x{} px slide at zoom {}, {} cores in {} groups",
                summary.tiles,
                summary.slide_width,
                summary.slide_height,
                summary.zoom_level,
                summary.cores,
                summary.groups
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Extraction failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing/logging subsystem.
///
/// Logs go to stderr, or are appended to `log_file` when given.
fn init_logging(verbose: bool, log_file: Option<&Path>) -> std::io::Result<()> {
    let env_filter = if verbose {
        "tma_cores=debug"
    } else {
        "tma_cores=info"
    };

    let (file_layer, stderr_layer) = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        None => (
            None,
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        ),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}
