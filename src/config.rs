//! Configuration management for the core extractor.
//!
//! Options come from command-line arguments via clap, with environment
//! variable fallbacks using the `TMA_` prefix:
//!
//! - `TMA_TILES_FOLDER` - Folder holding the slide's tiles (required)
//! - `TMA_OUTPUT_FILE` - Output JSON file (required)
//! - `TMA_CORE_MIN_AREA` - Minimum core area, % of slide area (default: 0.02)
//! - `TMA_HEIGHT_TOLERANCE` - Row tolerance, fraction of slide height (default: 0.01)
//! - `TMA_SATURATION_THRESHOLD` - Tissue saturation threshold, 0-255 (default: 20)
//! - `TMA_CONCURRENCY` - Tiles decoded in parallel (default: available CPUs)
//! - `TMA_LOG_FILE` - Append logs to this file instead of stderr

use std::path::PathBuf;

use clap::Parser;

use crate::cores::{DEFAULT_CORE_MIN_AREA, DEFAULT_HEIGHT_TOLERANCE};
use crate::pipeline::{ExtractionParams, DEFAULT_CONCURRENCY};
use crate::slide::DEFAULT_SATURATION_THRESHOLD;

/// Number of tiles decoded in parallel when not configured.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(DEFAULT_CONCURRENCY)
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// TMA Cores - Extract tissue microarray cores from a tiled slide.
///
/// Rebuilds the tissue mask of a slide from its exported tiles, traces the
/// tissue cores, groups them into rows, and writes the row slices and cores
/// as a JSON document.
#[derive(Parser, Debug, Clone)]
#[command(name = "tma-cores")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Input / Output
    // =========================================================================
    /// Folder containing all the tiles of a slide.
    ///
    /// Tiles must be named `<slide>_<label>-<zoom>_<row>_<col>.<jpeg|jpg|png>`.
    #[arg(long, env = "TMA_TILES_FOLDER")]
    pub tiles_folder: PathBuf,

    /// Output JSON file.
    #[arg(long, env = "TMA_OUTPUT_FILE")]
    pub output_file: PathBuf,

    // =========================================================================
    // Detection Parameters
    // =========================================================================
    /// Minimum core area as a percentage of the slide area.
    #[arg(long, default_value_t = DEFAULT_CORE_MIN_AREA, env = "TMA_CORE_MIN_AREA")]
    pub core_min_area: f64,

    /// Row grouping tolerance as a fraction of the slide height.
    #[arg(long, default_value_t = DEFAULT_HEIGHT_TOLERANCE, env = "TMA_HEIGHT_TOLERANCE")]
    pub height_tolerance: f64,

    /// HSV saturation (0-255) above which a pixel counts as tissue.
    #[arg(long, default_value_t = DEFAULT_SATURATION_THRESHOLD, env = "TMA_SATURATION_THRESHOLD")]
    pub saturation_threshold: u8,

    /// Maximum number of tiles decoded in parallel.
    #[arg(long, default_value_t = default_concurrency(), env = "TMA_CONCURRENCY")]
    pub concurrency: usize,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Append logs to this file (default: stderr).
    #[arg(long, env = "TMA_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.tiles_folder.as_os_str().is_empty() {
            return Err(
                "Tiles folder is required. Set --tiles-folder or TMA_TILES_FOLDER".to_string(),
            );
        }

        if self.output_file.as_os_str().is_empty() {
            return Err("Output file is required. Set --output-file or TMA_OUTPUT_FILE".to_string());
        }

        if !self.core_min_area.is_finite() || !(0.0..=100.0).contains(&self.core_min_area) {
            return Err("core_min_area must be a percentage between 0 and 100".to_string());
        }

        if !self.height_tolerance.is_finite() || self.height_tolerance < 0.0 {
            return Err("height_tolerance must be a non-negative fraction".to_string());
        }

        if self.concurrency == 0 {
            return Err("concurrency must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Detection parameters for the pipeline.
    pub fn extraction_params(&self) -> ExtractionParams {
        ExtractionParams {
            saturation_threshold: self.saturation_threshold,
            core_min_area: self.core_min_area,
            height_tolerance: self.height_tolerance,
            concurrency: self.concurrency,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
