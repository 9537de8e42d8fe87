//! Core extraction pipeline.
//!
//! Runs the stages in dependency order:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                          CoreExtractor                             │
//! │                                                                    │
//! │  1. List tiles        → TileGrid (positions, zoom)                 │
//! │  2. Reference tile    → SlideGeometry (slide px)                   │
//! │  3. Per tile (bounded, blocking pool): decode → tissue_mask        │
//! │     └── single writer: SlideMask::write_tile (disjoint regions)    │
//! │  4. trace_shapes(mask)  → candidates                               │
//! │  5. filter_cores        → cores                                    │
//! │  6. group_cores         → groups + slices                          │
//! │  7. SlideRecord::build  → JSON document                            │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A run either produces one complete document or fails; nothing is written
//! until every stage has succeeded.

use std::path::Path;
use std::sync::Arc;

use image::GrayImage;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::cores::{
    filter_cores, group_cores, CoreGroup, SlideRecord, DEFAULT_CORE_MIN_AREA,
    DEFAULT_HEIGHT_TOLERANCE,
};
use crate::error::{ExtractError, TileError};
use crate::geometry::trace_shapes;
use crate::slide::{tissue_mask, SlideGeometry, SlideMask, TileGrid, DEFAULT_SATURATION_THRESHOLD};
use crate::tile::{TileDecoder, TileSource};

/// Default number of tiles decoded concurrently.
pub const DEFAULT_CONCURRENCY: usize = 4;

// =============================================================================
// Parameters and Results
// =============================================================================

/// Tunable parameters of an extraction run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionParams {
    /// Saturation (0-255) above which a pixel is tissue
    pub saturation_threshold: u8,

    /// Minimum core area as a percentage of the slide area
    pub core_min_area: f64,

    /// Row grouping tolerance as a fraction of the slide height
    pub height_tolerance: f64,

    /// Maximum number of tiles decoded at once
    pub concurrency: usize,
}

impl Default for ExtractionParams {
    fn default() -> Self {
        Self {
            saturation_threshold: DEFAULT_SATURATION_THRESHOLD,
            core_min_area: DEFAULT_CORE_MIN_AREA,
            height_tolerance: DEFAULT_HEIGHT_TOLERANCE,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Counters describing a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub tiles: usize,
    pub slide_width: u32,
    pub slide_height: u32,
    pub zoom_level: u32,
    /// Valid shapes traced from the mask
    pub candidates: usize,
    /// Contours dropped for having fewer than three distinct vertices
    pub degenerate: usize,
    pub cores: usize,
    pub groups: usize,
}

/// Everything produced by [`CoreExtractor::extract`].
#[derive(Debug, Clone)]
pub struct Extraction {
    pub geometry: SlideGeometry,
    pub groups: Vec<CoreGroup>,
    pub record: SlideRecord,
    pub summary: ExtractionSummary,
}

/// Output of the mask-level stages (contours, filter, grouping).
#[derive(Debug, Clone)]
pub struct MaskCores {
    pub groups: Vec<CoreGroup>,
    pub candidates: usize,
    pub degenerate: usize,
    pub cores: usize,
}

// =============================================================================
// Mask Stages
// =============================================================================

/// Trace, filter and group the cores of an assembled slide mask.
pub fn cores_from_mask(mask: &SlideMask, params: &ExtractionParams) -> MaskCores {
    let geometry = mask.geometry();

    let (candidates, degenerate) = trace_shapes(mask.as_image());
    let candidate_count = candidates.len();
    debug!(candidates = candidate_count, degenerate, "Traced external contours");

    let cores = filter_cores(candidates, geometry.area(), params.core_min_area);
    let core_count = cores.len();
    debug!(
        cores = core_count,
        rejected = candidate_count - core_count,
        "Filtered candidates by area"
    );

    let groups = group_cores(cores, geometry.height, params.height_tolerance);

    MaskCores {
        groups,
        candidates: candidate_count,
        degenerate,
        cores: core_count,
    }
}

// =============================================================================
// Core Extractor
// =============================================================================

/// Extracts tissue cores from the tiles of one slide.
///
/// # Example
///
/// ```ignore
/// use tma_cores::{CoreExtractor, ExtractionParams, LocalTileSource};
///
/// let source = LocalTileSource::new("/data/slide42_tiles");
/// let extractor = CoreExtractor::new(source, ExtractionParams::default());
/// let summary = extractor.run("slide42_cores.json".as_ref()).await?;
/// println!("{} cores in {} groups", summary.cores, summary.groups);
/// ```
pub struct CoreExtractor<S> {
    source: Arc<S>,
    params: ExtractionParams,
    decoder: TileDecoder,
}

impl<S: TileSource + 'static> CoreExtractor<S> {
    /// Create an extractor over a tile source.
    pub fn new(source: S, params: ExtractionParams) -> Self {
        Self {
            source: Arc::new(source),
            params,
            decoder: TileDecoder::new(),
        }
    }

    pub fn params(&self) -> &ExtractionParams {
        &self.params
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// List the tiles and compute the slide geometry.
    ///
    /// The tile size is read from the first tile in name order.
    pub async fn resolve(&self) -> Result<(TileGrid, SlideGeometry), ExtractError> {
        let names = self.source.list_tiles().await?;
        let grid = TileGrid::resolve(self.source.identifier(), &names)?;

        let reference = grid.reference_tile();
        let bytes = self.source.read_tile(&reference.name).await?;
        let (tile_width, tile_height) = self.decoder.dimensions(&reference.name, &bytes)?;
        let geometry = grid.geometry(tile_width, tile_height)?;

        info!(
            tiles = grid.len(),
            width = geometry.width,
            height = geometry.height,
            tile_width,
            tile_height,
            zoom_level = geometry.zoom_level,
            "Resolved slide geometry"
        );

        Ok((grid, geometry))
    }

    /// Build the full-resolution tissue mask.
    ///
    /// Tiles are read and thresholded concurrently (at most
    /// `params.concurrency` at a time); the calling task is the only writer
    /// of the mask.
    pub async fn assemble_mask(
        &self,
        grid: &TileGrid,
        geometry: SlideGeometry,
    ) -> Result<SlideMask, ExtractError> {
        let mut mask = SlideMask::new(geometry);
        let semaphore = Arc::new(Semaphore::new(self.params.concurrency.max(1)));
        let threshold = self.params.saturation_threshold;
        let mut tasks = JoinSet::new();

        for tile in grid.tiles() {
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            let decoder = self.decoder.clone();
            let tile = tile.clone();

            tasks.spawn(async move {
                let permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ExtractError::Worker(e.to_string()))?;
                let bytes = source.read_tile(&tile.name).await?;

                let name = tile.name.clone();
                let tile_mask = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    let pixels = decoder.decode(&name, &bytes)?;
                    Ok::<GrayImage, TileError>(tissue_mask(&pixels, threshold))
                })
                .await
                .map_err(|e| ExtractError::Worker(e.to_string()))??;

                Ok::<_, ExtractError>((tile, tile_mask))
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (tile, tile_mask) = joined.map_err(|e| ExtractError::Worker(e.to_string()))??;
            mask.write_tile(&tile.id, &tile_mask)?;
            debug!(tile = %tile.name, row = tile.id.row, col = tile.id.col, "Wrote tile mask");
        }

        info!(tissue_pixels = mask.tissue_pixels(), "Assembled slide mask");

        Ok(mask)
    }

    /// Run every stage and return the groups and output record in memory.
    pub async fn extract(&self) -> Result<Extraction, ExtractError> {
        let (grid, geometry) = self.resolve().await?;
        let scale_level = i32::try_from(geometry.zoom_level).map_err(|_| {
            ExtractError::Consistency {
                reason: format!("zoom level {} is out of range", geometry.zoom_level),
            }
        })?;

        let mask = self.assemble_mask(&grid, geometry).await?;

        let params = self.params;
        let found = tokio::task::spawn_blocking(move || cores_from_mask(&mask, &params))
            .await
            .map_err(|e| ExtractError::Worker(e.to_string()))?;

        let record = SlideRecord::build(&found.groups, scale_level);
        let summary = ExtractionSummary {
            tiles: grid.len(),
            slide_width: geometry.width,
            slide_height: geometry.height,
            zoom_level: geometry.zoom_level,
            candidates: found.candidates,
            degenerate: found.degenerate,
            cores: found.cores,
            groups: found.groups.len(),
        };

        info!(
            candidates = summary.candidates,
            degenerate = summary.degenerate,
            cores = summary.cores,
            groups = summary.groups,
            "Extracted cores"
        );

        Ok(Extraction {
            geometry,
            groups: found.groups,
            record,
            summary,
        })
    }

    /// Extract the cores and write the output document to `output`.
    pub async fn run(&self, output: &Path) -> Result<ExtractionSummary, ExtractError> {
        let extraction = self.extract().await?;
        extraction.record.write_to(output).await?;
        info!(output = %output.display(), "Wrote core groups");
        Ok(extraction.summary)
    }
}
