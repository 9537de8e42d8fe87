//! # TMA Cores
//!
//! Extracts tissue microarray cores from a Whole Slide Image that has been
//! exported as a grid of tiles, and emits their geometry grouped by
//! microarray row.
//!
//! ## Features
//!
//! - **Grid reconstruction**: Recovers slide size and zoom level from tile names
//! - **Tissue mask**: HSV saturation threshold per tile, stitched at full resolution
//! - **Contour tracing**: External borders only, simplified to straight-run end points
//! - **Row grouping**: Chained vertical-tolerance merge with one bounding slice per row
//! - **JSON output**: Slice and core coordinates rescaled by the zoom level
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`tile`] - Tile naming, sources and decoding
//! - [`slide`] - Tile grid resolution and slide mask assembly
//! - [`geometry`] - Polygon shapes and contour tracing
//! - [`cores`] - Area filter, row grouping and the output record
//! - [`pipeline`] - The end-to-end [`CoreExtractor`]
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use tma_cores::{CoreExtractor, ExtractionParams, LocalTileSource};
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = LocalTileSource::new("/data/slide42_tiles");
//!     let extractor = CoreExtractor::new(source, ExtractionParams::default());
//!
//!     match extractor.run("slide42_cores.json".as_ref()).await {
//!         Ok(summary) => println!("{} cores in {} rows", summary.cores, summary.groups),
//!         Err(e) => eprintln!("extraction failed: {}", e),
//!     }
//! }
//! ```

pub mod config;
pub mod cores;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod slide;
pub mod tile;

// Re-export commonly used types
pub use config::Config;
pub use cores::{
    filter_cores, group_cores, Core, CoreGroup, CoreRecord, GroupRecord, Slice, SlideRecord,
    DEFAULT_CORE_MIN_AREA, DEFAULT_HEIGHT_TOLERANCE,
};
pub use error::{ExtractError, IoError, ShapeError, TileError};
pub use geometry::{scale_coordinates, scale_factor, trace_shapes, Bounds, Shape, Vertex};
pub use pipeline::{
    cores_from_mask, CoreExtractor, Extraction, ExtractionParams, ExtractionSummary, MaskCores,
};
pub use slide::{tissue_mask, SlideGeometry, SlideMask, TileGrid, DEFAULT_SATURATION_THRESHOLD};
pub use tile::{LocalTileSource, TileDecoder, TileId, TileSource};
