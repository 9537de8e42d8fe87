//! Slide reconstruction layer.
//!
//! Rebuilds the full-resolution tissue mask of a slide from its tile grid.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │   TileGrid  (names → positions, zoom)   │
//! └────────────────────┬────────────────────┘
//!                      │  + reference tile size
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │   SlideGeometry  (slide px, offsets)    │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │   SlideMask  ← tissue_mask(tile) × N    │
//! └─────────────────────────────────────────┘
//! ```

mod grid;
mod mask;

pub use grid::{GridTile, SlideGeometry, TileGrid};
pub use mask::{
    saturation, tissue_mask, SlideMask, BACKGROUND, DEFAULT_SATURATION_THRESHOLD, TISSUE,
};
