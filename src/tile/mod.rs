//! Tile access layer.
//!
//! This module turns a folder of exported tiles into decoded pixels for the
//! mask assembler.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Mask Assembler             │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │   TileDecoder  (bytes → RGB pixels)     │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │   TileSource trait (list + read bytes)  │
//! │   └── LocalTileSource (folder on disk)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileId`]: Zoom level and grid position parsed from a tile name
//! - [`TileSource`]: Enumerates tile names and reads their bytes
//! - [`LocalTileSource`]: Folder-backed source used by the CLI
//! - [`TileDecoder`]: Decodes JPEG/PNG tile bytes into RGB pixels

mod decoder;
mod name;
mod source;

pub use decoder::TileDecoder;
pub use name::{is_tile_extension, TileId, TILE_EXTENSIONS};
pub use source::{LocalTileSource, TileSource};
