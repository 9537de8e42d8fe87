//! Tile identifier parsing.
//!
//! Tiles are exported one file per grid cell, with the grid position and the
//! zoom level encoded in the file name:
//!
//! ```text
//! <slide>_<label>-<zoom>_<row>_<col>.<ext>
//!   e.g. slide42_level-3_0_12.jpeg  ->  zoom 3, row 0, column 12
//! ```
//!
//! Row and column are zero-based. Names that do not follow the convention are
//! not tiles and are skipped by the sources.

use std::path::Path;

/// File extensions accepted as tile images (compared case-insensitively).
pub const TILE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png"];

/// Grid position and zoom level parsed from a tile name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    /// Zoom level shared by every tile of a slide
    pub zoom_level: u32,

    /// Zero-based row index (Y direction)
    pub row: u32,

    /// Zero-based column index (X direction)
    pub col: u32,
}

impl TileId {
    /// Create a tile id from its components.
    pub fn new(zoom_level: u32, row: u32, col: u32) -> Self {
        Self {
            zoom_level,
            row,
            col,
        }
    }

    /// Parse a tile name (file name or full path).
    ///
    /// Returns `None` if the extension is not a supported image type or if the
    /// stem does not have exactly four `_`-separated tokens with a numeric
    /// zoom suffix, row and column.
    pub fn parse(name: &str) -> Option<Self> {
        let path = Path::new(name);
        let ext = path.extension()?.to_str()?;
        if !is_tile_extension(ext) {
            return None;
        }

        let stem = path.file_stem()?.to_str()?;
        let mut tokens = stem.split('_');
        let _slide = tokens.next()?;
        let zoom_token = tokens.next()?;
        let row = tokens.next()?.parse().ok()?;
        let col = tokens.next()?.parse().ok()?;
        if tokens.next().is_some() {
            return None;
        }

        let (_, zoom) = zoom_token.rsplit_once('-')?;
        let zoom_level = zoom.parse().ok()?;

        Some(Self::new(zoom_level, row, col))
    }
}

/// Check whether a file extension is one of [`TILE_EXTENSIONS`].
pub fn is_tile_extension(ext: &str) -> bool {
    TILE_EXTENSIONS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(ext))
}
