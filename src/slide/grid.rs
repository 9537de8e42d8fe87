//! Tile grid resolution.
//!
//! Recovers the slide layout from the tile names alone: every tile's grid
//! position, the shared zoom level, and (once one tile has been decoded) the
//! full slide size in pixels.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::tile::TileId;

// =============================================================================
// Slide Geometry
// =============================================================================

/// Pixel layout of the reconstructed slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideGeometry {
    /// Slide width in pixels: `(max_col + 1) * tile_width`
    pub width: u32,

    /// Slide height in pixels: `(max_row + 1) * tile_height`
    pub height: u32,

    /// Width of every tile in pixels
    pub tile_width: u32,

    /// Height of every tile in pixels
    pub tile_height: u32,

    /// Zoom level the tiles were exported at
    pub zoom_level: u32,
}

impl SlideGeometry {
    /// Total slide area in pixels.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Absolute pixel offset `(x, y)` of a tile's top-left corner.
    pub fn tile_offset(&self, id: &TileId) -> (u64, u64) {
        (
            u64::from(id.col) * u64::from(self.tile_width),
            u64::from(id.row) * u64::from(self.tile_height),
        )
    }
}

// =============================================================================
// Tile Grid
// =============================================================================

/// A tile name together with its parsed identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridTile {
    pub name: String,
    pub id: TileId,
}

/// The set of tiles making up one slide, validated for consistency.
#[derive(Debug, Clone)]
pub struct TileGrid {
    tiles: Vec<GridTile>,
    zoom_level: u32,
    rows: u32,
    cols: u32,
}

impl TileGrid {
    /// Resolve the grid from a list of tile names.
    ///
    /// Names that do not parse as tiles are ignored. Tiles are ordered by name,
    /// and the first tile's zoom level is authoritative.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::EmptyInput`] if no name is a valid tile
    /// - [`ExtractError::Consistency`] if tiles disagree on the zoom level or
    ///   two tiles claim the same grid position
    pub fn resolve<S: AsRef<str>>(source_id: &str, names: &[S]) -> Result<Self, ExtractError> {
        let mut tiles: Vec<GridTile> = names
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                TileId::parse(name).map(|id| GridTile {
                    name: name.to_string(),
                    id,
                })
            })
            .collect();

        if tiles.is_empty() {
            return Err(ExtractError::EmptyInput {
                source_id: source_id.to_string(),
            });
        }

        tiles.sort_by(|a, b| a.name.cmp(&b.name));
        let zoom_level = tiles[0].id.zoom_level;

        let mut seen = HashSet::with_capacity(tiles.len());
        for tile in &tiles {
            if tile.id.zoom_level != zoom_level {
                return Err(ExtractError::Consistency {
                    reason: format!(
                        "tile {} has zoom level {}, expected {} (from {})",
                        tile.name, tile.id.zoom_level, zoom_level, tiles[0].name
                    ),
                });
            }
            if !seen.insert((tile.id.row, tile.id.col)) {
                return Err(ExtractError::Consistency {
                    reason: format!(
                        "more than one tile at row {}, column {} ({})",
                        tile.id.row, tile.id.col, tile.name
                    ),
                });
            }
        }

        let rows = tiles.iter().map(|t| t.id.row).max().unwrap_or(0).saturating_add(1);
        let cols = tiles.iter().map(|t| t.id.col).max().unwrap_or(0).saturating_add(1);

        debug!(tiles = tiles.len(), rows, cols, zoom_level, "Resolved tile grid");

        let grid = Self {
            tiles,
            zoom_level,
            rows,
            cols,
        };

        let missing = grid.missing_tiles();
        if missing > 0 {
            warn!(
                source = source_id,
                missing,
                rows,
                cols,
                "Tile grid has gaps; missing tiles are treated as background"
            );
        }

        Ok(grid)
    }

    /// Tiles in name order.
    pub fn tiles(&self) -> &[GridTile] {
        &self.tiles
    }

    /// The tile whose decoded size defines the tile dimensions.
    pub fn reference_tile(&self) -> &GridTile {
        &self.tiles[0]
    }

    /// Shared zoom level.
    pub fn zoom_level(&self) -> u32 {
        self.zoom_level
    }

    /// Number of tile rows (`max_row + 1`).
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of tile columns (`max_col + 1`).
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Grid positions in `rows x cols` with no tile.
    pub fn missing_tiles(&self) -> u64 {
        (u64::from(self.rows) * u64::from(self.cols)).saturating_sub(self.tiles.len() as u64)
    }

    /// Always false: a resolved grid holds at least one tile.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Compute the slide geometry for the given tile size.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Consistency`] if the tile size is zero or the
    /// slide would not fit a `u32` pixel extent.
    pub fn geometry(
        &self,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<SlideGeometry, ExtractError> {
        if tile_width == 0 || tile_height == 0 {
            return Err(ExtractError::Consistency {
                reason: format!("tile size {}x{} is empty", tile_width, tile_height),
            });
        }

        let width = self.cols.checked_mul(tile_width);
        let height = self.rows.checked_mul(tile_height);
        match (width, height) {
            (Some(width), Some(height)) => Ok(SlideGeometry {
                width,
                height,
                tile_width,
                tile_height,
                zoom_level: self.zoom_level,
            }),
            _ => Err(ExtractError::Consistency {
                reason: format!(
                    "{}x{} tiles of {}x{} px exceed the supported slide size",
                    self.cols, self.rows, tile_width, tile_height
                ),
            }),
        }
    }
}
