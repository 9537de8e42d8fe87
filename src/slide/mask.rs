//! Tissue thresholding and slide mask assembly.
//!
//! Each tile is converted to a per-pixel tissue mask by thresholding the HSV
//! saturation channel, and the tile masks are stitched into one
//! full-resolution [`SlideMask`].
//!
//! # Mask Encoding
//!
//! Masks are `GrayImage`s holding [`BACKGROUND`] (0) or [`TISSUE`] (255), the
//! binary convention expected by the contour tracer.

use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::error::ExtractError;
use crate::tile::TileId;

use super::grid::SlideGeometry;

/// Default saturation threshold on a 0-255 scale; strictly greater is tissue.
pub const DEFAULT_SATURATION_THRESHOLD: u8 = 20;

/// Mask value for tissue pixels.
pub const TISSUE: u8 = 255;

/// Mask value for background pixels.
pub const BACKGROUND: u8 = 0;

// =============================================================================
// Tissue Thresholder
// =============================================================================

/// HSV saturation of an 8-bit RGB pixel, scaled to 0-255.
///
/// `S = (max - min) * 255 / max`, rounded to nearest, and 0 for black.
/// Channel order does not matter, so BGR input gives the same result.
#[inline]
pub fn saturation(pixel: &Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    let max = r.max(g).max(b) as u32;
    let min = r.min(g).min(b) as u32;
    if max == 0 {
        return 0;
    }
    (((max - min) * 255 + max / 2) / max) as u8
}

/// Build the tissue mask of one tile.
///
/// A pixel is tissue if its saturation is strictly above `threshold`. The
/// output has the tile's dimensions.
pub fn tissue_mask(tile: &RgbImage, threshold: u8) -> GrayImage {
    let (width, height) = tile.dimensions();
    let mut mask = GrayImage::new(width, height);
    for (dst, src) in mask.pixels_mut().zip(tile.pixels()) {
        *dst = if saturation(src) > threshold {
            Luma([TISSUE])
        } else {
            Luma([BACKGROUND])
        };
    }
    mask
}

// =============================================================================
// Slide Mask
// =============================================================================

/// Full-resolution binary tissue mask of a slide.
///
/// Allocated zeroed from a [`SlideGeometry`] and filled one tile region at a
/// time. Tile regions are disjoint, so the order of writes does not matter.
#[derive(Debug, Clone)]
pub struct SlideMask {
    geometry: SlideGeometry,
    mask: GrayImage,
}

impl SlideMask {
    /// Allocate an all-background mask covering the slide.
    pub fn new(geometry: SlideGeometry) -> Self {
        Self {
            geometry,
            mask: GrayImage::new(geometry.width, geometry.height),
        }
    }

    /// Write a tile's tissue mask at its grid offset.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::Consistency`] if the tile mask size differs from the
    ///   slide's tile size
    /// - [`ExtractError::OutOfBounds`] if the tile region leaves the mask
    pub fn write_tile(&mut self, id: &TileId, tile_mask: &GrayImage) -> Result<(), ExtractError> {
        let (tile_width, tile_height) = tile_mask.dimensions();
        if tile_width != self.geometry.tile_width || tile_height != self.geometry.tile_height {
            return Err(ExtractError::Consistency {
                reason: format!(
                    "tile at row {}, column {} is {}x{} px, expected {}x{}",
                    id.row,
                    id.col,
                    tile_width,
                    tile_height,
                    self.geometry.tile_width,
                    self.geometry.tile_height
                ),
            });
        }

        let (x, y) = self.geometry.tile_offset(id);
        let fits = x + u64::from(tile_width) <= u64::from(self.geometry.width)
            && y + u64::from(tile_height) <= u64::from(self.geometry.height);
        if !fits {
            return Err(ExtractError::OutOfBounds {
                row: id.row,
                col: id.col,
                tile_width,
                tile_height,
                mask_width: self.geometry.width,
                mask_height: self.geometry.height,
            });
        }

        let stride = self.geometry.width as usize;
        let (x, y) = (x as usize, y as usize);
        let row_len = tile_width as usize;
        let dst: &mut [u8] = &mut self.mask;
        for (row, src) in tile_mask.chunks_exact(row_len).enumerate() {
            let start = (y + row) * stride + x;
            dst[start..start + row_len].copy_from_slice(src);
        }

        Ok(())
    }

    /// Slide geometry this mask was allocated for.
    pub fn geometry(&self) -> &SlideGeometry {
        &self.geometry
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.mask.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.mask.height()
    }

    /// Whether the pixel at `(x, y)` is tissue. Out-of-range pixels are not.
    pub fn is_tissue(&self, x: u32, y: u32) -> bool {
        self.mask
            .get_pixel_checked(x, y)
            .is_some_and(|p| p[0] == TISSUE)
    }

    /// Number of tissue pixels.
    pub fn tissue_pixels(&self) -> u64 {
        self.mask.iter().filter(|&&v| v == TISSUE).count() as u64
    }

    /// Borrow the underlying binary image.
    pub fn as_image(&self) -> &GrayImage {
        &self.mask
    }
}
