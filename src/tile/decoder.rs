//! Tile image decoder.
//!
//! Tiles arrive as encoded bytes (JPEG for exported slides, PNG for synthetic
//! fixtures). The format is sniffed from the magic bytes, so the file
//! extension is never trusted.

use std::io::Cursor;

use image::{ImageReader, RgbImage};

use crate::error::TileError;

/// Decoder turning encoded tile bytes into 3-channel pixels.
///
/// # Example
///
/// ```ignore
/// use tma_cores::tile::TileDecoder;
///
/// let decoder = TileDecoder::new();
/// let pixels = decoder.decode("s1_z-0_0_0.jpeg", &bytes)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct TileDecoder {}

impl TileDecoder {
    /// Create a new tile decoder.
    pub fn new() -> Self {
        Self {}
    }

    /// Decode a tile into RGB pixels.
    ///
    /// Grayscale and RGBA sources are converted; alpha is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::Decode`] if the format cannot be recognized or the
    /// data is corrupt.
    pub fn decode(&self, name: &str, source: &[u8]) -> Result<RgbImage, TileError> {
        let img = self.reader(name, source)?.decode().map_err(|e| TileError::Decode {
            name: name.to_string(),
            message: e.to_string(),
        })?;

        Ok(img.into_rgb8())
    }

    /// Get tile dimensions without fully decoding.
    ///
    /// # Returns
    ///
    /// `(width, height)` in pixels.
    pub fn dimensions(&self, name: &str, source: &[u8]) -> Result<(u32, u32), TileError> {
        self.reader(name, source)?
            .into_dimensions()
            .map_err(|e| TileError::Decode {
                name: name.to_string(),
                message: e.to_string(),
            })
    }

    fn reader<'a>(
        &self,
        name: &str,
        source: &'a [u8],
    ) -> Result<ImageReader<Cursor<&'a [u8]>>, TileError> {
        ImageReader::new(Cursor::new(source))
            .with_guessed_format()
            .map_err(|e| TileError::Decode {
                name: name.to_string(),
                message: e.to_string(),
            })
    }
}
