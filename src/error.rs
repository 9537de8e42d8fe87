use thiserror::Error;

/// I/O errors that can occur when reading tiles or writing the output document
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// The tile folder could not be listed
    #[error("Cannot list tile folder {path}: {message}")]
    ListFolder { path: String, message: String },

    /// Tile not found in the source
    #[error("Tile not found: {0}")]
    NotFound(String),

    /// Reading a tile failed
    #[error("Cannot read tile {name}: {message}")]
    Read { name: String, message: String },

    /// Writing the output document failed
    #[error("Cannot write output {path}: {message}")]
    Write { path: String, message: String },
}

/// Errors raised while turning tile bytes into pixels
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// Source bytes are not a decodable image
    #[error("Failed to decode tile {name}: {message}")]
    Decode { name: String, message: String },
}

/// Fatal errors of an extraction run.
///
/// Geometric edge cases (degenerate contours, undersized candidates) are
/// filtered inside the pipeline and never show up here.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No tiles matched the naming convention
    #[error("No tiles found in {source_id}")]
    EmptyInput { source_id: String },

    /// Tiles disagree on zoom level, size or grid position
    #[error("Inconsistent tile set: {reason}")]
    Consistency { reason: String },

    /// A tile would be written outside the slide mask
    #[error(
        "Tile at row {row}, column {col} ({tile_width}x{tile_height} px) exceeds the \
         {mask_width}x{mask_height} slide mask"
    )]
    OutOfBounds {
        row: u32,
        col: u32,
        tile_width: u32,
        tile_height: u32,
        mask_width: u32,
        mask_height: u32,
    },

    /// I/O error from the tile source or the output sink
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// A tile could not be decoded
    #[error("Tile error: {0}")]
    Tile(#[from] TileError),

    /// The output record could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A background worker panicked or was cancelled
    #[error("Worker failed: {0}")]
    Worker(String),
}

/// Reasons a point list cannot form a polygon.
///
/// These are expected for noise contours and are filtered by callers, never
/// propagated as run failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Fewer than three distinct vertices
    #[error("Degenerate shape: {distinct} distinct vertices, need at least 3")]
    TooFewVertices { distinct: usize },
}
