//! Tile sources.
//!
//! A [`TileSource`] enumerates the tile names of one slide and serves their
//! encoded bytes. The pipeline only ever talks to this trait, so tests can
//! feed synthetic tiles from memory while the binary reads a folder on disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::IoError;

use super::name::TileId;

// =============================================================================
// TileSource Trait
// =============================================================================

/// Trait for enumerating and reading the tiles of a single slide.
#[async_trait]
pub trait TileSource: Send + Sync {
    /// List every tile name that follows the tile naming convention.
    ///
    /// Names that cannot be parsed as a [`TileId`] are excluded, not reported.
    /// The order is unspecified.
    async fn list_tiles(&self) -> Result<Vec<String>, IoError>;

    /// Read the encoded image bytes of a tile.
    async fn read_tile(&self, name: &str) -> Result<Bytes, IoError>;

    /// Get a human readable identifier for this source (for logging).
    fn identifier(&self) -> &str;
}

// =============================================================================
// Local Folder Source
// =============================================================================

/// Tile source backed by a folder of tile images on the local filesystem.
///
/// # Example
///
/// ```ignore
/// use tma_cores::tile::{LocalTileSource, TileSource};
///
/// let source = LocalTileSource::new("/data/slide42_tiles");
/// let names = source.list_tiles().await?;
/// let bytes = source.read_tile(&names[0]).await?;
/// ```
#[derive(Debug, Clone)]
pub struct LocalTileSource {
    root: PathBuf,
    identifier: String,
}

impl LocalTileSource {
    /// Create a source reading tiles from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let identifier = root.display().to_string();
        Self { root, identifier }
    }

    /// Get the tile folder.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl TileSource for LocalTileSource {
    async fn list_tiles(&self) -> Result<Vec<String>, IoError> {
        let list_error = |e: std::io::Error| IoError::ListFolder {
            path: self.identifier.clone(),
            message: e.to_string(),
        };

        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(list_error)?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(list_error)? {
            let file_type = entry.file_type().await.map_err(list_error)?;
            if !file_type.is_file() {
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                debug!(path = %entry.path().display(), "Skipping non UTF-8 file name");
                continue;
            };

            if TileId::parse(&name).is_some() {
                names.push(name);
            } else {
                debug!(name = %name, "Skipping file not matching the tile naming convention");
            }
        }

        Ok(names)
    }

    async fn read_tile(&self, name: &str) -> Result<Bytes, IoError> {
        let path = self.root.join(name);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(IoError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(IoError::Read {
                name: name.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}
