//! Slide output record.
//!
//! The record is a JSON array with one object per core group, in sweep order:
//!
//! ```json
//! [
//!   {
//!     "coordinates": [[x, y], [x, y], [x, y], [x, y]],
//!     "cores": [
//!       { "coordinates": [[x, y], ...], "length": 81.0 }
//!     ]
//!   }
//! ]
//! ```
//!
//! Slice and core coordinates are scaled by the same zoom factor so their
//! relative geometry is preserved. `length` is the core perimeter in mask
//! pixels.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, IoError};

use super::group::CoreGroup;

/// One core in the output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreRecord {
    pub coordinates: Vec<[f64; 2]>,
    pub length: f64,
}

/// One core group: its slice rectangle and member cores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    /// Slice corners
    pub coordinates: Vec<[f64; 2]>,
    pub cores: Vec<CoreRecord>,
}

/// The complete output document of one slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideRecord {
    pub groups: Vec<GroupRecord>,
}

impl SlideRecord {
    /// Build the record from groups, scaling coordinates by `2^scale_level`.
    pub fn build(groups: &[CoreGroup], scale_level: i32) -> Self {
        let groups = groups
            .iter()
            .map(|group| GroupRecord {
                coordinates: group.slice().coordinates(scale_level),
                cores: group
                    .cores()
                    .iter()
                    .map(|core| CoreRecord {
                        coordinates: core.coordinates(scale_level),
                        length: core.length(),
                    })
                    .collect(),
            })
            .collect();

        Self { groups }
    }

    /// Total number of cores across groups.
    pub fn core_count(&self) -> usize {
        self.groups.iter().map(|g| g.cores.len()).sum()
    }

    /// Serialize to a compact JSON document.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize and write the document to `path`.
    ///
    /// The document is fully serialized before the file is touched, so a
    /// serialization failure leaves no partial output behind.
    pub async fn write_to(&self, path: &Path) -> Result<(), ExtractError> {
        let json = self.to_json()?;
        tokio::fs::write(path, json).await.map_err(|e| {
            ExtractError::Io(IoError::Write {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        })
    }
}
