//! Grouping cores into microarray rows.
//!
//! Cores are bucketed by their exact vertical extent `(y_min, y_max)`, the
//! buckets are swept in ascending order, and a bucket joins the open group
//! when its `y_min` is within `tolerance` of the *preceding bucket's* `y_max`:
//!
//! ```text
//!   key k-1: y_min ──────── y_max
//!   key k  :                  y_min ───── y_max     joins if y_min <= prev.y_max + tol
//! ```
//!
//! This is single-link chaining: a run of slightly overlapping rows merges
//! transitively, so densely packed cores can end up in one group spanning
//! most of the slide even when its first and last members are far apart.

use std::collections::BTreeMap;

use crate::geometry::{scale_coordinates, Bounds, Shape};

use super::filter::Core;

/// Default vertical tolerance, as a fraction of the slide height (1%).
pub const DEFAULT_HEIGHT_TOLERANCE: f64 = 0.01;

// =============================================================================
// Slice
// =============================================================================

/// Bounding rectangle of a core group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    bounds: Bounds,
}

impl Slice {
    /// Smallest axis-aligned box containing every core.
    ///
    /// Returns `None` for an empty core list.
    pub fn enclosing<'a>(cores: impl IntoIterator<Item = &'a Core>) -> Option<Self> {
        cores
            .into_iter()
            .map(|core| *core.bounds())
            .reduce(|acc, b| acc.union(&b))
            .map(|bounds| Self { bounds })
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Slice corners scaled by the factor of `level`, in the order
    /// top-left, top-right, bottom-right, bottom-left.
    pub fn coordinates(&self, level: i32) -> Vec<[f64; 2]> {
        let corners: Vec<[f64; 2]> = self
            .bounds
            .corners()
            .iter()
            .map(|v| [v.x as f64, v.y as f64])
            .collect();
        scale_coordinates(&corners, level)
    }

    /// The slice as a rectangle shape, if it is not flat.
    pub fn to_shape(&self) -> Option<Shape> {
        Shape::rectangle(&self.bounds).ok()
    }
}

// =============================================================================
// Core Group
// =============================================================================

/// Cores judged to lie in the same microarray row, with their slice.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreGroup {
    cores: Vec<Core>,
    slice: Slice,
}

impl CoreGroup {
    /// Build a group from a non-empty core list.
    pub fn new(cores: Vec<Core>) -> Option<Self> {
        let slice = Slice::enclosing(&cores)?;
        Some(Self { cores, slice })
    }

    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    pub fn slice(&self) -> &Slice {
        &self.slice
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    /// Always false: groups hold at least one core.
    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }
}

// =============================================================================
// Grouping
// =============================================================================

/// Group cores into rows by chained vertical proximity.
///
/// `tolerance = slide_height * height_tolerance`. Groups are returned in
/// ascending `(y_min, y_max)` sweep order; within a group, cores keep bucket
/// order. An empty input yields no groups.
pub fn group_cores(cores: Vec<Core>, slide_height: u32, height_tolerance: f64) -> Vec<CoreGroup> {
    let mut buckets: BTreeMap<(i64, i64), Vec<Core>> = BTreeMap::new();
    for core in cores {
        let bounds = core.bounds();
        buckets
            .entry((bounds.y_min, bounds.y_max))
            .or_default()
            .push(core);
    }

    let tolerance = f64::from(slide_height) * height_tolerance;
    let mut groups = Vec::new();
    let mut current: Vec<Core> = Vec::new();
    let mut previous: Option<(i64, i64)> = None;

    for (key, bucket) in buckets {
        if let Some((_, prev_y_max)) = previous {
            if key.0 as f64 > prev_y_max as f64 + tolerance {
                groups.extend(CoreGroup::new(std::mem::take(&mut current)));
            }
        }
        current.extend(bucket);
        previous = Some(key);
    }
    groups.extend(CoreGroup::new(current));

    groups
}
