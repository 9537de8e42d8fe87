//! Minimum-area filtering of core candidates.

use std::ops::Deref;

use tracing::debug;

use crate::geometry::Shape;

/// Default minimum core area, as a percentage of the slide area (0.02%).
pub const DEFAULT_CORE_MIN_AREA: f64 = 0.02;

/// A tissue core: a traced shape large enough to pass the area filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Core(Shape);

impl Core {
    /// Wrap a shape that is known to be a core.
    pub fn new(shape: Shape) -> Self {
        Self(shape)
    }

    pub fn shape(&self) -> &Shape {
        &self.0
    }

    pub fn into_shape(self) -> Shape {
        self.0
    }
}

impl Deref for Core {
    type Target = Shape;

    fn deref(&self) -> &Shape {
        &self.0
    }
}

/// Percentage of the slide covered by `shape`.
#[inline]
pub fn area_percentage(shape: &Shape, slide_area: u64) -> f64 {
    if slide_area == 0 {
        return 0.0;
    }
    shape.area() * 100.0 / slide_area as f64
}

/// Whether `shape` is large enough to be a core.
///
/// Kept iff `area * 100 / slide_area >= core_min_area`.
#[inline]
pub fn is_core(shape: &Shape, slide_area: u64, core_min_area: f64) -> bool {
    slide_area > 0 && area_percentage(shape, slide_area) >= core_min_area
}

/// Keep the candidates passing [`is_core`].
pub fn filter_cores(candidates: Vec<Shape>, slide_area: u64, core_min_area: f64) -> Vec<Core> {
    candidates
        .into_iter()
        .filter_map(|shape| {
            if is_core(&shape, slide_area, core_min_area) {
                Some(Core::new(shape))
            } else {
                debug!(
                    area = shape.area(),
                    percentage = area_percentage(&shape, slide_area),
                    "Rejecting undersized candidate"
                );
                None
            }
        })
        .collect()
}
