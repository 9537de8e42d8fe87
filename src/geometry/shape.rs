//! Polygon shapes built from traced contours.
//!
//! A [`Shape`] is an implicitly closed ring of integer vertices. Its bounding
//! box, area and perimeter are computed once at construction; shapes are
//! immutable afterwards.

use std::collections::HashSet;

use crate::error::ShapeError;

// =============================================================================
// Vertex and Bounds
// =============================================================================

/// Integer vertex in absolute slide pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Vertex {
    pub x: i64,
    pub y: i64,
}

impl Vertex {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl From<(i64, i64)> for Vertex {
    fn from((x, y): (i64, i64)) -> Self {
        Self::new(x, y)
    }
}

/// Axis-aligned bounding box, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub x_min: i64,
    pub x_max: i64,
    pub y_min: i64,
    pub y_max: i64,
}

impl Bounds {
    /// Bounding box of a non-empty vertex list.
    fn of(vertices: &[Vertex]) -> Self {
        let first = vertices[0];
        vertices.iter().skip(1).fold(
            Self {
                x_min: first.x,
                x_max: first.x,
                y_min: first.y,
                y_max: first.y,
            },
            |b, v| Self {
                x_min: b.x_min.min(v.x),
                x_max: b.x_max.max(v.x),
                y_min: b.y_min.min(v.y),
                y_max: b.y_max.max(v.y),
            },
        )
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            x_min: self.x_min.min(other.x_min),
            x_max: self.x_max.max(other.x_max),
            y_min: self.y_min.min(other.y_min),
            y_max: self.y_max.max(other.y_max),
        }
    }

    /// Whether `other` lies entirely inside this box.
    pub fn contains(&self, other: &Bounds) -> bool {
        self.x_min <= other.x_min
            && self.x_max >= other.x_max
            && self.y_min <= other.y_min
            && self.y_max >= other.y_max
    }

    pub fn width(&self) -> i64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> i64 {
        self.y_max - self.y_min
    }

    /// Corners in order top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [Vertex; 4] {
        [
            Vertex::new(self.x_min, self.y_min),
            Vertex::new(self.x_max, self.y_min),
            Vertex::new(self.x_max, self.y_max),
            Vertex::new(self.x_min, self.y_max),
        ]
    }
}

// =============================================================================
// Scaling
// =============================================================================

/// Scale factor for a zoom level: `2^level`.
///
/// Level 0 is the identity; negative levels shrink.
#[inline]
pub fn scale_factor(level: i32) -> f64 {
    2f64.powi(level)
}

/// Scale points by the factor of `level`.
///
/// Scaling by `level` then by `-level` gives back the input up to floating
/// point rounding.
pub fn scale_coordinates(points: &[[f64; 2]], level: i32) -> Vec<[f64; 2]> {
    let factor = scale_factor(level);
    points
        .iter()
        .map(|[x, y]| [x * factor, y * factor])
        .collect()
}

// =============================================================================
// Shape
// =============================================================================

/// Closed polygon with at least three distinct vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    vertices: Vec<Vertex>,
    bounds: Bounds,
    area: f64,
    length: f64,
}

impl Shape {
    /// Build a shape from an ordered vertex list.
    ///
    /// Consecutive repeated vertices (including a closing vertex equal to the
    /// first) are collapsed.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::TooFewVertices`] when fewer than three distinct
    /// vertices remain.
    pub fn new(vertices: impl IntoIterator<Item = Vertex>) -> Result<Self, ShapeError> {
        let mut ring: Vec<Vertex> = Vec::new();
        for v in vertices {
            if ring.last() != Some(&v) {
                ring.push(v);
            }
        }
        while ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }

        let distinct = ring.iter().collect::<HashSet<_>>().len();
        if distinct < 3 {
            return Err(ShapeError::TooFewVertices { distinct });
        }

        let bounds = Bounds::of(&ring);
        let area = ring_area(&ring);
        let length = ring_length(&ring);

        Ok(Self {
            vertices: ring,
            bounds,
            area,
            length,
        })
    }

    /// Axis-aligned rectangle covering `bounds`, corners as in
    /// [`Bounds::corners`].
    pub fn rectangle(bounds: &Bounds) -> Result<Self, ShapeError> {
        Self::new(bounds.corners())
    }

    /// Vertices in ring order, without a repeated closing vertex.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Enclosed area in square pixels.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Perimeter in pixels, including the closing edge.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Vertex coordinates scaled by the factor of `level`.
    pub fn coordinates(&self, level: i32) -> Vec<[f64; 2]> {
        let points: Vec<[f64; 2]> = self
            .vertices
            .iter()
            .map(|v| [v.x as f64, v.y as f64])
            .collect();
        scale_coordinates(&points, level)
    }
}

/// Shoelace area of a closed ring.
fn ring_area(ring: &[Vertex]) -> f64 {
    let twice: i128 = ring
        .iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| i128::from(a.x) * i128::from(b.y) - i128::from(b.x) * i128::from(a.y))
        .sum();
    twice.abs() as f64 / 2.0
}

/// Perimeter of a closed ring.
fn ring_length(ring: &[Vertex]) -> f64 {
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| ((b.x - a.x) as f64).hypot((b.y - a.y) as f64))
        .sum()
}
