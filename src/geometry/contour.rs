//! External contour tracing on a binary mask.
//!
//! Border following is delegated to `imageproc`. Only top-level outer
//! borders are kept (borders of holes and anything nested inside a hole are
//! ignored), and each border is reduced to the end points of its straight
//! runs before being turned into a [`Shape`].

use image::{imageops, GrayImage};
use imageproc::contours::{find_contours, BorderType};
use tracing::trace;

use super::shape::{Shape, Vertex};

/// Trace the external contours of every foreground region in `mask`.
///
/// Any non-zero pixel is foreground. Each returned chain is already
/// simplified with [`simplify_chain`]. Order is unspecified.
///
/// Regions touching the image border are traced like interior ones: the mask
/// is framed with one background pixel before border following, and the
/// points are shifted back into mask coordinates.
pub fn external_contours(mask: &GrayImage) -> Vec<Vec<Vertex>> {
    let framed = framed(mask);

    find_contours::<i64>(&framed)
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .map(|contour| {
            let chain = contour
                .points
                .iter()
                .map(|p| Vertex::new(p.x - 1, p.y - 1))
                .collect();
            simplify_chain(chain)
        })
        .collect()
}

/// Copy of `mask` surrounded by a one pixel background frame.
fn framed(mask: &GrayImage) -> GrayImage {
    let mut framed = GrayImage::new(
        mask.width().saturating_add(2),
        mask.height().saturating_add(2),
    );
    imageops::replace(&mut framed, mask, 1, 1);
    framed
}

/// Compress a closed boundary chain to the end points of its segments.
///
/// A vertex is dropped when the step that reaches it and the step that
/// leaves it have the same direction, so horizontal, vertical and diagonal
/// runs keep only their two ends. Consecutive duplicates are dropped first.
pub fn simplify_chain(points: Vec<Vertex>) -> Vec<Vertex> {
    let mut chain: Vec<Vertex> = Vec::with_capacity(points.len());
    for p in points {
        if chain.last() != Some(&p) {
            chain.push(p);
        }
    }
    while chain.len() > 1 && chain.first() == chain.last() {
        chain.pop();
    }

    let n = chain.len();
    if n < 3 {
        return chain;
    }

    let direction = |a: Vertex, b: Vertex| ((b.x - a.x).signum(), (b.y - a.y).signum());
    (0..n)
        .filter(|&i| {
            let prev = chain[(i + n - 1) % n];
            let next = chain[(i + 1) % n];
            direction(prev, chain[i]) != direction(chain[i], next)
        })
        .map(|i| chain[i])
        .collect()
}

/// Trace `mask` and build one [`Shape`] per valid external contour.
///
/// Returns the shapes and the number of contours dropped as degenerate
/// (fewer than three distinct vertices, typically single-pixel noise).
pub fn trace_shapes(mask: &GrayImage) -> (Vec<Shape>, usize) {
    let mut shapes = Vec::new();
    let mut degenerate = 0;

    for chain in external_contours(mask) {
        match Shape::new(chain) {
            Ok(shape) => shapes.push(shape),
            Err(e) => {
                trace!(error = %e, "Dropping degenerate contour");
                degenerate += 1;
            }
        }
    }

    (shapes, degenerate)
}
