//! Polygon geometry.
//!
//! - [`Shape`]: closed integer polygon with cached bounds, area and perimeter
//! - [`trace_shapes`]: external contour tracing on a binary mask
//! - [`scale_coordinates`]: zoom-level rescaling of output coordinates

mod contour;
mod shape;

pub use contour::{external_contours, simplify_chain, trace_shapes};
pub use shape::{scale_coordinates, scale_factor, Bounds, Shape, Vertex};
