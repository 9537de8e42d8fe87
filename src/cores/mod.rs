//! Core detection results.
//!
//! - [`filter_cores`]: keeps traced shapes whose area passes the minimum
//!   percentage of the slide area, turning them into [`Core`]s
//! - [`group_cores`]: chains cores into microarray rows ([`CoreGroup`]), each
//!   with its bounding [`Slice`]
//! - [`SlideRecord`]: the serialized output document

mod filter;
mod group;
mod record;

pub use filter::{area_percentage, filter_cores, is_core, Core, DEFAULT_CORE_MIN_AREA};
pub use group::{group_cores, CoreGroup, Slice, DEFAULT_HEIGHT_TOLERANCE};
pub use record::{CoreRecord, GroupRecord, SlideRecord};
