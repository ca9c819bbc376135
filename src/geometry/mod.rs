/// Geometry derivation module
///
/// This module turns a cover record plus decoded artwork dimensions into
/// renderable data: box sizes for the three cover solids and the UV
/// sub-rectangles that slice the wraparound image. It has no rendering
/// dependencies and is testable without any scene graph present.

pub mod mapper;

pub use mapper::{map_cover, CoverGeometry, MappedRegion};
