/// cover-forge: core engine for an interactive 3D book cover previewer
///
/// Takes uploaded wraparound cover artwork plus trim dimensions and derives
/// everything a renderer needs to show a textured 3D book: physical box
/// sizes for front cover, spine and back cover, and the UV sub-rectangles
/// that slice the single source image into those three regions.
///
/// Module map:
/// - catalog:   fixed trim-size presets + dimension validation
/// - units:     inch <-> scene-unit conversion
/// - store:     persistence gateway (in-memory and SQLite backends)
/// - registry:  CRUD + search over the persisted cover records
/// - geometry:  the cover-to-geometry mapper (the computational core)
/// - state:     data model and explicit application state

pub mod catalog;
pub mod error;
pub mod geometry;
pub mod registry;
pub mod state;
pub mod store;
pub mod units;

pub use error::{CoverError, Result};
pub use geometry::{map_cover, CoverGeometry, MappedRegion};
pub use registry::{ImportResult, Registry};
pub use state::app::AppState;
pub use state::data::{BookOptions, CoverRecord, CoverUpdate, TrimSize};
pub use store::{CoverStore, DatabaseStore, MemoryStore, StoredImage};
