/// Unit conversion between real-world inches and scene distance units
///
/// The 3D scene uses an arbitrary distance unit; one real-world inch maps to
/// a fixed fraction of it so that books of different trim sizes keep their
/// relative proportions on screen.

/// One real-world inch expressed in scene distance units.
/// A 6 × 9 in trade book becomes a 1.2 × 1.8 unit box.
pub const UNITS_PER_INCH: f64 = 0.2;

/// Convert a length in inches to scene units.
pub fn to_scene_units(inches: f64) -> f64 {
    inches * UNITS_PER_INCH
}

/// Convert a length in scene units back to inches.
pub fn to_inches(scene_units: f64) -> f64 {
    scene_units / UNITS_PER_INCH
}
