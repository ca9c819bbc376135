/// Trim-size catalog
///
/// A fixed table of industry trim presets plus validation rules for custom
/// dimensions. The catalog is defined at compile time and never mutated;
/// lookup order is catalog order (first match wins).
use crate::state::data::TrimSize;

/// Smallest accepted trim dimension, in inches.
pub const MIN_TRIM_IN: f64 = 0.1;

/// Largest accepted trim dimension, in inches.
pub const MAX_TRIM_IN: f64 = 20.0;

/// Custom dimensions may carry at most this many decimal places.
pub const MAX_DECIMAL_PLACES: u32 = 2;

/// Default absolute tolerance for preset matching, in inches.
pub const PRESET_TOLERANCE_IN: f64 = 0.01;

/// A named trim size with a category label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimPreset {
    pub name: &'static str,
    pub category: &'static str,
    pub trim: TrimSize,
}

/// The preset table, in display order.
pub const PRESETS: &[TrimPreset] = &[
    TrimPreset {
        name: "Pocket Book",
        category: "Mass Market",
        trim: TrimSize::new(4.25, 6.87),
    },
    TrimPreset {
        name: "Digest",
        category: "Trade",
        trim: TrimSize::new(5.5, 8.5),
    },
    TrimPreset {
        name: "US Trade",
        category: "Trade",
        trim: TrimSize::new(6.0, 9.0),
    },
    TrimPreset {
        name: "Royal",
        category: "Trade",
        trim: TrimSize::new(6.14, 9.21),
    },
    TrimPreset {
        name: "Textbook",
        category: "Academic",
        trim: TrimSize::new(7.0, 10.0),
    },
    TrimPreset {
        name: "US Letter",
        category: "Academic",
        trim: TrimSize::new(8.5, 11.0),
    },
    TrimPreset {
        name: "Square",
        category: "Photography",
        trim: TrimSize::new(8.5, 8.5),
    },
    TrimPreset {
        name: "Landscape",
        category: "Children",
        trim: TrimSize::new(11.0, 8.5),
    },
];

/// All presets, in catalog order.
pub fn list_presets() -> &'static [TrimPreset] {
    PRESETS
}

/// First preset whose width and height both lie within `tolerance_in`
/// (absolute, inches) of the candidate dimensions.
pub fn find_preset(width_in: f64, height_in: f64, tolerance_in: f64) -> Option<&'static TrimPreset> {
    PRESETS.iter().find(|p| {
        (p.trim.width_in - width_in).abs() <= tolerance_in
            && (p.trim.height_in - height_in).abs() <= tolerance_in
    })
}

/// Look up a preset by its display name, case-insensitively.
pub fn find_preset_by_name(name: &str) -> Option<&'static TrimPreset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Validate custom trim dimensions against the range and decimal-precision
/// rules. On failure, every violated rule is reported.
pub fn validate(width_in: f64, height_in: f64) -> Result<(), Vec<String>> {
    let mut reasons = Vec::new();

    for (axis, value) in [("width", width_in), ("height", height_in)] {
        if !value.is_finite() || value < MIN_TRIM_IN || value > MAX_TRIM_IN {
            reasons.push(format!(
                "{axis} must be between {MIN_TRIM_IN} and {MAX_TRIM_IN} inches, got {value}"
            ));
        } else if !within_decimal_places(value, MAX_DECIMAL_PLACES) {
            reasons.push(format!(
                "{axis} may have at most {MAX_DECIMAL_PLACES} decimal places, got {value}"
            ));
        }
    }

    if reasons.is_empty() {
        Ok(())
    } else {
        Err(reasons)
    }
}

/// True when `value` is representable with at most `places` decimal digits.
/// Uses a small epsilon so values like 6.87 survive binary rounding.
fn within_decimal_places(value: f64, places: u32) -> bool {
    let scaled = value * 10f64.powi(places as i32);
    (scaled - scaled.round()).abs() < 1e-6
}
