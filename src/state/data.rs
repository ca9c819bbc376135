/// Shared data structures for the cover catalog
///
/// These structs represent the data model that flows between
/// the persistence layer, the registry, and the geometry mapper.
/// Records are serialized to JSON with the field names the original
/// browser app persisted, so an exported record list stays readable.
use serde::{Deserialize, Serialize};

/// DPI assumed for artwork that does not specify one.
pub const DEFAULT_DPI: u32 = 300;

/// Standard bleed margin applied when bleed trimming is enabled.
pub const DEFAULT_BLEED_IN: f64 = 0.125;

/// Fallback per-page thickness for deriving spine width from a page count.
/// Paper-stock specific; callers with known stock should override it on
/// [`BookOptions`] rather than rely on this value.
pub const DEFAULT_INCHES_PER_PAGE: f64 = 0.0025;

/// Finished physical width and height of a printed book, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimSize {
    /// Trim width in inches
    #[serde(rename = "width")]
    pub width_in: f64,
    /// Trim height in inches
    #[serde(rename = "height")]
    pub height_in: f64,
}

impl TrimSize {
    pub const fn new(width_in: f64, height_in: f64) -> Self {
        Self {
            width_in,
            height_in,
        }
    }

    /// Human-readable label, e.g. `6 × 9 in`. Also used for search matching.
    pub fn label(&self) -> String {
        format!("{} × {} in", self.width_in, self.height_in)
    }
}

/// A single uploaded cover in the catalog.
///
/// Field names follow the persisted JSON shape of the record list
/// (`originalName`, `spineWidthInches`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverRecord {
    /// Opaque unique identifier (UUID v4), generated at creation, never reused
    pub id: String,
    /// User-supplied source filename, display-only
    pub original_name: String,
    /// Finished book dimensions
    #[serde(rename = "trimSize")]
    pub trim: TrimSize,
    /// Spine width in inches; always > 0 for a finalized record
    #[serde(rename = "spineWidthInches")]
    pub spine_width_in: f64,
    /// Artwork resolution in dots per inch
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Whether bleed trimming is enabled for this cover
    #[serde(default)]
    pub has_bleed: bool,
    /// Bleed margin in inches, present only when bleed is enabled
    #[serde(rename = "bleedInches", default, skip_serializing_if = "Option::is_none")]
    pub bleed_in: Option<f64>,
    /// Creation timestamp (unix seconds)
    pub uploaded_at: i64,
    /// Opaque reference resolvable to raw image bytes via the store
    pub image_ref: String,
}

fn default_dpi() -> u32 {
    DEFAULT_DPI
}

impl CoverRecord {
    /// Effective bleed margin: 0.0 when bleed is disabled.
    pub fn bleed_inches(&self) -> f64 {
        if self.has_bleed {
            self.bleed_in.unwrap_or(DEFAULT_BLEED_IN)
        } else {
            0.0
        }
    }

    /// Serialize for storage as a JSON text column.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from a stored JSON text column.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Options supplied when adding a cover to the registry.
#[derive(Debug, Clone, Copy)]
pub struct BookOptions {
    /// Explicit spine width in inches; wins over page-count derivation
    pub spine_width_in: Option<f64>,
    /// Page count, used to derive spine width when none is given
    pub page_count: Option<u32>,
    /// Per-page thickness used for the derivation
    pub inches_per_page: f64,
    /// Artwork resolution
    pub dpi: u32,
    /// Enable bleed trimming
    pub bleed: bool,
    /// Bleed margin in inches when enabled
    pub bleed_in: f64,
}

impl Default for BookOptions {
    fn default() -> Self {
        Self {
            spine_width_in: None,
            page_count: None,
            inches_per_page: DEFAULT_INCHES_PER_PAGE,
            dpi: DEFAULT_DPI,
            bleed: false,
            bleed_in: DEFAULT_BLEED_IN,
        }
    }
}

impl BookOptions {
    /// Resolve a usable spine width, deriving from page count if needed.
    /// Returns None when neither source yields a positive width; a record
    /// must not be finalized in that case.
    pub fn resolve_spine_width(&self) -> Option<f64> {
        if let Some(w) = self.spine_width_in {
            if w > 0.0 {
                return Some(w);
            }
        }
        match self.page_count {
            Some(pages) if pages > 0 && self.inches_per_page > 0.0 => {
                Some(f64::from(pages) * self.inches_per_page)
            }
            _ => None,
        }
    }
}

/// Partial, metadata-only edit of an existing record.
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CoverUpdate {
    pub original_name: Option<String>,
    pub trim: Option<TrimSize>,
    pub spine_width_in: Option<f64>,
    pub dpi: Option<u32>,
    pub has_bleed: Option<bool>,
    pub bleed_in: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CoverRecord {
        CoverRecord {
            id: "abc".into(),
            original_name: "my-cover.png".into(),
            trim: TrimSize::new(5.0, 8.0),
            spine_width_in: 0.842,
            dpi: 300,
            has_bleed: false,
            bleed_in: None,
            uploaded_at: 1_700_000_000,
            image_ref: "abc".into(),
        }
    }

    #[test]
    fn test_json_round_trip() {
        let rec = record();
        let json = rec.to_json().unwrap();
        let restored = CoverRecord::from_json(&json).unwrap();
        assert_eq!(rec, restored);
    }

    #[test]
    fn test_persisted_field_names() {
        let json = record().to_json().unwrap();
        assert!(json.contains("\"originalName\""));
        assert!(json.contains("\"spineWidthInches\""));
        assert!(json.contains("\"trimSize\""));
        assert!(json.contains("\"uploadedAt\""));
        assert!(json.contains("\"imageRef\""));
        // nested trim size keeps its plain persisted names too
        assert!(json.contains("\"width\":5.0"));
        assert!(json.contains("\"height\":8.0"));
        assert!(!json.contains("width_in"));
        // bleed is disabled, so the margin field is omitted entirely
        assert!(!json.contains("bleedInches"));
    }

    #[test]
    fn test_dpi_defaults_when_missing() {
        let json = r#"{
            "id": "x",
            "originalName": "a.png",
            "trimSize": { "width": 6.0, "height": 9.0 },
            "spineWidthInches": 0.5,
            "uploadedAt": 0,
            "imageRef": "x"
        }"#;
        let rec = CoverRecord::from_json(json).unwrap();
        assert_eq!(rec.dpi, DEFAULT_DPI);
        assert!(!rec.has_bleed);
    }

    #[test]
    fn test_bleed_inches_zero_when_disabled() {
        let mut rec = record();
        assert_eq!(rec.bleed_inches(), 0.0);
        rec.has_bleed = true;
        assert_eq!(rec.bleed_inches(), DEFAULT_BLEED_IN);
        rec.bleed_in = Some(0.25);
        assert_eq!(rec.bleed_inches(), 0.25);
    }

    #[test]
    fn test_spine_resolution_prefers_explicit_width() {
        let opts = BookOptions {
            spine_width_in: Some(0.6),
            page_count: Some(400),
            ..BookOptions::default()
        };
        assert_eq!(opts.resolve_spine_width(), Some(0.6));
    }

    #[test]
    fn test_spine_resolution_from_page_count() {
        let opts = BookOptions {
            page_count: Some(400),
            ..BookOptions::default()
        };
        let spine = opts.resolve_spine_width().unwrap();
        assert!((spine - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_spine_resolution_fails_with_neither() {
        let opts = BookOptions::default();
        assert_eq!(opts.resolve_spine_width(), None);

        let zero = BookOptions {
            spine_width_in: Some(0.0),
            ..BookOptions::default()
        };
        assert_eq!(zero.resolve_spine_width(), None);
    }
}
