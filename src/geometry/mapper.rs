/// Cover-to-geometry mapping
///
/// The computational core of the previewer: given a cover record and the
/// decoded pixel size of its wraparound artwork, derive the physical box
/// dimensions of the three cover solids and the texture sub-rectangles
/// that slice the single source image into front, spine and back regions
/// without resampling.
///
/// Pure and synchronous. Callers must not invoke it before the artwork
/// has been decoded; missing pixel dimensions are a precondition failure,
/// not something the mapper resolves itself.
use cgmath::{Vector2, Vector3};

use crate::error::{CoverError, Result};
use crate::state::data::CoverRecord;
use crate::units;

/// Thickness of a cover board, in inches (case-bound stock).
pub const BOARD_THICKNESS_IN: f64 = 0.08;

/// One cover solid: physical box size in scene units plus the texture
/// sub-rectangle indexing into the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedRegion {
    /// Box dimensions in scene units (width, height, depth)
    pub dimensions: Vector3<f64>,
    /// Fraction of the source image this region spans, per axis
    pub uv_repeat: Vector2<f64>,
    /// Fractional offset of the region's origin within the source image
    pub uv_offset: Vector2<f64>,
}

/// The full mapping: three mutually exclusive regions that jointly cover
/// the source image minus any trimmed bleed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverGeometry {
    pub front: MappedRegion,
    pub spine: MappedRegion,
    pub back: MappedRegion,
}

/// Derive box dimensions and texture regions for a cover.
///
/// The artwork is authored front | spine | back left-to-right; that region
/// order along the horizontal axis is a fixed modeling convention.
/// Reordering silently corrupts the rendered cover.
///
/// Fails with a validation error on any non-positive input. When the spine
/// band consumes the whole image width, front and back are clamped to one
/// pixel rather than producing zero or negative regions.
pub fn map_cover(
    record: &CoverRecord,
    image_px_width: u32,
    image_px_height: u32,
) -> Result<CoverGeometry> {
    let trim_w = record.trim.width_in;
    let trim_h = record.trim.height_in;
    let spine_in = record.spine_width_in;
    let bleed_in = record.bleed_inches();

    if trim_w <= 0.0 || trim_h <= 0.0 {
        return Err(CoverError::Validation(format!(
            "trim size must be positive, got {trim_w} × {trim_h}"
        )));
    }
    if spine_in <= 0.0 {
        return Err(CoverError::Validation(format!(
            "spine width must be positive, got {spine_in}"
        )));
    }
    if record.dpi == 0 {
        return Err(CoverError::Validation("dpi must be positive".into()));
    }
    if image_px_width == 0 || image_px_height == 0 {
        return Err(CoverError::Validation(
            "image pixel dimensions must be positive; run the mapper only after decode".into(),
        ));
    }
    if bleed_in < 0.0 {
        return Err(CoverError::Validation(format!(
            "bleed must not be negative, got {bleed_in}"
        )));
    }

    let dpi = f64::from(record.dpi);
    let img_w = f64::from(image_px_width);
    let img_h = f64::from(image_px_height);

    // Pixel split along the wraparound axis: spine band in the middle,
    // the remainder shared evenly, clamped to one pixel per side.
    let spine_px = spine_in * dpi;
    let half_px = ((img_w - spine_px) / 2.0).max(1.0);

    let front_frac = half_px / img_w;
    let spine_frac = (spine_px / img_w).min(1.0);
    let back_frac = front_frac;

    // Bleed fractions: the margin is a physical width, so each axis
    // divides by that axis's physical extent.
    let bleed_x = if bleed_in > 0.0 {
        bleed_in / (img_w / dpi)
    } else {
        0.0
    };
    let bleed_y = if bleed_in > 0.0 {
        bleed_in / (img_h / dpi)
    } else {
        0.0
    };

    let repeat_y = 1.0 - 2.0 * bleed_y;
    if repeat_y <= 0.0 || front_frac - bleed_x <= 0.0 {
        return Err(CoverError::Validation(format!(
            "bleed of {bleed_in} in consumes the mapped region"
        )));
    }

    let book_w = units::to_scene_units(trim_w);
    let book_h = units::to_scene_units(trim_h);
    let spine_d = units::to_scene_units(spine_in);
    let board = units::to_scene_units(BOARD_THICKNESS_IN);

    // Horizontal bleed comes off the outer edges only: the left edge of
    // the front region and the right edge of the back region. The spine's
    // vertical edges are interior seams shared with the covers, never
    // image edges, so they are left untrimmed.
    let front = MappedRegion {
        dimensions: Vector3::new(book_w, book_h, board),
        uv_repeat: Vector2::new(front_frac - bleed_x, repeat_y),
        uv_offset: Vector2::new(bleed_x, bleed_y),
    };
    let spine = MappedRegion {
        dimensions: Vector3::new(spine_d, book_h, board),
        uv_repeat: Vector2::new(spine_frac, repeat_y),
        uv_offset: Vector2::new(front_frac, bleed_y),
    };
    let back = MappedRegion {
        dimensions: Vector3::new(book_w, book_h, board),
        uv_repeat: Vector2::new(back_frac - bleed_x, repeat_y),
        uv_offset: Vector2::new(front_frac + spine_frac, bleed_y),
    };

    Ok(CoverGeometry { front, spine, back })
}
