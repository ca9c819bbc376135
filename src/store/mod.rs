/// Persistence gateway
///
/// One storage interface, two swappable backends selected at startup:
/// - MemoryStore: flat, synchronous, in-process (memory.rs)
/// - DatabaseStore: SQLite-backed, with image downscale/recompression
///   on write and async wrappers for background work (database.rs)
///
/// The interface covers exactly two kinds of data: the ordered cover
/// record list (JSON) and raw image bytes keyed by an opaque reference.
/// Side effects are confined to the backing store; there is no network.

pub mod database;
pub mod memory;

pub use database::DatabaseStore;
pub use memory::MemoryStore;

use image::ImageFormat;

use crate::error::{CoverError, Result};
use crate::state::data::CoverRecord;

/// Upload size ceiling: 10 MB.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// What a backend actually stored for an image: the reference to fetch it
/// plus the pixel size of the stored bytes. A recompressing backend may
/// store a smaller image than was uploaded; callers that keep inch-based
/// metadata (dpi) must reconcile it against these dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub image_ref: String,
    pub px_width: u32,
    pub px_height: u32,
}

/// Storage interface for cover metadata and image blobs.
///
/// Contract: `put_image` followed by `get_image` with the returned
/// reference yields byte-equivalent data, unless the backend recompresses,
/// in which case the result still decodes to artwork with the same aspect
/// ratio and the pixel size reported by `put_image`. `delete_image`
/// followed by `get_image` yields `None`.
pub trait CoverStore {
    /// The full record list, in stored order.
    fn list_records(&self) -> Result<Vec<CoverRecord>>;

    /// Replace the stored record list wholesale.
    fn save_records(&mut self, records: &[CoverRecord]) -> Result<()>;

    /// Store image bytes under `id`; reports the fetch reference and the
    /// stored pixel dimensions.
    fn put_image(&mut self, id: &str, bytes: &[u8]) -> Result<StoredImage>;

    /// Fetch image bytes, or `None` if the reference is unknown.
    fn get_image(&self, image_ref: &str) -> Result<Option<Vec<u8>>>;

    /// Drop an image blob. Unknown references are a no-op.
    fn delete_image(&mut self, image_ref: &str) -> Result<()>;

    /// Remove all records and all image blobs.
    fn clear_all(&mut self) -> Result<()>;
}

impl<T: CoverStore + ?Sized> CoverStore for Box<T> {
    fn list_records(&self) -> Result<Vec<CoverRecord>> {
        (**self).list_records()
    }

    fn save_records(&mut self, records: &[CoverRecord]) -> Result<()> {
        (**self).save_records(records)
    }

    fn put_image(&mut self, id: &str, bytes: &[u8]) -> Result<StoredImage> {
        (**self).put_image(id, bytes)
    }

    fn get_image(&self, image_ref: &str) -> Result<Option<Vec<u8>>> {
        (**self).get_image(image_ref)
    }

    fn delete_image(&mut self, image_ref: &str) -> Result<()> {
        (**self).delete_image(image_ref)
    }

    fn clear_all(&mut self) -> Result<()> {
        (**self).clear_all()
    }
}

/// Upload validation: size ceiling plus format sniffing.
/// Only PNG, JPEG and WebP artwork is accepted.
pub fn validate_upload(bytes: &[u8]) -> Result<ImageFormat> {
    if bytes.is_empty() {
        return Err(CoverError::Validation("uploaded file is empty".into()));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(CoverError::Validation(format!(
            "file is {} bytes, the limit is {} bytes",
            bytes.len(),
            MAX_UPLOAD_BYTES
        )));
    }

    let format = image::guess_format(bytes)
        .map_err(|e| CoverError::Validation(format!("unrecognized image data: {e}")))?;

    match format {
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP => Ok(format),
        other => Err(CoverError::Validation(format!(
            "unsupported image format {other:?}; allowed: PNG, JPEG, WebP"
        ))),
    }
}

/// Decode only the pixel dimensions of uploaded artwork.
/// A decode failure is surfaced as a rejection; the mapper must not run
/// without these dimensions.
pub fn decode_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let reader = image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CoverError::Decode(e.to_string()))?;
    reader
        .into_dimensions()
        .map_err(|e| CoverError::Decode(e.to_string()))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_png() {
        let bytes = test_util::png_bytes(4, 4);
        assert!(matches!(validate_upload(&bytes), Ok(ImageFormat::Png)));
    }

    #[test]
    fn test_rejects_empty_and_garbage() {
        assert!(matches!(
            validate_upload(&[]),
            Err(CoverError::Validation(_))
        ));
        assert!(matches!(
            validate_upload(&[0u8; 64]),
            Err(CoverError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_disallowed_format() {
        // Valid GIF header; sniffable but not in the allow-list
        let gif = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";
        assert!(matches!(
            validate_upload(gif),
            Err(CoverError::Validation(_))
        ));
    }

    #[test]
    fn test_decode_dimensions() {
        let bytes = test_util::png_bytes(30, 20);
        assert_eq!(decode_dimensions(&bytes).unwrap(), (30, 20));
    }

    #[test]
    fn test_decode_rejects_truncated_data() {
        assert!(matches!(
            decode_dimensions(&[0x89, 0x50]),
            Err(CoverError::Decode(_))
        ));
    }
}
