/// Flat in-memory store
///
/// Synchronous analogue of the original app's localStorage backend:
/// the record list lives in a Vec, image blobs in a HashMap. Nothing
/// survives the process; useful for tests and one-shot runs.
use std::collections::HashMap;

use crate::error::Result;
use crate::state::data::CoverRecord;
use crate::store::{self, CoverStore, StoredImage};

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<CoverRecord>,
    images: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored image blobs. Test hook for the "no orphaned blob"
    /// guarantee.
    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

impl CoverStore for MemoryStore {
    fn list_records(&self) -> Result<Vec<CoverRecord>> {
        Ok(self.records.clone())
    }

    fn save_records(&mut self, records: &[CoverRecord]) -> Result<()> {
        self.records = records.to_vec();
        Ok(())
    }

    fn put_image(&mut self, id: &str, bytes: &[u8]) -> Result<StoredImage> {
        // stored byte-for-byte, so the stored size is the upload size
        let (px_width, px_height) = store::decode_dimensions(bytes)?;
        self.images.insert(id.to_string(), bytes.to_vec());
        Ok(StoredImage {
            image_ref: id.to_string(),
            px_width,
            px_height,
        })
    }

    fn get_image(&self, image_ref: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.images.get(image_ref).cloned())
    }

    fn delete_image(&mut self, image_ref: &str) -> Result<()> {
        self.images.remove(image_ref);
        Ok(())
    }

    fn clear_all(&mut self) -> Result<()> {
        self.records.clear();
        self.images.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::TrimSize;
    use crate::store::test_util::png_bytes;

    fn record(id: &str) -> CoverRecord {
        CoverRecord {
            id: id.into(),
            original_name: format!("{id}.png"),
            trim: TrimSize::new(6.0, 9.0),
            spine_width_in: 0.5,
            dpi: 300,
            has_bleed: false,
            bleed_in: None,
            uploaded_at: 0,
            image_ref: id.into(),
        }
    }

    #[test]
    fn test_put_then_get_is_byte_equivalent() {
        let mut store = MemoryStore::new();
        let bytes = png_bytes(12, 7);

        let stored = store.put_image("a", &bytes).unwrap();
        assert_eq!((stored.px_width, stored.px_height), (12, 7));
        assert_eq!(store.get_image(&stored.image_ref).unwrap(), Some(bytes));
    }

    #[test]
    fn test_delete_then_get_is_none() {
        let mut store = MemoryStore::new();
        let stored = store.put_image("a", &png_bytes(4, 4)).unwrap();
        store.delete_image(&stored.image_ref).unwrap();
        assert_eq!(store.get_image(&stored.image_ref).unwrap(), None);
    }

    #[test]
    fn test_save_records_replaces_wholesale() {
        let mut store = MemoryStore::new();
        store.save_records(&[record("a"), record("b")]).unwrap();
        store.save_records(&[record("c")]).unwrap();

        let records = store.list_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "c");
    }

    #[test]
    fn test_clear_all() {
        let mut store = MemoryStore::new();
        store.save_records(&[record("a")]).unwrap();
        store.put_image("a", &png_bytes(4, 4)).unwrap();
        store.clear_all().unwrap();

        assert!(store.list_records().unwrap().is_empty());
        assert_eq!(store.get_image("a").unwrap(), None);
    }
}
