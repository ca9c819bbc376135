/// Cover registry
///
/// CRUD over the persisted cover record list. The registry is the sole
/// mutator of the list: every operation reads the current list, mutates a
/// copy, and writes it back, so a single logical operation never loses a
/// concurrent update (there is only one writer by construction).
///
/// Validation happens before any storage write: a rejected add leaves no
/// orphaned image blob behind.
use std::path::Path;

use chrono::Utc;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::catalog;
use crate::error::{CoverError, Result};
use crate::state::data::{BookOptions, CoverRecord, CoverUpdate, TrimSize};
use crate::store::{self, CoverStore};

/// File extensions accepted by the folder import scan.
const COVER_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Outcome of a folder import.
#[derive(Debug, Clone, Copy)]
pub struct ImportResult {
    /// Files added to the catalog
    pub imported: usize,
    /// Candidate files that failed validation or decode
    pub skipped: usize,
}

pub struct Registry<S: CoverStore> {
    store: S,
}

/// Dpi of the stored artwork after a backend downscaled it from
/// `upload_px_w` to `stored_px_w` wide.
fn effective_dpi(dpi: u32, upload_px_w: u32, stored_px_w: u32) -> u32 {
    let scaled = f64::from(dpi) * f64::from(stored_px_w) / f64::from(upload_px_w);
    (scaled.round() as u32).max(1)
}

impl<S: CoverStore> Registry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Add a cover to the catalog.
    ///
    /// Validates the upload (size, format), the trim dimensions, and the
    /// spine-width invariant, in that order, before anything is stored.
    /// Spine width comes from the options: explicit inches, or derived
    /// from a page count; with neither, the add fails.
    pub fn add(
        &mut self,
        original_name: &str,
        file_bytes: &[u8],
        trim: TrimSize,
        options: &BookOptions,
    ) -> Result<CoverRecord> {
        store::validate_upload(file_bytes)?;

        catalog::validate(trim.width_in, trim.height_in)
            .map_err(|reasons| CoverError::Validation(reasons.join("; ")))?;

        let spine_width_in = options.resolve_spine_width().ok_or_else(|| {
            CoverError::Validation(
                "no usable spine width: supply inches or a page count".into(),
            )
        })?;

        if options.dpi == 0 {
            return Err(CoverError::Validation("dpi must be positive".into()));
        }

        // Confirm the artwork actually decodes before the blob is stored
        let (upload_px_w, _) = store::decode_dimensions(file_bytes)?;

        let id = Uuid::new_v4().to_string();
        let stored = self.store.put_image(&id, file_bytes)?;

        // A recompressing backend may shrink the artwork on write. The
        // record's dpi describes the stored pixels, so it scales with
        // them; otherwise every inch-based measure (spine band, bleed)
        // would slice the wrong pixel width.
        let dpi = if stored.px_width == upload_px_w {
            options.dpi
        } else {
            effective_dpi(options.dpi, upload_px_w, stored.px_width)
        };

        let record = CoverRecord {
            id,
            original_name: original_name.to_string(),
            trim,
            spine_width_in,
            dpi,
            has_bleed: options.bleed,
            bleed_in: options.bleed.then_some(options.bleed_in),
            uploaded_at: Utc::now().timestamp(),
            image_ref: stored.image_ref,
        };

        let mut records = self.store.list_records()?;
        records.push(record.clone());
        self.store.save_records(&records)?;

        Ok(record)
    }

    /// Metadata-only partial edit. Fails with NotFound when the id is
    /// absent; changed trim or spine values are re-validated.
    pub fn update(&mut self, id: &str, update: &CoverUpdate) -> Result<CoverRecord> {
        let mut records = self.store.list_records()?;
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| CoverError::NotFound { id: id.to_string() })?;

        let record = &mut records[index];

        if let Some(name) = &update.original_name {
            record.original_name = name.clone();
        }
        if let Some(trim) = update.trim {
            catalog::validate(trim.width_in, trim.height_in)
                .map_err(|reasons| CoverError::Validation(reasons.join("; ")))?;
            record.trim = trim;
        }
        if let Some(spine) = update.spine_width_in {
            if spine <= 0.0 {
                return Err(CoverError::Validation(format!(
                    "spine width must be positive, got {spine}"
                )));
            }
            record.spine_width_in = spine;
        }
        if let Some(dpi) = update.dpi {
            if dpi == 0 {
                return Err(CoverError::Validation("dpi must be positive".into()));
            }
            record.dpi = dpi;
        }
        if let Some(has_bleed) = update.has_bleed {
            record.has_bleed = has_bleed;
            if !has_bleed {
                record.bleed_in = None;
            }
        }
        if let Some(bleed_in) = update.bleed_in {
            if bleed_in < 0.0 {
                return Err(CoverError::Validation(format!(
                    "bleed must not be negative, got {bleed_in}"
                )));
            }
            // a margin only means anything with bleed enabled
            record.has_bleed = true;
            record.bleed_in = Some(bleed_in);
        }

        let updated = record.clone();
        self.store.save_records(&records)?;
        Ok(updated)
    }

    /// Remove a record and its artwork. Fails with NotFound when the id
    /// is absent; the record list is untouched in that case.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        let mut records = self.store.list_records()?;
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| CoverError::NotFound { id: id.to_string() })?;

        let record = records.remove(index);
        self.store.delete_image(&record.image_ref)?;
        self.store.save_records(&records)
    }

    /// The full catalog, in stored order.
    pub fn list(&self) -> Result<Vec<CoverRecord>> {
        self.store.list_records()
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<CoverRecord>> {
        Ok(self.store.list_records()?.into_iter().find(|r| r.id == id))
    }

    /// Case-insensitive substring search over the display name, the
    /// formatted trim size, and the matching preset's name and category.
    pub fn search(&self, query: &str) -> Result<Vec<CoverRecord>> {
        let needle = query.to_lowercase();
        let records = self.store.list_records()?;

        Ok(records
            .into_iter()
            .filter(|record| {
                if record.original_name.to_lowercase().contains(&needle) {
                    return true;
                }
                if record.trim.label().to_lowercase().contains(&needle) {
                    return true;
                }
                if let Some(preset) = catalog::find_preset(
                    record.trim.width_in,
                    record.trim.height_in,
                    catalog::PRESET_TOLERANCE_IN,
                ) {
                    return preset.name.to_lowercase().contains(&needle)
                        || preset.category.to_lowercase().contains(&needle);
                }
                false
            })
            .collect())
    }

    /// Fetch the stored artwork bytes for a record.
    pub fn artwork(&self, id: &str) -> Result<Vec<u8>> {
        let record = self
            .find_by_id(id)?
            .ok_or_else(|| CoverError::NotFound { id: id.to_string() })?;

        self.store
            .get_image(&record.image_ref)?
            .ok_or(CoverError::NotFound { id: record.image_ref })
    }

    /// Drop every record and every image blob.
    pub fn clear(&mut self) -> Result<()> {
        self.store.clear_all()
    }

    /// Recursively import every PNG/JPEG/WebP file under `folder`,
    /// sharing one trim size and one set of book options. Files that
    /// fail validation or decode are counted as skipped, not fatal.
    pub fn import_folder(
        &mut self,
        folder: &Path,
        trim: TrimSize,
        options: &BookOptions,
    ) -> Result<ImportResult> {
        let mut imported = 0;
        let mut skipped = 0;

        for entry in WalkDir::new(folder)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let Some(ext) = path.extension() else {
                continue;
            };
            let ext = ext.to_string_lossy().to_lowercase();
            if !COVER_EXTENSIONS.contains(&ext.as_str()) {
                continue;
            }

            let name = path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();

            let bytes = match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    eprintln!("⚠️  Could not read {name}: {e}");
                    skipped += 1;
                    continue;
                }
            };

            match self.add(&name, &bytes, trim, options) {
                Ok(_) => imported += 1,
                Err(e) => {
                    eprintln!("⚠️  Skipping {name}: {e}");
                    skipped += 1;
                }
            }
        }

        Ok(ImportResult { imported, skipped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_util::png_bytes;
    use crate::store::MemoryStore;

    fn registry() -> Registry<MemoryStore> {
        Registry::new(MemoryStore::new())
    }

    fn options_with_spine(spine: f64) -> BookOptions {
        BookOptions {
            spine_width_in: Some(spine),
            ..BookOptions::default()
        }
    }

    #[test]
    fn test_add_creates_record_and_stores_artwork() {
        let mut reg = registry();
        let bytes = png_bytes(60, 40);

        let record = reg
            .add("novel.png", &bytes, TrimSize::new(6.0, 9.0), &options_with_spine(0.5))
            .unwrap();

        assert_eq!(record.spine_width_in, 0.5);
        assert_eq!(reg.list().unwrap().len(), 1);
        assert_eq!(reg.artwork(&record.id).unwrap(), bytes);
    }

    #[test]
    fn test_add_derives_spine_from_page_count() {
        let mut reg = registry();
        let options = BookOptions {
            page_count: Some(400),
            ..BookOptions::default()
        };

        let record = reg
            .add("thick.png", &png_bytes(4, 4), TrimSize::new(6.0, 9.0), &options)
            .unwrap();
        assert!((record.spine_width_in - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_add_without_spine_writes_nothing() {
        let mut reg = registry();

        let err = reg
            .add(
                "no-spine.png",
                &png_bytes(4, 4),
                TrimSize::new(6.0, 9.0),
                &BookOptions::default(),
            )
            .unwrap_err();

        assert!(matches!(err, CoverError::Validation(_)));
        assert!(reg.list().unwrap().is_empty());
        // no orphaned blob either
        assert_eq!(reg.store().image_count(), 0);
    }

    #[test]
    fn test_add_rejects_bad_trim_before_writing() {
        let mut reg = registry();
        let err = reg
            .add(
                "huge.png",
                &png_bytes(4, 4),
                TrimSize::new(30.0, 9.0),
                &options_with_spine(0.5),
            )
            .unwrap_err();

        assert!(matches!(err, CoverError::Validation(_)));
        assert_eq!(reg.store().image_count(), 0);
    }

    #[test]
    fn test_remove_unknown_id_leaves_list_unchanged() {
        let mut reg = registry();
        reg.add("a.png", &png_bytes(4, 4), TrimSize::new(6.0, 9.0), &options_with_spine(0.5))
            .unwrap();

        let err = reg.remove("missing").unwrap_err();
        assert!(matches!(err, CoverError::NotFound { .. }));
        assert_eq!(reg.list().unwrap().len(), 1);
    }

    #[test]
    fn test_remove_deletes_record_and_blob() {
        let mut reg = registry();
        let record = reg
            .add("a.png", &png_bytes(4, 4), TrimSize::new(6.0, 9.0), &options_with_spine(0.5))
            .unwrap();

        reg.remove(&record.id).unwrap();
        assert!(reg.list().unwrap().is_empty());
        assert_eq!(reg.store().image_count(), 0);
    }

    #[test]
    fn test_update_edits_metadata_only() {
        let mut reg = registry();
        let record = reg
            .add("a.png", &png_bytes(4, 4), TrimSize::new(6.0, 9.0), &options_with_spine(0.5))
            .unwrap();

        let updated = reg
            .update(
                &record.id,
                &CoverUpdate {
                    original_name: Some("renamed.png".into()),
                    spine_width_in: Some(0.75),
                    ..CoverUpdate::default()
                },
            )
            .unwrap();

        assert_eq!(updated.original_name, "renamed.png");
        assert_eq!(updated.spine_width_in, 0.75);
        // artwork untouched
        assert_eq!(reg.artwork(&record.id).unwrap(), png_bytes(4, 4));
    }

    #[test]
    fn test_effective_dpi_scales_with_downscale() {
        assert_eq!(effective_dpi(300, 4500, 4096), 273);
        assert_eq!(effective_dpi(300, 4500, 4500), 300);
        // never rounds to zero
        assert_eq!(effective_dpi(1, 10_000, 1), 1);
    }

    #[test]
    fn test_update_bleed_margin_enables_bleed() {
        let mut reg = registry();
        let record = reg
            .add("a.png", &png_bytes(4, 4), TrimSize::new(6.0, 9.0), &options_with_spine(0.5))
            .unwrap();
        assert!(!record.has_bleed);

        let updated = reg
            .update(
                &record.id,
                &CoverUpdate {
                    bleed_in: Some(0.125),
                    ..CoverUpdate::default()
                },
            )
            .unwrap();

        assert!(updated.has_bleed);
        assert_eq!(updated.bleed_inches(), 0.125);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let mut reg = registry();
        let err = reg.update("missing", &CoverUpdate::default()).unwrap_err();
        assert!(matches!(err, CoverError::NotFound { .. }));
    }

    #[test]
    fn test_update_rejects_non_positive_spine() {
        let mut reg = registry();
        let record = reg
            .add("a.png", &png_bytes(4, 4), TrimSize::new(6.0, 9.0), &options_with_spine(0.5))
            .unwrap();

        let err = reg
            .update(
                &record.id,
                &CoverUpdate {
                    spine_width_in: Some(0.0),
                    ..CoverUpdate::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoverError::Validation(_)));

        // stored record is unchanged
        let stored = reg.find_by_id(&record.id).unwrap().unwrap();
        assert_eq!(stored.spine_width_in, 0.5);
    }

    #[test]
    fn test_search_matches_name_trim_and_preset() {
        let mut reg = registry();
        reg.add(
            "Moby Dick.png",
            &png_bytes(4, 4),
            TrimSize::new(6.0, 9.0),
            &options_with_spine(0.5),
        )
        .unwrap();
        reg.add(
            "atlas.png",
            &png_bytes(4, 4),
            TrimSize::new(11.0, 8.5),
            &options_with_spine(0.3),
        )
        .unwrap();

        // display name, case-insensitive
        assert_eq!(reg.search("moby").unwrap().len(), 1);
        // formatted trim size
        assert_eq!(reg.search("6 × 9").unwrap().len(), 1);
        // preset name and category
        assert_eq!(reg.search("us trade").unwrap().len(), 1);
        assert_eq!(reg.search("children").unwrap().len(), 1);
        // no match
        assert!(reg.search("zebra").unwrap().is_empty());
    }

    #[test]
    fn test_import_folder_counts_imported_and_skipped() {
        let dir = std::env::temp_dir().join(format!("cover_forge_import_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("good-1.png"), png_bytes(8, 8)).unwrap();
        std::fs::write(dir.join("good-2.jpg"), jpeg_bytes(8, 8)).unwrap();
        std::fs::write(dir.join("broken.png"), [0u8; 16]).unwrap();
        std::fs::write(dir.join("notes.txt"), b"not artwork").unwrap();

        let mut reg = registry();
        let result = reg
            .import_folder(&dir, TrimSize::new(6.0, 9.0), &options_with_spine(0.5))
            .unwrap();

        assert_eq!(result.imported, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(reg.list().unwrap().len(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 90, 200]));
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image::ImageFormat::Jpeg)
            .unwrap();
        out.into_inner()
    }
}
