/// SQLite-backed store
///
/// Durable analogue of the original app's IndexedDB backend. The record
/// list is stored one row per record with an explicit position column
/// (whole-list replace keeps the ordered-sequence semantics), the record
/// body as a JSON text column. Image blobs live in their own table.
///
/// Oversized artwork is downscaled and re-encoded as JPEG on write, so a
/// catalog of print-resolution covers does not balloon the database.
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::ImageFormat;
use rusqlite::{Connection, OptionalExtension};
use tokio::task;

use crate::error::{CoverError, Result};
use crate::state::data::{BookOptions, CoverRecord};
use crate::store::{CoverStore, StoredImage};

/// Artwork whose longest side exceeds this is downscaled and re-encoded
/// before storage; anything smaller is stored byte-for-byte.
pub const RECOMPRESS_THRESHOLD_PX: u32 = 4096;

pub struct DatabaseStore {
    conn: Connection,
    db_path: PathBuf,
}

impl DatabaseStore {
    /// Open (or create) the store at the default location:
    /// - Linux: ~/.local/share/cover-forge/cover_forge.db
    /// - macOS: ~/Library/Application Support/cover-forge/cover_forge.db
    /// - Windows: %APPDATA%\cover-forge\cover_forge.db
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_db_path())
    }

    /// Open (or create) the store at an explicit path.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;
        let store = DatabaseStore { conn, db_path };
        store.init_schema()?;

        Ok(store)
    }

    /// Transient store for tests; nothing touches disk.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = DatabaseStore {
            conn,
            db_path: PathBuf::from(":memory:"),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Where the database lives by default.
    pub fn default_db_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        path.push("cover-forge");
        path.push("cover_forge.db");
        path
    }

    fn init_schema(&self) -> Result<()> {
        // Cover records, position-ordered, body as JSON text
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS covers (
                id              TEXT PRIMARY KEY,
                position        INTEGER NOT NULL,
                record_json     TEXT NOT NULL
            )",
            [],
        )?;

        // Raw (or recompressed) artwork bytes
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS images (
                id              TEXT PRIMARY KEY,
                data            BLOB NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_covers_position
             ON covers(position)",
            [],
        )?;

        Ok(())
    }

    /// Path to the database file.
    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

impl CoverStore for DatabaseStore {
    fn list_records(&self) -> Result<Vec<CoverRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT record_json FROM covers ORDER BY position ASC")?;

        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for json in rows {
            records.push(CoverRecord::from_json(&json?)?);
        }

        Ok(records)
    }

    fn save_records(&mut self, records: &[CoverRecord]) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM covers", [])?;
        for (position, record) in records.iter().enumerate() {
            tx.execute(
                "INSERT INTO covers (id, position, record_json) VALUES (?1, ?2, ?3)",
                rusqlite::params![record.id, position as i64, record.to_json()?],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn put_image(&mut self, id: &str, bytes: &[u8]) -> Result<StoredImage> {
        let (stored, px_width, px_height) = prepare_image_bytes(bytes)?;

        self.conn.execute(
            "INSERT OR REPLACE INTO images (id, data) VALUES (?1, ?2)",
            rusqlite::params![id, stored],
        )?;

        Ok(StoredImage {
            image_ref: id.to_string(),
            px_width,
            px_height,
        })
    }

    fn get_image(&self, image_ref: &str) -> Result<Option<Vec<u8>>> {
        let data = self
            .conn
            .query_row(
                "SELECT data FROM images WHERE id = ?1",
                rusqlite::params![image_ref],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;

        Ok(data)
    }

    fn delete_image(&mut self, image_ref: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM images WHERE id = ?1",
            rusqlite::params![image_ref],
        )?;
        Ok(())
    }

    fn clear_all(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM covers", [])?;
        tx.execute("DELETE FROM images", [])?;
        tx.commit()?;
        Ok(())
    }
}

impl std::fmt::Debug for DatabaseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// Downscale and re-encode artwork whose longest side exceeds the
/// threshold; pass smaller artwork through untouched so put/get stays
/// byte-equivalent in the common case. Returns the stored bytes with the
/// pixel size they decode to.
fn prepare_image_bytes(bytes: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
    let (width, height) = crate::store::decode_dimensions(bytes)?;
    if width.max(height) <= RECOMPRESS_THRESHOLD_PX {
        return Ok((bytes.to_vec(), width, height));
    }

    let img = image::load_from_memory(bytes).map_err(|e| CoverError::Decode(e.to_string()))?;
    let resized = img.resize(
        RECOMPRESS_THRESHOLD_PX,
        RECOMPRESS_THRESHOLD_PX,
        FilterType::Lanczos3,
    );
    let (new_width, new_height) = (resized.width(), resized.height());

    // JPEG has no alpha channel
    let mut out = Cursor::new(Vec::new());
    resized
        .to_rgb8()
        .write_to(&mut out, ImageFormat::Jpeg)
        .map_err(|e| CoverError::Decode(e.to_string()))?;

    Ok((out.into_inner(), new_width, new_height))
}

/// Store image bytes on a blocking thread.
///
/// `rusqlite::Connection` is not `Send`, so the task opens its own
/// connection from the path instead of sharing the caller's.
pub async fn put_image_async(db_path: PathBuf, id: String, bytes: Vec<u8>) -> Result<StoredImage> {
    task::spawn_blocking(move || {
        let mut store = DatabaseStore::open(&db_path)?;
        store.put_image(&id, &bytes)
    })
    .await
    .map_err(|e| CoverError::TaskJoin(e.to_string()))?
}

/// Fetch image bytes on a blocking thread; same fresh-connection rule.
pub async fn get_image_async(db_path: PathBuf, image_ref: String) -> Result<Option<Vec<u8>>> {
    task::spawn_blocking(move || {
        let store = DatabaseStore::open(&db_path)?;
        store.get_image(&image_ref)
    })
    .await
    .map_err(|e| CoverError::TaskJoin(e.to_string()))?
}

/// Run a folder import against a fresh connection on a blocking thread.
pub async fn import_folder_async(
    db_path: PathBuf,
    folder: PathBuf,
    options: BookOptions,
    trim: crate::state::data::TrimSize,
) -> Result<crate::registry::ImportResult> {
    task::spawn_blocking(move || {
        let store = DatabaseStore::open(&db_path)?;
        let mut registry = crate::registry::Registry::new(store);
        registry.import_folder(&folder, trim, &options)
    })
    .await
    .map_err(|e| CoverError::TaskJoin(e.to_string()))?
}
