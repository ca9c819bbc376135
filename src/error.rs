/// Error taxonomy for the cover engine
///
/// Three families matter to callers:
/// - validation errors: bad input, reported with a human-readable reason,
///   never retried automatically
/// - not-found errors: operating on an unknown record id, distinct so a
///   caller can tell "nothing changed" from "succeeded"
/// - storage errors: the backing store failed; propagated unchanged, since
///   storage is local and a retry would not change the outcome
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoverError {
    /// Input failed a validation rule (trim bounds, spine width, file type).
    #[error("validation failed: {0}")]
    Validation(String),

    /// No record with the given id exists. The record list is unchanged.
    #[error("no cover record with id {id}")]
    NotFound { id: String },

    /// The SQLite backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The persisted record list could not be (de)serialized.
    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Uploaded artwork could not be decoded.
    #[error("image decode failed: {0}")]
    Decode(String),

    /// Filesystem failure while preparing the store location.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A background store task panicked or was aborted.
    #[error("background task failed: {0}")]
    TaskJoin(String),
}

pub type Result<T> = std::result::Result<T, CoverError>;
