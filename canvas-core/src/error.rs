//! Error types for canvas document operations.

use thiserror::Error;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in canvas operations.
///
/// Every variant is a contract violation by the calling code: a referenced
/// record does not exist or a record is malformed. Conditions that the
/// canvas treats as "nothing to do" are not errors.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Shape not found in the document.
    #[error("Shape not found: {0}")]
    ShapeNotFound(String),

    /// Parent shape not found in the document.
    #[error("Parent shape with id {0} not found")]
    ParentNotFound(String),

    /// Asset not found in the document.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// A record with this identity already exists.
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    /// Position, size or rotation is not a finite number.
    #[error("Invalid geometry for {0}")]
    InvalidGeometry(String),

    /// Invalid shape operation.
    #[error("Invalid operation on shape: {0}")]
    InvalidOperation(String),

    /// Media payload could not be decoded.
    #[error("Invalid media: {0}")]
    InvalidMedia(String),

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
