use thiserror::Error;

use crate::catalog::CategoryKind;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Category is not configured: {0}")]
    UnknownCategory(CategoryKind),
    #[error("Invalid object URL {url}: {reason}")]
    InvalidObjectUrl { url: String, reason: String },
    #[error("Failed to read catalog file: {0}")]
    CatalogIOError(std::io::Error),
    #[error("Failed to parse catalog file: {0}")]
    CatalogParseError(serde_json::Error),
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read/write document log: {0}")]
    Io(std::io::Error),
    #[error("Failed to serialize/deserialize document: {0}")]
    Serialization(serde_json::Error),
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Document store unavailable: {0}")]
    Unavailable(String),
    #[error("Document store operation timed out")]
    Timeout,
}
