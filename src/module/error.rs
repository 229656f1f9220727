// Tue Jan 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    #[error("Value is not callable: {0}")]
    NotCallable(String),
    #[error("Property not found: {0}")]
    MissingProperty(String),
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("Native call failed: {0}")]
    Native(String),
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid function descriptor: {0}")]
    InvalidFunction(String),
    #[error("Duplicate module id: {0}")]
    DuplicateModule(String),
}
