// Thu Jan 16 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MangledError {
    #[error("Unknown mapping name: {0}")]
    UnknownName(String),
    #[error("Mapping name has no bound key: {0}")]
    Unbound(String),
    #[error("Located export is not an object")]
    NoTarget,
}
