// Thu Jan 16 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Setting stores is not allowed (attempted to set {0})")]
    Unsupported(String),
}
