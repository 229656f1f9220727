// Tue Jan 13 2026 - Alex

use crate::module::ValueError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Value access failed: {0}")]
    Value(#[from] ValueError),
    #[error("Filter rejected candidate: {0}")]
    Rejected(String),
}
