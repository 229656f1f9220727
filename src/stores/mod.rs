// Thu Jan 16 2026 - Alex

pub mod error;
pub mod registry;

pub use error::StoreError;
pub use registry::StoreRegistry;
