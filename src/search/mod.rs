// Wed Jan 15 2026 - Alex

pub mod engine;
pub mod error;
pub mod keyed;
pub mod mangled;
pub mod options;

pub use engine::ModuleSearch;
pub use error::MangledError;
pub use keyed::{find_with_key, KeyedExport};
pub use mangled::{map_mangled, Binding, Locator, MangledMapping};
pub use options::{Found, Query, QueryMatch, SearchOptions};
