// Tue Jan 15 2026 - Alex

pub mod config;
pub mod filter;
pub mod finder;
pub mod module;
pub mod search;
pub mod stores;
pub mod ui;
pub mod utils;

pub use config::FinderConfig;
pub use filter::{Candidate, Filter, FilterRef};
pub use finder::{FinderError, ModuleFinder};
pub use module::{ExportValue, ModuleCache, ModuleId, ModuleRecord, ModuleTable, ObjectRef};
pub use search::{Found, MangledMapping, ModuleSearch, Query, QueryMatch, SearchOptions};
pub use stores::StoreRegistry;
