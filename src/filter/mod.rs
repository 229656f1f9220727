// Tue Jan 13 2026 - Alex

pub mod error;
pub mod library;
pub mod predicate;

pub use error::FilterError;
pub use library::{
    any, by_display_name, by_keys, by_name, by_prototype_keys, by_regex, by_source, by_store_name,
    by_strings, combine, negate, ByStoreName, SourcePattern,
};
pub use predicate::{custom, exported, fallible, Candidate, Filter, FilterRef};
