// Wed Jan 15 2026 - Alex

use crate::filter::FilterRef;
use crate::module::{ExportValue, ModuleId, ModuleRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Collect every match instead of stopping at the first.
    pub all: bool,
    /// When false, a hit on the default key yields the whole container.
    pub default_export: bool,
    /// Test every own key of the container.
    pub search_exports: bool,
    /// Test the default key when `search_exports` is off.
    pub search_default: bool,
    /// Yield the module record instead of the value.
    pub raw: bool,
}

/// Defaults test every own key, so a bare value filter finds values nested
/// one level inside a module's exports.
impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            all: false,
            default_export: true,
            search_exports: true,
            search_default: true,
            raw: false,
        }
    }
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The host framework's own defaults: only the default key is searched.
    pub fn host_defaults() -> Self {
        Self::default().search_exports(false)
    }

    pub fn all(mut self, all: bool) -> Self {
        self.all = all;
        self
    }

    pub fn default_export(mut self, default_export: bool) -> Self {
        self.default_export = default_export;
        self
    }

    pub fn search_exports(mut self, search_exports: bool) -> Self {
        self.search_exports = search_exports;
        self
    }

    pub fn search_default(mut self, search_default: bool) -> Self {
        self.search_default = search_default;
        self
    }

    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }
}

#[derive(Clone)]
pub struct Query {
    pub filter: FilterRef,
    pub options: SearchOptions,
}

impl Query {
    pub fn new(filter: FilterRef) -> Self {
        Self {
            filter,
            options: SearchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn all(mut self) -> Self {
        self.options.all = true;
        self
    }

    pub fn default_key_only(mut self) -> Self {
        self.options.search_exports = false;
        self
    }

    pub fn raw(mut self) -> Self {
        self.options.raw = true;
        self
    }
}

/// One search hit: the matched value, or the module wrapper for raw searches.
#[derive(Debug, Clone)]
pub enum Found {
    Export(ExportValue),
    Module(Arc<ModuleRecord>),
}

impl Found {
    pub fn value(&self) -> &ExportValue {
        match self {
            Found::Export(value) => value,
            Found::Module(module) => module.exports(),
        }
    }

    pub fn into_value(self) -> ExportValue {
        match self {
            Found::Export(value) => value,
            Found::Module(module) => module.exports().clone(),
        }
    }

    pub fn as_module(&self) -> Option<&Arc<ModuleRecord>> {
        match self {
            Found::Module(module) => Some(module),
            Found::Export(_) => None,
        }
    }

    pub fn module_id(&self) -> Option<&ModuleId> {
        self.as_module().map(|m| m.id())
    }
}

impl PartialEq for Found {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Found::Export(a), Found::Export(b)) => a == b,
            (Found::Module(a), Found::Module(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryMatch {
    One(Found),
    Many(Vec<Found>),
}

impl QueryMatch {
    pub fn first(&self) -> Option<&Found> {
        match self {
            QueryMatch::One(found) => Some(found),
            QueryMatch::Many(found) => found.first(),
        }
    }

    pub fn into_vec(self) -> Vec<Found> {
        match self {
            QueryMatch::One(found) => vec![found],
            QueryMatch::Many(found) => found,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            QueryMatch::One(_) => 1,
            QueryMatch::Many(found) => found.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
