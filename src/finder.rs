// Thu Jan 16 2026 - Alex

use crate::config::FinderConfig;
use crate::filter::{by_display_name, by_keys, by_prototype_keys, by_source, by_strings, FilterRef, SourcePattern};
use crate::module::{ExportValue, ModuleTable};
use crate::search::{
    find_with_key, map_mangled, Found, KeyedExport, Locator, MangledMapping, ModuleSearch, Query, QueryMatch,
    SearchOptions,
};
use crate::stores::StoreRegistry;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use thiserror::Error;

static GLOBAL: OnceCell<ModuleFinder> = OnceCell::new();

#[derive(Error, Debug)]
pub enum FinderError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("A global module finder is already installed")]
    AlreadyInstalled,
}

/// Entry point bundling the search engine and the store registry over one
/// module table.
pub struct ModuleFinder {
    search: Arc<ModuleSearch>,
    stores: StoreRegistry,
}

impl ModuleFinder {
    pub fn new(table: Arc<dyn ModuleTable>) -> Self {
        Self::build(table, FinderConfig::default())
    }

    pub fn with_config(table: Arc<dyn ModuleTable>, config: FinderConfig) -> Result<Self, FinderError> {
        config.validate().map_err(FinderError::InvalidConfig)?;
        Ok(Self::build(table, config))
    }

    fn build(table: Arc<dyn ModuleTable>, config: FinderConfig) -> Self {
        let search = Arc::new(ModuleSearch::new(table, Arc::new(config)));
        let stores = StoreRegistry::new(search.clone());
        Self { search, stores }
    }

    /// Publishes a process-wide finder. Only the first install succeeds.
    pub fn install(finder: ModuleFinder) -> Result<&'static ModuleFinder, FinderError> {
        GLOBAL.set(finder).map_err(|_| FinderError::AlreadyInstalled)?;
        GLOBAL.get().ok_or(FinderError::AlreadyInstalled)
    }

    pub fn global() -> Option<&'static ModuleFinder> {
        GLOBAL.get()
    }

    pub fn search(&self) -> &ModuleSearch {
        &self.search
    }

    pub fn table(&self) -> &Arc<dyn ModuleTable> {
        self.search.table()
    }

    pub fn config(&self) -> &FinderConfig {
        self.search.config()
    }

    pub fn stores(&self) -> &StoreRegistry {
        &self.stores
    }

    pub fn get_module(&self, filter: &FilterRef, options: SearchOptions) -> Option<Found> {
        self.search.find(filter.as_ref(), options)
    }

    pub fn get_modules(&self, filter: &FilterRef, options: SearchOptions) -> Vec<Found> {
        self.search.find_all(filter.as_ref(), options)
    }

    pub fn get_bulk(&self, queries: &[Query]) -> Vec<Option<QueryMatch>> {
        self.search.find_bulk(queries)
    }

    pub fn get_mangled<N, I>(&self, locator: impl Into<Locator>, mappers: I, options: SearchOptions) -> MangledMapping
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, FilterRef)>,
    {
        map_mangled(&self.search, locator, mappers, options)
    }

    pub fn get_with_key(
        &self,
        filter: &FilterRef,
        target: Option<ExportValue>,
        options: SearchOptions,
    ) -> Option<KeyedExport> {
        find_with_key(&self.search, filter, target, options)
    }

    pub fn get_store(&self, name: &str) -> Option<ExportValue> {
        self.stores.get(name)
    }

    pub fn get_by_keys(&self, keys: &[&str], options: SearchOptions) -> Option<ExportValue> {
        self.value_of(&by_keys(keys), options)
    }

    pub fn get_by_prototype_keys(&self, keys: &[&str], options: SearchOptions) -> Option<ExportValue> {
        self.value_of(&by_prototype_keys(keys), options)
    }

    pub fn get_by_strings(&self, strings: &[&str], options: SearchOptions) -> Option<ExportValue> {
        self.value_of(&by_strings(strings), options)
    }

    pub fn get_by_source<P: Into<SourcePattern>>(
        &self,
        patterns: impl IntoIterator<Item = P>,
        options: SearchOptions,
    ) -> Option<ExportValue> {
        self.value_of(&by_source(patterns), options)
    }

    pub fn get_by_display_name(&self, name: &str, options: SearchOptions) -> Option<ExportValue> {
        self.value_of(&by_display_name(name), options)
    }

    fn value_of(&self, filter: &FilterRef, options: SearchOptions) -> Option<ExportValue> {
        self.get_module(filter, options.raw(false)).map(Found::into_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::exported;
    use crate::module::{Callable, ModuleCache, ModuleRecord, ObjectRef};

    fn sample_table() -> Arc<ModuleCache> {
        let cache = Arc::new(ModuleCache::new());
        cache.define(
            0u64,
            ObjectRef::new()
                .with_property("getCurrentUser", ObjectRef::function(Callable::new("a", "a(){}")))
                .with_property("getUser", ObjectRef::function(Callable::new("b", "b(){}"))),
        );
        cache.register(
            ModuleRecord::new(
                1u64,
                ObjectRef::new().with_property(
                    "Z",
                    ObjectRef::function(Callable::new("Menu", "function Menu(e){return e.navId}"))
                        .with_property("displayName", "Menu"),
                ),
            )
            .with_source("n.d(t,{Z:()=>Menu});\"menu-item\""),
        );
        cache
    }

    #[test]
    fn test_convenience_lookups() {
        let finder = ModuleFinder::new(sample_table());
        let options = SearchOptions::default();

        assert!(finder.get_by_keys(&["getCurrentUser", "getUser"], options).is_some());
        assert!(finder.get_by_keys(&["getGuild"], options).is_none());
        assert!(finder.get_by_strings(&["e.navId"], options).unwrap().is_function());
        assert!(finder.get_by_display_name("Menu", SearchOptions::host_defaults()).is_some());
        assert!(finder.get_by_source(["menu-item"], options).is_some());
        assert!(finder.get_by_prototype_keys(&["render"], options).is_none());
    }

    #[test]
    fn test_with_config_validates() {
        let table: Arc<dyn ModuleTable> = sample_table();
        let result = ModuleFinder::with_config(table, FinderConfig::new().with_default_keys(&[]));
        assert!(matches!(result, Err(FinderError::InvalidConfig(_))));
    }

    #[test]
    fn test_global_install_once() {
        let first = ModuleFinder::install(ModuleFinder::new(sample_table())).unwrap();
        assert!(ModuleFinder::global().is_some());
        assert!(first.get_by_keys(&["getUser"], SearchOptions::default()).is_some());

        let second = ModuleFinder::install(ModuleFinder::new(Arc::new(ModuleCache::new())));
        assert!(matches!(second, Err(FinderError::AlreadyInstalled)));
    }

    #[test]
    fn test_mangled_through_facade() {
        let finder = ModuleFinder::new(sample_table());
        let mapping = finder.get_mangled(
            "menu-item",
            [("Menu", exported(|v| v.is_function()))],
            SearchOptions::default(),
        );
        assert_eq!(mapping.key_of("Menu"), Some("Z"));
    }
}
