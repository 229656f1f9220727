// Thu Jan 16 2026 - Alex

use crate::config::FinderConfig;
use crate::filter::{custom, ByStoreName, FilterRef};
use crate::module::ExportValue;
use crate::search::{ModuleSearch, SearchOptions};
use crate::stores::StoreError;
use ahash::AHashMap;
use itertools::Itertools;
use parking_lot::RwLock;
use std::sync::Arc;

/// Read-only lookup of the host's state stores by their self-reported name.
///
/// The store-enumeration facility is located on first use and kept for the
/// life of the process. Until it is found, every call retries the discovery,
/// so a facility that loads late is still picked up.
pub struct StoreRegistry {
    search: Arc<ModuleSearch>,
    facility: RwLock<Option<ExportValue>>,
    cache: RwLock<AHashMap<String, ExportValue>>,
}

impl StoreRegistry {
    pub fn new(search: Arc<ModuleSearch>) -> Self {
        Self {
            search,
            facility: RwLock::new(None),
            cache: RwLock::new(AHashMap::new()),
        }
    }

    fn config(&self) -> &FinderConfig {
        self.search.config()
    }

    fn facility_filter(&self) -> FilterRef {
        let key = self.config().store_facility_key.clone();
        let enumerator = self.config().store_enumerator.clone();
        custom(move |candidate| candidate.value.get(&key).get(&enumerator).is_function())
    }

    /// Locates the enumeration facility. Returns whether it is available.
    pub fn initialize(&self) -> bool {
        if self.facility.read().is_some() {
            return true;
        }

        let filter = self.facility_filter();
        match self.search.find(filter.as_ref(), SearchOptions::default()) {
            Some(found) => {
                log::debug!("Store facility located");
                let mut facility = self.facility.write();
                if facility.is_none() {
                    *facility = Some(found.into_value());
                }
                true
            }
            None => false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.facility.read().is_some()
    }

    pub fn get(&self, name: &str) -> Option<ExportValue> {
        if let Some(store) = self.cache.read().get(name) {
            return Some(store.clone());
        }

        let store = self.resolve(name)?;
        self.cache.write().insert(name.to_string(), store.clone());
        Some(store)
    }

    /// De-duplicated names of every store the facility knows about, in
    /// enumeration order.
    pub fn names(&self) -> Vec<String> {
        if !self.initialize() {
            return Vec::new();
        }
        self.all_stores()
            .unwrap_or_default()
            .iter()
            .filter_map(|store| self.store_name(store))
            .unique()
            .collect()
    }

    pub fn set(&self, name: &str, _store: ExportValue) -> Result<(), StoreError> {
        Err(StoreError::Unsupported(name.to_string()))
    }

    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }

    fn resolve(&self, name: &str) -> Option<ExportValue> {
        if !self.initialize() {
            let config = self.config();
            let filter = ByStoreName::new(name).with_keys(&config.store_dispatch_token, &config.store_name_method);
            return self
                .search
                .find(&filter, SearchOptions::default())
                .map(|found| found.into_value());
        }

        self.all_stores()?
            .into_iter()
            .find(|store| self.store_name(store).as_deref() == Some(name))
    }

    fn all_stores(&self) -> Option<Vec<ExportValue>> {
        let facility = self.facility.read().clone()?;
        let config = self.config();
        let store_class = facility.get(&config.store_facility_key);

        match store_class.call_method(&config.store_enumerator, &[]) {
            Ok(ExportValue::Array(stores)) => Some(stores),
            Ok(other) => {
                log::warn!("Store enumeration returned {} instead of an array", other.type_name());
                None
            }
            Err(e) => {
                log::warn!("Store enumeration failed: {}", e);
                None
            }
        }
    }

    fn store_name(&self, store: &ExportValue) -> Option<String> {
        store
            .call_method(&self.config().store_name_method, &[])
            .ok()
            .and_then(|name| name.as_str().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Callable, ModuleCache, ObjectRef};

    fn store(name: &str) -> ObjectRef {
        let get_name = ObjectRef::function(Callable::new("getName", "").returning(ExportValue::from(name)));
        ObjectRef::new()
            .with_property("_dispatchToken", format!("ID_{}", name))
            .with_property("getName", get_name)
    }

    fn facility(stores: &[ObjectRef]) -> ObjectRef {
        let all = ExportValue::Array(stores.iter().cloned().map(ExportValue::from).collect());
        let get_all = ObjectRef::function(Callable::new("getAll", "").returning(all));
        let store_class = ObjectRef::function(Callable::new("Store", "class Store{}")).with_property("getAll", get_all);
        ObjectRef::new().with_property("Store", store_class)
    }

    fn registry(cache: Arc<ModuleCache>) -> StoreRegistry {
        StoreRegistry::new(Arc::new(ModuleSearch::new(cache, Arc::new(FinderConfig::default()))))
    }

    #[test]
    fn test_get_through_facility() {
        let users = store("UserStore");
        let guilds = store("GuildStore");
        let cache = Arc::new(ModuleCache::new());
        cache.define(0u64, facility(&[users.clone(), guilds.clone()]));
        let stores = registry(cache);

        let found = stores.get("GuildStore").unwrap();
        assert_eq!(found, ExportValue::from(guilds));
        assert_eq!(found.call_method("getName", &[]), Ok(ExportValue::from("GuildStore")));
        assert!(stores.get("ChannelStore").is_none());
        assert_eq!(stores.cached(), 1);
    }

    #[test]
    fn test_fallback_without_facility() {
        let users = store("UserStore");
        let cache = Arc::new(ModuleCache::new());
        cache.define(0u64, ObjectRef::new().with_property("unrelated", 1));
        cache.define(1u64, users.clone());
        let stores = registry(cache);

        assert_eq!(stores.get("UserStore"), Some(ExportValue::from(users)));
        assert!(!stores.is_initialized());
        assert!(stores.names().is_empty());
    }

    #[test]
    fn test_initialize_retries_until_facility_loads() {
        let cache = Arc::new(ModuleCache::new());
        let stores = registry(cache.clone());
        assert!(!stores.initialize());

        cache.define(7u64, facility(&[store("UserStore")]));
        assert!(stores.initialize());
        assert!(stores.initialize());
        assert!(stores.is_initialized());
    }

    #[test]
    fn test_names_are_deduplicated() {
        let cache = Arc::new(ModuleCache::new());
        cache.define(0u64, facility(&[store("UserStore"), store("GuildStore"), store("UserStore")]));
        let stores = registry(cache);

        assert_eq!(stores.names(), vec!["UserStore", "GuildStore"]);
    }

    #[test]
    fn test_set_is_rejected() {
        let stores = registry(Arc::new(ModuleCache::new()));
        let result = stores.set("UserStore", ExportValue::from(1));

        assert_eq!(result, Err(StoreError::Unsupported("UserStore".to_string())));
    }
}
