// Thu Jan 16 2026 - Alex

use crate::filter::{Candidate, Filter, FilterError, FilterRef};
use crate::module::ExportValue;
use crate::search::{ModuleSearch, SearchOptions};
use std::sync::Arc;

/// A located export container and the key inside it that satisfied the filter.
#[derive(Debug, Clone)]
pub struct KeyedExport {
    pub target: ExportValue,
    pub key: Option<String>,
}

impl KeyedExport {
    /// Current value behind the key.
    pub fn value(&self) -> Option<ExportValue> {
        self.key.as_ref().map(|key| self.target.get(key))
    }
}

/// Container filter: some own value passes `inner`.
struct AnyOwnValue {
    inner: FilterRef,
}

impl Filter for AnyOwnValue {
    fn test(&self, candidate: &Candidate<'_>) -> Result<bool, FilterError> {
        for value in candidate.value.own_values() {
            let nested = Candidate {
                value: &value,
                module: candidate.module,
            };
            if self.inner.test(&nested)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn describe(&self) -> String {
        format!("anyOwnValue({})", self.inner.describe())
    }
}

pub fn find_with_key(
    search: &ModuleSearch,
    filter: &FilterRef,
    target: Option<ExportValue>,
    options: SearchOptions,
) -> Option<KeyedExport> {
    let target = match target {
        Some(target) => target,
        None => {
            let locator = AnyOwnValue { inner: Arc::clone(filter) };
            // The key is looked up on the object holding the matching value,
            // so a raw projection to the module record would lose it.
            search.find(&locator, options.raw(false))?.into_value()
        }
    };

    let key = target.own_keys().into_iter().find(|key| {
        let value = target.get(key);
        search.evaluate(filter.as_ref(), &Candidate::value_only(&value))
    });

    Some(KeyedExport { target, key })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FinderConfig;
    use crate::filter::{by_strings, exported};
    use crate::module::{Callable, ModuleCache, ObjectRef};

    fn search_over(cache: ModuleCache) -> ModuleSearch {
        ModuleSearch::new(Arc::new(cache), Arc::new(FinderConfig::default()))
    }

    fn function(source: &str) -> ExportValue {
        ExportValue::from(ObjectRef::function(Callable::new("", source)))
    }

    #[test]
    fn test_reports_module_and_key() {
        let cache = ModuleCache::new();
        cache.define(0u64, ObjectRef::new().with_property("a", function("noop")));
        let actions = ObjectRef::new()
            .with_property("Ab", function("function(){return 1}"))
            .with_property("x9", function("function(e){dispatch({type:\"MESSAGE_SEND\"})}"));
        cache.define(1u64, actions.clone());
        let search = search_over(cache);

        let found = find_with_key(&search, &by_strings(&["MESSAGE_SEND"]), None, SearchOptions::default()).unwrap();

        assert_eq!(found.target, ExportValue::from(actions.clone()));
        assert_eq!(found.key.as_deref(), Some("x9"));

        actions.set("x9", 5);
        assert_eq!(found.value(), Some(ExportValue::from(5)));
    }

    #[test]
    fn test_preset_target_skips_search() {
        let search = search_over(ModuleCache::new());
        let target = ExportValue::from(ObjectRef::new().with_property("q", 1).with_property("r", 2));

        let found = find_with_key(
            &search,
            &exported(|v| v.as_number() == Some(2.0)),
            Some(target.clone()),
            SearchOptions::default(),
        )
        .unwrap();
        assert_eq!(found.target, target);
        assert_eq!(found.key.as_deref(), Some("r"));

        let missing = find_with_key(&search, &exported(|_| false), Some(target), SearchOptions::default()).unwrap();
        assert!(missing.key.is_none());
    }

    #[test]
    fn test_raw_option_still_reports_key() {
        let cache = ModuleCache::new();
        let inner = ObjectRef::new().with_property("q", 7);
        cache.define(0u64, ObjectRef::new().with_property("Z", inner.clone()));
        let search = search_over(cache);
        let filter = exported(|v| v.as_number() == Some(7.0));

        let plain = find_with_key(&search, &filter, None, SearchOptions::default()).unwrap();
        let raw = find_with_key(&search, &filter, None, SearchOptions::new().raw(true)).unwrap();

        assert_eq!(plain.key.as_deref(), Some("q"));
        assert_eq!(raw.key.as_deref(), Some("q"));
        assert_eq!(raw.target, ExportValue::from(inner));
    }

    #[test]
    fn test_nothing_found() {
        let search = search_over(ModuleCache::new());
        assert!(find_with_key(&search, &exported(|_| true), None, SearchOptions::default()).is_none());
    }
}
