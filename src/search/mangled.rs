// Thu Jan 16 2026 - Alex

use crate::filter::{by_source, Candidate, FilterRef, SourcePattern};
use crate::module::ExportValue;
use crate::search::{MangledError, ModuleSearch, SearchOptions};
use indexmap::IndexMap;
use regex::Regex;

/// How the module holding the mangled exports is located.
pub enum Locator {
    Filter(FilterRef),
    Source(SourcePattern),
}

impl Locator {
    fn into_filter(self) -> FilterRef {
        match self {
            Locator::Filter(filter) => filter,
            Locator::Source(pattern) => by_source([pattern]),
        }
    }
}

impl From<FilterRef> for Locator {
    fn from(value: FilterRef) -> Self {
        Locator::Filter(value)
    }
}

impl From<&str> for Locator {
    fn from(value: &str) -> Self {
        Locator::Source(SourcePattern::from(value))
    }
}

impl From<String> for Locator {
    fn from(value: String) -> Self {
        Locator::Source(SourcePattern::from(value))
    }
}

impl From<Regex> for Locator {
    fn from(value: Regex) -> Self {
        Locator::Source(SourcePattern::from(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Bound(String),
    Absent,
}

/// Stable names bound to minified keys of one located export container.
///
/// Reads and writes go to the container every time, so a slot the host
/// replaces after binding is seen through the mapping.
#[derive(Debug, Clone)]
pub struct MangledMapping {
    target: Option<ExportValue>,
    bindings: IndexMap<String, Binding>,
}

impl MangledMapping {
    fn absent(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            target: None,
            bindings: names.into_iter().map(|name| (name, Binding::Absent)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<ExportValue> {
        match (self.bindings.get(name)?, &self.target) {
            (Binding::Bound(key), Some(target)) => Some(target.get(key)),
            _ => None,
        }
    }

    pub fn set(&self, name: &str, value: impl Into<ExportValue>) -> Result<(), MangledError> {
        let key = match self.bindings.get(name) {
            Some(Binding::Bound(key)) => key,
            Some(Binding::Absent) => return Err(MangledError::Unbound(name.to_string())),
            None => return Err(MangledError::UnknownName(name.to_string())),
        };
        let object = self
            .target
            .as_ref()
            .and_then(|target| target.as_object())
            .ok_or(MangledError::NoTarget)?;

        object.set(key.clone(), value);
        Ok(())
    }

    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn key_of(&self, name: &str) -> Option<&str> {
        match self.bindings.get(name)? {
            Binding::Bound(key) => Some(key),
            Binding::Absent => None,
        }
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.key_of(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.bindings.iter().map(|(name, binding)| (name.as_str(), binding))
    }

    /// The located container, mostly for debugging.
    pub fn target(&self) -> Option<&ExportValue> {
        self.target.as_ref()
    }
}

pub fn map_mangled<N, I>(
    search: &ModuleSearch,
    locator: impl Into<Locator>,
    mappers: I,
    options: SearchOptions,
) -> MangledMapping
where
    N: Into<String>,
    I: IntoIterator<Item = (N, FilterRef)>,
{
    let mappers: IndexMap<String, FilterRef> = mappers
        .into_iter()
        .map(|(name, filter)| (name.into(), filter))
        .collect();

    let filter = locator.into().into_filter();
    let target = match search.find(filter.as_ref(), options) {
        Some(found) => found.into_value(),
        None => {
            log::debug!("Mangled locator {} found nothing", filter.describe());
            return MangledMapping::absent(mappers.into_keys());
        }
    };

    let mut bound: IndexMap<&str, String> = IndexMap::new();
    for key in target.own_keys() {
        let value = target.get(&key);
        for (name, mapper) in &mappers {
            if bound.contains_key(name.as_str()) {
                continue;
            }
            if search.evaluate(mapper.as_ref(), &Candidate::value_only(&value)) {
                bound.insert(name.as_str(), key.clone());
            }
        }
    }

    let bindings: IndexMap<String, Binding> = mappers
        .keys()
        .map(|name| {
            let binding = match bound.get(name.as_str()) {
                Some(key) => Binding::Bound(key.clone()),
                None => Binding::Absent,
            };
            (name.clone(), binding)
        })
        .collect();

    MangledMapping {
        target: Some(target),
        bindings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FinderConfig;
    use crate::filter::{by_keys, by_strings, exported};
    use crate::module::{Callable, ModuleCache, ModuleRecord, ObjectRef};
    use std::sync::Arc;

    fn search_over(cache: ModuleCache) -> ModuleSearch {
        ModuleSearch::new(Arc::new(cache), Arc::new(FinderConfig::default()))
    }

    fn function(source: &str) -> ExportValue {
        ExportValue::from(ObjectRef::function(Callable::new("", source)))
    }

    fn number_is(n: f64) -> FilterRef {
        exported(move |v| v.as_number() == Some(n))
    }

    #[test]
    fn test_binds_names_to_keys_as_live_views() {
        let cache = ModuleCache::new();
        let module = ObjectRef::new().with_property("x", 1).with_property("y", 2);
        cache.define(0u64, module.clone());
        let search = search_over(cache);

        let mapping = map_mangled(
            &search,
            by_keys(&["x", "y"]),
            [("a", number_is(1.0)), ("b", number_is(2.0))],
            SearchOptions::default(),
        );

        assert_eq!(mapping.get("a"), Some(ExportValue::from(1)));
        assert_eq!(mapping.get("b"), Some(ExportValue::from(2)));
        assert_eq!(mapping.key_of("a"), Some("x"));

        module.set("x", 10);
        assert_eq!(mapping.get("a"), Some(ExportValue::from(10)));
    }

    #[test]
    fn test_writes_go_through_to_module() {
        let cache = ModuleCache::new();
        let module = ObjectRef::new().with_property("q7", function("function(){return\"open\"}"));
        cache.define(0u64, module.clone());
        let search = search_over(cache);

        let mapping = map_mangled(
            &search,
            by_keys(&["q7"]),
            [("open", by_strings(&["open"])), ("close", by_strings(&["close"]))],
            SearchOptions::default(),
        );

        mapping.set("open", 42).unwrap();
        assert_eq!(module.get("q7"), Some(ExportValue::from(42)));
        assert_eq!(mapping.set("close", 1), Err(MangledError::Unbound("close".to_string())));
        assert_eq!(mapping.set("other", 1), Err(MangledError::UnknownName("other".to_string())));
    }

    #[test]
    fn test_missing_locator_yields_every_name_absent() {
        let search = search_over(ModuleCache::new());
        let mapping = map_mangled(
            &search,
            by_keys(&["nothing"]),
            [("a", number_is(1.0)), ("b", number_is(2.0))],
            SearchOptions::default(),
        );

        assert!(mapping.contains("a") && mapping.contains("b"));
        assert_eq!(mapping.binding("a"), Some(&Binding::Absent));
        assert!(mapping.get("b").is_none());
        assert!(mapping.target().is_none());
    }

    #[test]
    fn test_first_key_wins_and_unmatched_is_absent() {
        let cache = ModuleCache::new();
        cache.define(0u64, ObjectRef::new().with_property("k1", 5).with_property("k2", 5));
        let search = search_over(cache);

        let mapping = map_mangled(
            &search,
            by_keys(&["k1"]),
            [("five", number_is(5.0)), ("six", number_is(6.0))],
            SearchOptions::default(),
        );

        assert_eq!(mapping.key_of("five"), Some("k1"));
        assert_eq!(mapping.binding("six"), Some(&Binding::Absent));
        assert_eq!(mapping.names().collect::<Vec<_>>(), vec!["five", "six"]);
    }

    #[test]
    fn test_string_locator_matches_module_source() {
        let cache = ModuleCache::new();
        cache.register(ModuleRecord::new(0u64, ObjectRef::new().with_property("a", 1)).with_source("unrelated"));
        cache.register(
            ModuleRecord::new(1u64, ObjectRef::new().with_property("b", 1))
                .with_source("function(){return\"CHANNEL_SELECT\"}"),
        );
        let search = search_over(cache);

        let mapping = map_mangled(&search, "CHANNEL_SELECT", [("one", number_is(1.0))], SearchOptions::default());
        assert_eq!(mapping.key_of("one"), Some("b"));

        let raw = map_mangled(
            &search,
            Regex::new(r"CHANNEL_\w+").unwrap(),
            [("one", number_is(1.0))],
            SearchOptions::new().raw(true),
        );
        assert_eq!(raw.key_of("one"), Some("b"));
    }
}
