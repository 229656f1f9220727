// Wed Jan 15 2026 - Alex

use crate::filter::{Candidate, Filter, FilterError, FilterRef};
use crate::module::ExportValue;
use regex::Regex;
use std::sync::Arc;

/// Every key must be reachable on the value, own or inherited.
pub struct ByKeys {
    keys: Vec<String>,
}

impl ByKeys {
    pub fn new(keys: &[&str]) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl Filter for ByKeys {
    fn test(&self, candidate: &Candidate<'_>) -> Result<bool, FilterError> {
        Ok(match candidate.value {
            ExportValue::Object(object) => self.keys.iter().all(|key| object.has(key)),
            _ => false,
        })
    }

    fn describe(&self) -> String {
        format!("byKeys({})", self.keys.join(", "))
    }
}

pub struct ByPrototypeKeys {
    keys: Vec<String>,
}

impl ByPrototypeKeys {
    pub fn new(keys: &[&str]) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl Filter for ByPrototypeKeys {
    fn test(&self, candidate: &Candidate<'_>) -> Result<bool, FilterError> {
        if !candidate.value.is_object() {
            return Ok(false);
        }
        let prototype = candidate.value.get("prototype");
        Ok(match prototype.as_object() {
            Some(prototype) => self.keys.iter().all(|key| prototype.has(key)),
            None => false,
        })
    }

    fn describe(&self) -> String {
        format!("byPrototypeKeys({})", self.keys.join(", "))
    }
}

pub struct ByRegex {
    pattern: Regex,
}

impl Filter for ByRegex {
    fn test(&self, candidate: &Candidate<'_>) -> Result<bool, FilterError> {
        if candidate.value.is_nullish() {
            return Ok(false);
        }
        Ok(self.pattern.is_match(&candidate.value.source_text()))
    }

    fn describe(&self) -> String {
        format!("byRegex(/{}/)", self.pattern.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum SourcePattern {
    Text(String),
    Regex(Regex),
}

impl SourcePattern {
    pub fn is_match(&self, source: &str) -> bool {
        match self {
            SourcePattern::Text(text) => source.contains(text.as_str()),
            SourcePattern::Regex(regex) => regex.is_match(source),
        }
    }
}

impl From<&str> for SourcePattern {
    fn from(value: &str) -> Self {
        SourcePattern::Text(value.to_string())
    }
}

impl From<String> for SourcePattern {
    fn from(value: String) -> Self {
        SourcePattern::Text(value)
    }
}

impl From<Regex> for SourcePattern {
    fn from(value: Regex) -> Self {
        SourcePattern::Regex(value)
    }
}

/// Matches on the factory source of the module the value came from.
pub struct BySource {
    patterns: Vec<SourcePattern>,
}

impl Filter for BySource {
    fn test(&self, candidate: &Candidate<'_>) -> Result<bool, FilterError> {
        let source = match candidate.module.and_then(|m| m.source()) {
            Some(source) if !source.is_empty() => source,
            _ => return Ok(false),
        };
        Ok(self.patterns.iter().all(|p| p.is_match(source)))
    }

    fn describe(&self) -> String {
        format!("bySource({} patterns)", self.patterns.len())
    }
}

pub struct ByStrings {
    strings: Vec<String>,
}

impl Filter for ByStrings {
    fn test(&self, candidate: &Candidate<'_>) -> Result<bool, FilterError> {
        if candidate.value.is_nullish() {
            return Ok(false);
        }
        let text = candidate.value.source_text();
        if text.is_empty() {
            return Ok(false);
        }
        Ok(self.strings.iter().all(|s| text.contains(s.as_str())))
    }

    fn describe(&self) -> String {
        format!("byStrings({})", self.strings.join(", "))
    }
}

pub struct ByDisplayName {
    name: String,
}

impl Filter for ByDisplayName {
    fn test(&self, candidate: &Candidate<'_>) -> Result<bool, FilterError> {
        Ok(candidate.value.get("displayName").as_str() == Some(self.name.as_str()))
    }

    fn describe(&self) -> String {
        format!("byDisplayName({})", self.name)
    }
}

pub struct ByName {
    name: String,
}

impl Filter for ByName {
    fn test(&self, candidate: &Candidate<'_>) -> Result<bool, FilterError> {
        Ok(candidate
            .value
            .as_object()
            .and_then(|object| object.callable())
            .map(|callable| callable.name == self.name)
            .unwrap_or(false))
    }

    fn describe(&self) -> String {
        format!("byName({})", self.name)
    }
}

/// A store carries a dispatch token and reports its own name.
pub struct ByStoreName {
    name: String,
    dispatch_token: String,
    name_method: String,
}

impl ByStoreName {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            dispatch_token: "_dispatchToken".to_string(),
            name_method: "getName".to_string(),
        }
    }

    pub fn with_keys(mut self, dispatch_token: &str, name_method: &str) -> Self {
        self.dispatch_token = dispatch_token.to_string();
        self.name_method = name_method.to_string();
        self
    }
}

impl Filter for ByStoreName {
    fn test(&self, candidate: &Candidate<'_>) -> Result<bool, FilterError> {
        let value = candidate.value;
        if !value.get(&self.dispatch_token).is_truthy() || !value.get(&self.name_method).is_function() {
            return Ok(false);
        }
        let reported = value.call_method(&self.name_method, &[])?;
        Ok(reported.as_str() == Some(self.name.as_str()))
    }

    fn describe(&self) -> String {
        format!("byStoreName({})", self.name)
    }
}

pub struct Combine {
    filters: Vec<FilterRef>,
}

impl Filter for Combine {
    fn test(&self, candidate: &Candidate<'_>) -> Result<bool, FilterError> {
        for filter in &self.filters {
            if !filter.test(candidate)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn describe(&self) -> String {
        let parts: Vec<String> = self.filters.iter().map(|f| f.describe()).collect();
        format!("combine({})", parts.join(" && "))
    }
}

pub struct AnyOf {
    filters: Vec<FilterRef>,
}

impl Filter for AnyOf {
    fn test(&self, candidate: &Candidate<'_>) -> Result<bool, FilterError> {
        for filter in &self.filters {
            if filter.test(candidate)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn describe(&self) -> String {
        let parts: Vec<String> = self.filters.iter().map(|f| f.describe()).collect();
        format!("any({})", parts.join(" || "))
    }
}

pub struct Negate {
    inner: FilterRef,
}

impl Filter for Negate {
    fn test(&self, candidate: &Candidate<'_>) -> Result<bool, FilterError> {
        Ok(!self.inner.test(candidate)?)
    }

    fn describe(&self) -> String {
        format!("not({})", self.inner.describe())
    }
}

pub fn by_keys(keys: &[&str]) -> FilterRef {
    Arc::new(ByKeys::new(keys))
}

pub fn by_prototype_keys(keys: &[&str]) -> FilterRef {
    Arc::new(ByPrototypeKeys::new(keys))
}

pub fn by_regex(pattern: Regex) -> FilterRef {
    Arc::new(ByRegex { pattern })
}

pub fn by_source<P: Into<SourcePattern>>(patterns: impl IntoIterator<Item = P>) -> FilterRef {
    Arc::new(BySource {
        patterns: patterns.into_iter().map(Into::into).collect(),
    })
}

pub fn by_strings(strings: &[&str]) -> FilterRef {
    Arc::new(ByStrings {
        strings: strings.iter().map(|s| s.to_string()).collect(),
    })
}

pub fn by_display_name(name: &str) -> FilterRef {
    Arc::new(ByDisplayName { name: name.to_string() })
}

pub fn by_name(name: &str) -> FilterRef {
    Arc::new(ByName { name: name.to_string() })
}

pub fn by_store_name(name: &str) -> FilterRef {
    Arc::new(ByStoreName::new(name))
}

pub fn combine(filters: Vec<FilterRef>) -> FilterRef {
    Arc::new(Combine { filters })
}

pub fn any(filters: Vec<FilterRef>) -> FilterRef {
    Arc::new(AnyOf { filters })
}

pub fn negate(inner: FilterRef) -> FilterRef {
    Arc::new(Negate { inner })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Callable, ModuleRecord, ObjectRef};

    fn function(name: &str, source: &str) -> ObjectRef {
        ObjectRef::function(Callable::new(name, source))
    }

    fn check(filter: &FilterRef, value: &ExportValue) -> bool {
        filter.test(&Candidate::value_only(value)).unwrap_or(false)
    }

    #[test]
    fn test_by_keys_sees_inherited_properties() {
        let proto = ObjectRef::new().with_property("getCurrentUser", function("a", "a(){}"));
        let store = ExportValue::from(ObjectRef::new().with_property("getUser", 1).with_prototype(proto));

        assert!(check(&by_keys(&["getUser", "getCurrentUser"]), &store));
        assert!(!check(&by_keys(&["getUser", "getGuild"]), &store));
        assert!(!check(&by_keys(&["length"]), &ExportValue::from("text")));
    }

    #[test]
    fn test_by_prototype_keys() {
        let component = function("Popout", "class Popout{}")
            .with_property("prototype", ObjectRef::new().with_property("render", function("render", "render(){}")));

        assert!(check(&by_prototype_keys(&["render"]), &ExportValue::from(component)));
        assert!(!check(&by_prototype_keys(&["render"]), &ExportValue::from(ObjectRef::new())));
    }

    #[test]
    fn test_by_strings_and_regex() {
        let value = ExportValue::from(function("n", "function n(e){return e.type===\"USER_UPDATE\"}"));

        assert!(check(&by_strings(&["USER_UPDATE", "e.type"]), &value));
        assert!(!check(&by_strings(&["USER_UPDATE", "GUILD_CREATE"]), &value));
        assert!(check(&by_regex(Regex::new(r"USER_\w+").unwrap()), &value));
        assert!(!check(&by_strings(&["x"]), &ExportValue::Undefined));
    }

    #[test]
    fn test_by_source_requires_every_pattern() {
        let record = ModuleRecord::new(5u64, ObjectRef::new()).with_source("e.exports={sendMessage:n,editMessage:r}");
        let candidate = Candidate::new(record.exports(), &record);

        assert_eq!(by_source(["sendMessage", "editMessage"]).test(&candidate), Ok(true));
        assert_eq!(by_source(["sendMessage", "deleteMessage"]).test(&candidate), Ok(false));
        assert_eq!(
            by_source([Regex::new(r"edit\w+:").unwrap()]).test(&candidate),
            Ok(true)
        );
        assert_eq!(by_source(["sendMessage"]).test(&Candidate::value_only(record.exports())), Ok(false));
    }

    #[test]
    fn test_by_store_name() {
        let get_name = ObjectRef::function(Callable::new("getName", "").returning(ExportValue::from("UserStore")));
        let store = ExportValue::from(
            ObjectRef::new()
                .with_property("_dispatchToken", "ID_1")
                .with_property("getName", get_name),
        );

        assert!(check(&by_store_name("UserStore"), &store));
        assert!(!check(&by_store_name("GuildStore"), &store));

        let broken = ExportValue::from(
            ObjectRef::new()
                .with_property("_dispatchToken", "ID_2")
                .with_property("getName", function("getName", "")),
        );
        assert!(by_store_name("UserStore").test(&Candidate::value_only(&broken)).is_err());
    }

    #[test]
    fn test_combinators() {
        let value = ExportValue::from(ObjectRef::new().with_property("a", 1).with_property("displayName", "Menu"));

        assert!(check(&combine(vec![by_keys(&["a"]), by_display_name("Menu")]), &value));
        assert!(!check(&combine(vec![by_keys(&["a"]), by_display_name("Other")]), &value));
        assert!(check(&any(vec![by_keys(&["zz"]), by_display_name("Menu")]), &value));
        assert!(check(&negate(by_keys(&["zz"])), &value));
        assert_eq!(negate(by_keys(&["a"])).describe(), "not(byKeys(a))");
    }

    #[test]
    fn test_by_name() {
        let value = ExportValue::from(function("useStateFromStores", "function useStateFromStores(){}"));
        assert!(check(&by_name("useStateFromStores"), &value));
        assert!(!check(&by_name("other"), &value));
    }
}
