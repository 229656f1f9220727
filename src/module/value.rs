// Tue Jan 13 2026 - Alex

use crate::module::ValueError;
use bitflags::bitflags;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

const MAX_PROTOTYPE_DEPTH: usize = 64;

bitflags! {
    /// Host-side markers that decide whether a scan may touch an export.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ObjectFlags: u8 {
        /// Lazy chunk proxy; reading it would run the chunk loader.
        const PLACEHOLDER = 0b0001;
        /// Window-like global object.
        const GLOBAL = 0b0010;
        const TYPED_ARRAY = 0b0100;
    }
}

pub type NativeFn =
    Arc<dyn Fn(&ExportValue, &[ExportValue]) -> Result<ExportValue, ValueError> + Send + Sync>;

/// Function half of an object: its name, its source text and an optional body.
#[derive(Clone)]
pub struct Callable {
    pub name: String,
    pub source: String,
    native: Option<NativeFn>,
}

impl Callable {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            native: None,
        }
    }

    pub fn with_native<F>(mut self, body: F) -> Self
    where
        F: Fn(&ExportValue, &[ExportValue]) -> Result<ExportValue, ValueError> + Send + Sync + 'static,
    {
        self.native = Some(Arc::new(body));
        self
    }

    pub fn returning(self, value: ExportValue) -> Self {
        self.with_native(move |_, _| Ok(value.clone()))
    }

    pub fn has_body(&self) -> bool {
        self.native.is_some()
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("source_len", &self.source.len())
            .field("native", &self.native.is_some())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct ObjectData {
    properties: IndexMap<String, ExportValue>,
    prototype: Option<ObjectRef>,
    callable: Option<Callable>,
    flags: ObjectFlags,
}

/// Shared handle to a host object. Clones alias the same storage, so a write
/// through one handle is visible through every other.
#[derive(Clone, Default)]
pub struct ObjectRef(Arc<RwLock<ObjectData>>);

impl ObjectRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn function(callable: Callable) -> Self {
        let object = Self::new();
        object.0.write().callable = Some(callable);
        object
    }

    pub fn placeholder() -> Self {
        Self::new().with_flags(ObjectFlags::PLACEHOLDER)
    }

    pub fn with_flags(self, flags: ObjectFlags) -> Self {
        self.0.write().flags |= flags;
        self
    }

    pub fn with_property(self, key: impl Into<String>, value: impl Into<ExportValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn with_prototype(self, prototype: ObjectRef) -> Self {
        self.0.write().prototype = Some(prototype);
        self
    }

    pub fn get(&self, key: &str) -> Option<ExportValue> {
        self.0.read().properties.get(key).cloned()
    }

    /// Property read that falls back to the prototype chain.
    pub fn lookup(&self, key: &str) -> Option<ExportValue> {
        let mut current = Some(self.clone());
        let mut depth = 0;

        while let Some(object) = current {
            if depth > MAX_PROTOTYPE_DEPTH {
                break;
            }
            let data = object.0.read();
            if let Some(value) = data.properties.get(key) {
                return Some(value.clone());
            }
            current = data.prototype.clone();
            depth += 1;
        }

        None
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<ExportValue>) -> Option<ExportValue> {
        self.0.write().properties.insert(key.into(), value.into())
    }

    pub fn remove(&self, key: &str) -> Option<ExportValue> {
        self.0.write().properties.shift_remove(key)
    }

    pub fn has_own(&self, key: &str) -> bool {
        self.0.read().properties.contains_key(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.read().properties.keys().cloned().collect()
    }

    pub fn values(&self) -> Vec<ExportValue> {
        self.0.read().properties.values().cloned().collect()
    }

    pub fn entries(&self) -> Vec<(String, ExportValue)> {
        self.0
            .read()
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.read().properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn prototype(&self) -> Option<ObjectRef> {
        self.0.read().prototype.clone()
    }

    pub fn callable(&self) -> Option<Callable> {
        self.0.read().callable.clone()
    }

    pub fn is_function(&self) -> bool {
        self.0.read().callable.is_some()
    }

    pub fn flags(&self) -> ObjectFlags {
        self.0.read().flags
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Invokes the object's body with `this` bound. The lock is released
    /// before the body runs so it may freely read the object.
    pub fn call(&self, this: &ExportValue, args: &[ExportValue]) -> Result<ExportValue, ValueError> {
        let callable = self
            .callable()
            .ok_or_else(|| ValueError::NotCallable("object".to_string()))?;

        match callable.native {
            Some(body) => body(this, args),
            None => Err(ValueError::NotCallable(format!("{} has no body", callable.name))),
        }
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.read();
        match &data.callable {
            Some(callable) => write!(f, "[Function {}]", callable.name),
            None => f
                .debug_struct("Object")
                .field("keys", &data.properties.keys().collect::<Vec<_>>())
                .field("flags", &data.flags)
                .finish(),
        }
    }
}

/// A value exported by a host module.
#[derive(Debug, Clone, Default)]
pub enum ExportValue {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Vec<ExportValue>),
    Object(ObjectRef),
}

impl ExportValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, ExportValue::Undefined)
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, ExportValue::Undefined | ExportValue::Null)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, ExportValue::Object(_))
    }

    pub fn is_function(&self) -> bool {
        match self {
            ExportValue::Object(object) => object.is_function(),
            _ => false,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            ExportValue::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ExportValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ExportValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ExportValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ExportValue]> {
        match self {
            ExportValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            ExportValue::Undefined | ExportValue::Null => false,
            ExportValue::Boolean(b) => *b,
            ExportValue::Number(n) => *n != 0.0 && !n.is_nan(),
            ExportValue::String(s) => !s.is_empty(),
            ExportValue::Array(_) | ExportValue::Object(_) => true,
        }
    }

    /// Property access with optional-chaining semantics: anything that has no
    /// such property yields `Undefined`.
    pub fn get(&self, key: &str) -> ExportValue {
        match self {
            ExportValue::Object(object) => object.lookup(key).unwrap_or_default(),
            ExportValue::Array(items) => key
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index).cloned())
                .unwrap_or_default(),
            _ => ExportValue::Undefined,
        }
    }

    pub fn has(&self, key: &str) -> bool {
        match self {
            ExportValue::Object(object) => object.has(key),
            ExportValue::Array(items) => key.parse::<usize>().map(|i| i < items.len()).unwrap_or(false),
            _ => false,
        }
    }

    /// Own enumerable keys in insertion order.
    pub fn own_keys(&self) -> Vec<String> {
        match self {
            ExportValue::Object(object) => object.keys(),
            ExportValue::Array(items) => (0..items.len()).map(|i| i.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn own_values(&self) -> Vec<ExportValue> {
        match self {
            ExportValue::Object(object) => object.values(),
            ExportValue::Array(items) => items.clone(),
            _ => Vec::new(),
        }
    }

    pub fn call_method(&self, name: &str, args: &[ExportValue]) -> Result<ExportValue, ValueError> {
        match self.get(name) {
            ExportValue::Object(method) if method.is_function() => method.call(self, args),
            ExportValue::Undefined => Err(ValueError::MissingProperty(name.to_string())),
            _ => Err(ValueError::NotCallable(name.to_string())),
        }
    }

    /// Text the host would produce for `value.toString()`.
    pub fn source_text(&self) -> String {
        match self {
            ExportValue::Undefined => "undefined".to_string(),
            ExportValue::Null => "null".to_string(),
            ExportValue::Boolean(b) => b.to_string(),
            ExportValue::Number(n) => format_number(*n),
            ExportValue::String(s) => s.clone(),
            ExportValue::Array(items) => items
                .iter()
                .map(|item| if item.is_nullish() { String::new() } else { item.source_text() })
                .collect::<Vec<_>>()
                .join(","),
            ExportValue::Object(object) => match object.callable() {
                Some(callable) => callable.source,
                None => "[object Object]".to_string(),
            },
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ExportValue::Undefined => "undefined",
            ExportValue::Null => "null",
            ExportValue::Boolean(_) => "boolean",
            ExportValue::Number(_) => "number",
            ExportValue::String(_) => "string",
            ExportValue::Array(_) => "array",
            ExportValue::Object(object) if object.is_function() => "function",
            ExportValue::Object(_) => "object",
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Strict equality: objects compare by identity.
impl PartialEq for ExportValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ExportValue::Undefined, ExportValue::Undefined) => true,
            (ExportValue::Null, ExportValue::Null) => true,
            (ExportValue::Boolean(a), ExportValue::Boolean(b)) => a == b,
            (ExportValue::Number(a), ExportValue::Number(b)) => a == b,
            (ExportValue::String(a), ExportValue::String(b)) => a == b,
            (ExportValue::Array(a), ExportValue::Array(b)) => a == b,
            (ExportValue::Object(a), ExportValue::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for ExportValue {
    fn from(value: bool) -> Self {
        ExportValue::Boolean(value)
    }
}

impl From<f64> for ExportValue {
    fn from(value: f64) -> Self {
        ExportValue::Number(value)
    }
}

impl From<i32> for ExportValue {
    fn from(value: i32) -> Self {
        ExportValue::Number(value as f64)
    }
}

impl From<i64> for ExportValue {
    fn from(value: i64) -> Self {
        ExportValue::Number(value as f64)
    }
}

impl From<&str> for ExportValue {
    fn from(value: &str) -> Self {
        ExportValue::String(value.to_string())
    }
}

impl From<String> for ExportValue {
    fn from(value: String) -> Self {
        ExportValue::String(value)
    }
}

impl From<ObjectRef> for ExportValue {
    fn from(value: ObjectRef) -> Self {
        ExportValue::Object(value)
    }
}

impl From<Vec<ExportValue>> for ExportValue {
    fn from(value: Vec<ExportValue>) -> Self {
        ExportValue::Array(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_storage() {
        let object = ObjectRef::new().with_property("a", 1);
        let alias = object.clone();
        alias.set("a", 2);

        assert_eq!(object.get("a"), Some(ExportValue::Number(2.0)));
        assert!(object.ptr_eq(&alias));
    }

    #[test]
    fn test_keys_keep_insertion_order() {
        let object = ObjectRef::new()
            .with_property("z", 1)
            .with_property("a", 2)
            .with_property("m", 3);

        assert_eq!(object.keys(), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_lookup_walks_prototype_chain() {
        let proto = ObjectRef::new().with_property("render", true);
        let object = ObjectRef::new().with_prototype(proto);

        assert!(object.has("render"));
        assert!(!object.has_own("render"));
        assert_eq!(ExportValue::from(object).get("missing"), ExportValue::Undefined);
    }

    #[test]
    fn test_call_method_binds_this() {
        let getter = ObjectRef::function(Callable::new("getName", "getName(){return this.name}").with_native(
            |this, _| Ok(this.get("name")),
        ));
        let store = ExportValue::from(
            ObjectRef::new()
                .with_property("name", "UserStore")
                .with_property("getName", getter),
        );

        assert_eq!(store.call_method("getName", &[]), Ok(ExportValue::from("UserStore")));
        assert!(matches!(store.call_method("missing", &[]), Err(ValueError::MissingProperty(_))));
        assert!(matches!(store.call_method("name", &[]), Err(ValueError::NotCallable(_))));
    }

    #[test]
    fn test_source_text() {
        let func = ObjectRef::function(Callable::new("f", "function f(){return 1}"));

        assert_eq!(ExportValue::from(func).source_text(), "function f(){return 1}");
        assert_eq!(ExportValue::from(2).source_text(), "2");
        assert_eq!(ExportValue::from(1.5).source_text(), "1.5");
        assert_eq!(ExportValue::from(ObjectRef::new()).source_text(), "[object Object]");
    }

    #[test]
    fn test_strict_equality() {
        let a = ObjectRef::new();
        let b = ObjectRef::new();

        assert_ne!(ExportValue::from(a.clone()), ExportValue::from(b));
        assert_eq!(ExportValue::from(a.clone()), ExportValue::from(a));
        assert_ne!(ExportValue::Number(f64::NAN), ExportValue::Number(f64::NAN));
    }
}
