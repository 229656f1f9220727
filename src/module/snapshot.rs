// Wed Jan 15 2026 - Alex

//! JSON dumps of a module table.
//!
//! ```json
//! {"modules": [
//!   {"id": 12, "source": "...", "exports": {"Z": {"$function": {"name": "a", "source": "..."}}}},
//!   {"id": "lazy", "exports": {"$placeholder": true}}
//! ]}
//! ```

use crate::module::{
    Callable, ExportValue, ModuleCache, ModuleId, ModuleRecord, ModuleTable, ObjectFlags, ObjectRef,
    SnapshotError,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const FUNCTION_TAG: &str = "$function";
const PLACEHOLDER_TAG: &str = "$placeholder";
const GLOBAL_TAG: &str = "$global";
const TYPED_ARRAY_TAG: &str = "$typedArray";

#[derive(Debug, Deserialize)]
pub struct Snapshot {
    pub modules: Vec<SnapshotModule>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotModule {
    pub id: ModuleId,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub exports: Value,
}

#[derive(Debug, Default, Deserialize)]
struct FunctionDescriptor {
    #[serde(default)]
    name: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    prototype: Option<Map<String, Value>>,
    #[serde(default)]
    properties: Map<String, Value>,
    #[serde(default)]
    returns: Option<Value>,
}

pub fn load_snapshot(path: &Path) -> Result<ModuleCache, SnapshotError> {
    let content = fs::read_to_string(path)?;
    let cache = parse_snapshot(&content)?;
    log::debug!("Loaded {} modules from {}", cache.len(), path.display());
    Ok(cache)
}

pub fn parse_snapshot(content: &str) -> Result<ModuleCache, SnapshotError> {
    let snapshot: Snapshot = serde_json::from_str(content)?;
    let cache = ModuleCache::new();
    let mut seen = HashSet::new();

    for module in snapshot.modules {
        if !seen.insert(module.id.clone()) {
            return Err(SnapshotError::DuplicateModule(module.id.to_string()));
        }

        let mut record = ModuleRecord::new(module.id, value_from_json(&module.exports)?);
        if let Some(source) = module.source {
            record = record.with_source(source);
        }
        cache.register(record);
    }

    Ok(cache)
}

pub fn value_from_json(value: &Value) -> Result<ExportValue, SnapshotError> {
    Ok(match value {
        Value::Null => ExportValue::Null,
        Value::Bool(b) => ExportValue::Boolean(*b),
        Value::Number(n) => ExportValue::Number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => ExportValue::String(s.clone()),
        Value::Array(items) => ExportValue::Array(
            items.iter().map(value_from_json).collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Object(map) => match map.get(FUNCTION_TAG) {
            Some(descriptor) => ExportValue::Object(function_from_json(descriptor)?),
            None => ExportValue::Object(object_from_map(map)?),
        },
    })
}

fn object_from_map(map: &Map<String, Value>) -> Result<ObjectRef, SnapshotError> {
    let mut flags = ObjectFlags::empty();
    let object = ObjectRef::new();

    for (key, value) in map {
        match key.as_str() {
            PLACEHOLDER_TAG if value.as_bool() == Some(true) => flags |= ObjectFlags::PLACEHOLDER,
            GLOBAL_TAG if value.as_bool() == Some(true) => flags |= ObjectFlags::GLOBAL,
            TYPED_ARRAY_TAG if value.as_bool() == Some(true) => flags |= ObjectFlags::TYPED_ARRAY,
            _ => {
                object.set(key.clone(), value_from_json(value)?);
            }
        }
    }

    Ok(object.with_flags(flags))
}

fn function_from_json(descriptor: &Value) -> Result<ObjectRef, SnapshotError> {
    let descriptor: FunctionDescriptor = match descriptor {
        Value::String(source) => FunctionDescriptor {
            source: source.clone(),
            ..FunctionDescriptor::default()
        },
        Value::Object(_) => serde_json::from_value(descriptor.clone())
            .map_err(|e| SnapshotError::InvalidFunction(e.to_string()))?,
        other => {
            return Err(SnapshotError::InvalidFunction(format!(
                "expected string or object, found {}",
                other
            )))
        }
    };

    let mut callable = Callable::new(descriptor.name, descriptor.source);
    if let Some(returns) = &descriptor.returns {
        callable = callable.returning(value_from_json(returns)?);
    }

    let function = ObjectRef::function(callable);
    for (key, value) in &descriptor.properties {
        function.set(key.clone(), value_from_json(value)?);
    }
    if let Some(prototype) = &descriptor.prototype {
        function.set("prototype", object_from_map(prototype)?);
    }

    Ok(function)
}

/// Renders a value for display, cutting nested objects off at `depth`.
pub fn value_to_json(value: &ExportValue, depth: usize) -> Value {
    match value {
        ExportValue::Undefined => Value::String("undefined".to_string()),
        ExportValue::Null => Value::Null,
        ExportValue::Boolean(b) => Value::Bool(*b),
        ExportValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(n.to_string())),
        ExportValue::String(s) => Value::String(s.clone()),
        ExportValue::Array(items) if depth == 0 => Value::String(format!("[Array({})]", items.len())),
        ExportValue::Array(items) => {
            Value::Array(items.iter().map(|item| value_to_json(item, depth - 1)).collect())
        }
        ExportValue::Object(object) => {
            if let Some(callable) = object.callable() {
                let mut map = Map::new();
                map.insert(FUNCTION_TAG.to_string(), Value::String(callable.name));
                return Value::Object(map);
            }
            if depth == 0 {
                return Value::String("[Object]".to_string());
            }
            let mut map = Map::new();
            for (key, item) in object.entries() {
                map.insert(key, value_to_json(&item, depth - 1));
            }
            Value::Object(map)
        }
    }
}
