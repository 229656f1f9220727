// Tue Jan 13 2026 - Alex

use crate::module::ExportValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque module identifier. Bundles use numbers, some chunk formats use strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModuleId {
    Number(u64),
    Name(String),
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleId::Number(n) => write!(f, "{}", n),
            ModuleId::Name(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for ModuleId {
    fn from(value: u64) -> Self {
        ModuleId::Number(value)
    }
}

impl From<&str> for ModuleId {
    fn from(value: &str) -> Self {
        ModuleId::Name(value.to_string())
    }
}

impl From<String> for ModuleId {
    fn from(value: String) -> Self {
        ModuleId::Name(value)
    }
}

#[derive(Debug, Clone)]
pub struct ModuleRecord {
    id: ModuleId,
    exports: ExportValue,
    source: Option<String>,
}

impl ModuleRecord {
    pub fn new(id: impl Into<ModuleId>, exports: impl Into<ExportValue>) -> Self {
        Self {
            id: id.into(),
            exports: exports.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    pub fn exports(&self) -> &ExportValue {
        &self.exports
    }

    /// Source text of the module factory, when the host exposes it.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}
