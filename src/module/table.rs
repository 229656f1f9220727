// Wed Jan 15 2026 - Alex

use crate::module::{ExportValue, ModuleId, ModuleRecord};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Read side of the host's module cache.
pub trait ModuleTable: Send + Sync {
    /// Snapshot of every registered module in registration order.
    fn modules(&self) -> Vec<Arc<ModuleRecord>>;
    fn get(&self, id: &ModuleId) -> Option<Arc<ModuleRecord>>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process module cache keyed by id, iterated in load order.
pub struct ModuleCache {
    modules: RwLock<IndexMap<ModuleId, Arc<ModuleRecord>>>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self {
            modules: RwLock::new(IndexMap::new()),
        }
    }

    pub fn from_records(records: impl IntoIterator<Item = ModuleRecord>) -> Self {
        let cache = Self::new();
        for record in records {
            cache.register(record);
        }
        cache
    }

    /// Registers a module. Re-registering an id replaces the record but keeps
    /// its original load position.
    pub fn register(&self, record: ModuleRecord) -> Arc<ModuleRecord> {
        let record = Arc::new(record);
        self.modules.write().insert(record.id().clone(), record.clone());
        record
    }

    pub fn define(&self, id: impl Into<ModuleId>, exports: impl Into<ExportValue>) -> Arc<ModuleRecord> {
        self.register(ModuleRecord::new(id, exports))
    }

    pub fn ids(&self) -> Vec<ModuleId> {
        self.modules.read().keys().cloned().collect()
    }
}

impl Default for ModuleCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleTable for ModuleCache {
    fn modules(&self) -> Vec<Arc<ModuleRecord>> {
        self.modules.read().values().cloned().collect()
    }

    fn get(&self, id: &ModuleId) -> Option<Arc<ModuleRecord>> {
        self.modules.read().get(id).cloned()
    }

    fn len(&self) -> usize {
        self.modules.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modules_follow_load_order() {
        let cache = ModuleCache::new();
        cache.define(42u64, 1);
        cache.define("chunk-a", 2);
        cache.define(7u64, 3);

        let ids: Vec<String> = cache.modules().iter().map(|m| m.id().to_string()).collect();
        assert_eq!(ids, vec!["42", "chunk-a", "7"]);
    }

    #[test]
    fn test_reregister_keeps_position() {
        let cache = ModuleCache::new();
        cache.define(1u64, 1);
        cache.define(2u64, 2);
        cache.define(1u64, 10);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.ids(), vec![ModuleId::from(1u64), ModuleId::from(2u64)]);
        let first = cache.get(&ModuleId::from(1u64));
        assert_eq!(first.map(|m| m.exports().clone()), Some(ExportValue::from(10)));
    }
}
