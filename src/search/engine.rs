// Wed Jan 15 2026 - Alex

use crate::config::FinderConfig;
use crate::filter::{Candidate, Filter};
use crate::module::{ExportValue, ModuleRecord, ModuleTable, ObjectFlags};
use crate::search::{Found, Query, QueryMatch, SearchOptions};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Linear scanner over the host's module table.
///
/// Every call walks the table from scratch in load order. Filters are run in
/// isolation: an error or a panic inside a filter counts as "no match" for
/// that module only.
pub struct ModuleSearch {
    table: Arc<dyn ModuleTable>,
    config: Arc<FinderConfig>,
}

impl ModuleSearch {
    pub fn new(table: Arc<dyn ModuleTable>, config: Arc<FinderConfig>) -> Self {
        Self { table, config }
    }

    pub fn table(&self) -> &Arc<dyn ModuleTable> {
        &self.table
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    pub fn should_skip(&self, value: &ExportValue) -> bool {
        match value {
            ExportValue::Undefined | ExportValue::Null => true,
            ExportValue::Object(object) => {
                let flags = object.flags();
                (self.config.skip_placeholders && flags.contains(ObjectFlags::PLACEHOLDER))
                    || (self.config.skip_globals && flags.contains(ObjectFlags::GLOBAL))
                    || flags.contains(ObjectFlags::TYPED_ARRAY)
            }
            _ => false,
        }
    }

    pub fn default_key(&self, exports: &ExportValue) -> Option<String> {
        self.config
            .default_keys
            .iter()
            .find(|key| exports.has(key))
            .cloned()
    }

    pub fn evaluate(&self, filter: &dyn Filter, candidate: &Candidate<'_>) -> bool {
        match panic::catch_unwind(AssertUnwindSafe(|| filter.test(candidate))) {
            Ok(Ok(matched)) => matched,
            Ok(Err(e)) => {
                self.report_failure(filter, candidate, &e.to_string());
                false
            }
            Err(payload) => {
                self.report_failure(filter, candidate, &panic_message(payload.as_ref()));
                false
            }
        }
    }

    fn report_failure(&self, filter: &dyn Filter, candidate: &Candidate<'_>, reason: &str) {
        if !self.config.log_filter_failures {
            return;
        }
        let id = candidate
            .id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        log::trace!("Filter {} failed on module {}: {}", filter.describe(), id, reason);
    }

    pub fn find(&self, filter: &dyn Filter, options: SearchOptions) -> Option<Found> {
        self.scan(&[(filter, options.all(false))])
            .pop()
            .and_then(|found| found.into_iter().next())
    }

    pub fn find_all(&self, filter: &dyn Filter, options: SearchOptions) -> Vec<Found> {
        self.scan(&[(filter, options.all(true))])
            .pop()
            .unwrap_or_default()
    }

    /// Resolves every query in a single pass over the table.
    pub fn find_bulk(&self, queries: &[Query]) -> Vec<Option<QueryMatch>> {
        let specs: Vec<(&dyn Filter, SearchOptions)> =
            queries.iter().map(|q| (q.filter.as_ref(), q.options)).collect();

        self.scan(&specs)
            .into_iter()
            .zip(queries)
            .map(|(found, query)| {
                if found.is_empty() {
                    None
                } else if query.options.all {
                    Some(QueryMatch::Many(found))
                } else {
                    found.into_iter().next().map(QueryMatch::One)
                }
            })
            .collect()
    }

    fn scan(&self, queries: &[(&dyn Filter, SearchOptions)]) -> Vec<Vec<Found>> {
        let modules = self.table.modules();
        let mut results: Vec<Vec<Found>> = vec![Vec::new(); queries.len()];
        let mut settled = vec![false; queries.len()];
        let mut pending = queries.len();
        let mut visited = 0usize;

        for record in &modules {
            if pending == 0 {
                break;
            }
            if self.should_skip(record.exports()) {
                continue;
            }
            visited += 1;

            for (index, (filter, options)) in queries.iter().enumerate() {
                if settled[index] {
                    continue;
                }
                let hit = self.match_module(record, *filter, options, &mut results[index]);
                if hit && !options.all {
                    settled[index] = true;
                    pending -= 1;
                }
            }
        }

        log::debug!(
            "Scanned {}/{} modules for {} queries, {} resolved",
            visited,
            modules.len(),
            queries.len(),
            results.iter().filter(|r| !r.is_empty()).count()
        );

        results
    }

    /// Tests one module against one query, pushing hits into `sink`. Returns
    /// whether anything matched.
    fn match_module(
        &self,
        record: &Arc<ModuleRecord>,
        filter: &dyn Filter,
        options: &SearchOptions,
        sink: &mut Vec<Found>,
    ) -> bool {
        let exports = record.exports();
        let mut matched = false;

        if self.evaluate(filter, &Candidate::new(exports, record)) {
            sink.push(project(record, exports.clone(), options.raw));
            if !options.all {
                return true;
            }
            matched = true;
        }

        let mut default_key = None;
        let keys = if options.search_exports {
            exports.own_keys()
        } else if options.search_default {
            default_key = self.default_key(exports);
            default_key.iter().cloned().collect()
        } else {
            Vec::new()
        };

        for key in keys {
            let exported = exports.get(&key);
            if self.should_skip(&exported) {
                continue;
            }
            if !self.evaluate(filter, &Candidate::new(&exported, record)) {
                continue;
            }

            let value = if !options.default_export && default_key.as_deref() == Some(key.as_str()) {
                exports.clone()
            } else {
                exported
            };
            sink.push(project(record, value, options.raw));
            if !options.all {
                return true;
            }
            matched = true;
        }

        matched
    }
}

fn project(record: &Arc<ModuleRecord>, value: ExportValue, raw: bool) -> Found {
    if raw {
        Found::Module(record.clone())
    } else {
        Found::Export(value)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "filter panicked".to_string()
    }
}
