// Tue Jan 13 2026 - Alex

use crate::filter::FilterError;
use crate::module::{ExportValue, ModuleId, ModuleRecord};
use std::sync::Arc;

/// What a filter looks at: an exported value and, during table scans, the
/// module it came from.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub value: &'a ExportValue,
    pub module: Option<&'a ModuleRecord>,
}

impl<'a> Candidate<'a> {
    pub fn new(value: &'a ExportValue, module: &'a ModuleRecord) -> Self {
        Self {
            value,
            module: Some(module),
        }
    }

    pub fn value_only(value: &'a ExportValue) -> Self {
        Self { value, module: None }
    }

    pub fn id(&self) -> Option<&'a ModuleId> {
        self.module.map(|m| m.id())
    }
}

/// A predicate run against every candidate of a scan.
///
/// An `Err` or a panic counts as no match for that candidate only. A panic
/// still goes through the process panic hook, which prints to stderr, so a
/// filter that can fail should return `Err` (see [`fallible`]) instead.
pub trait Filter: Send + Sync {
    fn test(&self, candidate: &Candidate<'_>) -> Result<bool, FilterError>;

    fn describe(&self) -> String {
        "custom".to_string()
    }
}

pub type FilterRef = Arc<dyn Filter>;

impl<F> Filter for F
where
    F: Fn(&Candidate<'_>) -> bool + Send + Sync,
{
    fn test(&self, candidate: &Candidate<'_>) -> Result<bool, FilterError> {
        Ok(self(candidate))
    }
}

struct FallibleFilter<F> {
    body: F,
}

impl<F> Filter for FallibleFilter<F>
where
    F: Fn(&Candidate<'_>) -> Result<bool, FilterError> + Send + Sync,
{
    fn test(&self, candidate: &Candidate<'_>) -> Result<bool, FilterError> {
        (self.body)(candidate)
    }

    fn describe(&self) -> String {
        "fallible".to_string()
    }
}

pub fn custom<F>(body: F) -> FilterRef
where
    F: Fn(&Candidate<'_>) -> bool + Send + Sync + 'static,
{
    Arc::new(body)
}

/// Filter that only looks at the exported value.
pub fn exported<F>(body: F) -> FilterRef
where
    F: Fn(&ExportValue) -> bool + Send + Sync + 'static,
{
    custom(move |candidate| body(candidate.value))
}

pub fn fallible<F>(body: F) -> FilterRef
where
    F: Fn(&Candidate<'_>) -> Result<bool, FilterError> + Send + Sync + 'static,
{
    Arc::new(FallibleFilter { body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_filters() {
        let record = ModuleRecord::new(3u64, 2);
        let filter = custom(|c| c.id() == Some(&ModuleId::from(3u64)));
        assert_eq!(filter.test(&Candidate::new(record.exports(), &record)), Ok(true));

        let value_filter = exported(|v| v.as_number() == Some(2.0));
        assert_eq!(value_filter.test(&Candidate::value_only(&ExportValue::from(2))), Ok(true));
        assert_eq!(value_filter.test(&Candidate::value_only(&ExportValue::from(3))), Ok(false));
    }

    #[test]
    fn test_fallible_filter_reports_error() {
        let filter = fallible(|c| c.value.call_method("getName", &[]).map(|_| true).map_err(FilterError::from));
        let result = filter.test(&Candidate::value_only(&ExportValue::Null));

        assert!(matches!(result, Err(FilterError::Value(_))));
        assert_eq!(filter.describe(), "fallible");
    }
}
