//! Lowering of loosely-typed filter mappings into [`Filter`] expressions.
//!
//! Older callers describe filters as an ordered mapping whose keys are a field
//! name or a tuple of field names and whose values are a scalar or a list.
//! The reserved key `keyword` carries a raw boolean expression that replaces
//! every other entry.

use crate::filter::Filter;
use thiserror::Error;

/// Reserved key whose value is used as the whole filter.
pub const KEYWORD_KEY: &str = "keyword";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LegacySpecError {
    #[error("Filter entry for '{0}' has an empty value list")]
    EmptyValues(String),

    #[error("Filter entry has an empty field tuple")]
    EmptyFields,

    #[error("The '{KEYWORD_KEY}' entry must carry a single expression")]
    KeywordNotScalar,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKey {
    Field(String),
    Fields(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Scalar(String),
    List(Vec<String>),
}

impl From<&str> for FilterKey {
    fn from(value: &str) -> Self {
        FilterKey::Field(value.to_string())
    }
}

impl<const N: usize> From<[&str; N]> for FilterKey {
    fn from(value: [&str; N]) -> Self {
        FilterKey::Fields(value.iter().map(|s| s.to_string()).collect())
    }
}

impl FilterValue {
    pub fn scalar(value: impl ToString) -> Self {
        FilterValue::Scalar(value.to_string())
    }

    pub fn list<V>(values: V) -> Self
    where
        V: IntoIterator,
        V::Item: ToString,
    {
        FilterValue::List(values.into_iter().map(|v| v.to_string()).collect())
    }
}

/// An ordered, loosely-typed filter mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    entries: Vec<(FilterKey, FilterValue)>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, key: impl Into<FilterKey>, value: FilterValue) -> Self {
        self.entries.push((key.into(), value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lower the mapping into a filter expression.
    ///
    /// An empty mapping yields the match-all conjunction. A `keyword` entry
    /// yields a raw expression and every other entry is ignored.
    pub fn into_filter(self) -> Result<Filter, LegacySpecError> {
        let mut clauses = Vec::with_capacity(self.entries.len());

        for (key, value) in self.entries {
            let clause = match (key, value) {
                (FilterKey::Field(field), FilterValue::Scalar(expr)) if field == KEYWORD_KEY => {
                    return Ok(Filter::Raw(expr));
                }
                (FilterKey::Field(field), FilterValue::List(_)) if field == KEYWORD_KEY => {
                    return Err(LegacySpecError::KeywordNotScalar);
                }
                (FilterKey::Field(field), FilterValue::Scalar(value)) => {
                    Filter::Equals { field, value }
                }
                (FilterKey::Field(field), FilterValue::List(values)) => {
                    if values.is_empty() {
                        return Err(LegacySpecError::EmptyValues(field));
                    }
                    Filter::OneOf {
                        fields: vec![field],
                        values,
                    }
                }
                (FilterKey::Fields(fields), value) => {
                    if fields.is_empty() {
                        return Err(LegacySpecError::EmptyFields);
                    }
                    let values = match value {
                        FilterValue::Scalar(v) => vec![v],
                        FilterValue::List(vs) if vs.is_empty() => {
                            return Err(LegacySpecError::EmptyValues(fields.join(",")));
                        }
                        FilterValue::List(vs) => vs,
                    };
                    Filter::OneOf { fields, values }
                }
            };
            clauses.push(clause);
        }

        Ok(Filter::And(clauses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Query;

    #[test]
    fn test_empty_spec_matches_all() {
        let filter = FilterSpec::new().into_filter().unwrap();
        assert_eq!(filter.render(), "*:*");
    }

    #[test]
    fn test_tuple_key_with_list_value() {
        let filter = FilterSpec::new()
            .entry(["a", "b"], FilterValue::list([1, 2]))
            .into_filter()
            .unwrap();
        assert_eq!(filter.render(), "(a:1 OR a:2 OR b:1 OR b:2)");
    }

    #[test]
    fn test_mixed_entries_are_anded() {
        let filter = FilterSpec::new()
            .entry("IsFile", FilterValue::scalar(1))
            .entry("FileExtension", FilterValue::list(["pdf", "doc"]))
            .into_filter()
            .unwrap();
        assert_eq!(
            filter.render(),
            "IsFile:1 AND (FileExtension:pdf OR FileExtension:doc)"
        );
    }

    #[test]
    fn test_keyword_short_circuits() {
        let filter = FilterSpec::new()
            .entry("IsFile", FilterValue::scalar(1))
            .entry("keyword", FilterValue::scalar("FileName:abc*"))
            .entry("Size", FilterValue::scalar(10))
            .into_filter()
            .unwrap();
        let query = Query::new().filter(filter);
        assert_eq!(query.to_query_string(), "q=(FileName:abc*)&wt=json");
    }

    #[test]
    fn test_empty_list_is_rejected() {
        let result = FilterSpec::new()
            .entry("a", FilterValue::List(vec![]))
            .into_filter();
        assert_eq!(result, Err(LegacySpecError::EmptyValues("a".to_string())));
    }
}
