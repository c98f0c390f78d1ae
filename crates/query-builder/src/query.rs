//! Full select query: filter, projection and extra parameters.

use crate::filter::{Filter, MATCH_ALL};
use crate::legacy::{FilterSpec, LegacySpecError};

/// Response-format parameter forced on every query.
pub const FORMAT_PARAM: &str = "wt";
/// Value forced for [`FORMAT_PARAM`].
pub const FORMAT_VALUE: &str = "json";

/// Projected field that disables the backend's default content trimming.
const CONTENT_FIELD: &str = "content";

/// One extra request parameter. A `None` value renders as a bare `&key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    pub key: String,
    pub value: Option<String>,
}

impl QueryParam {
    fn render(&self) -> String {
        match &self.value {
            Some(value) => format!("&{}={}", self.key, value),
            None => format!("&{}", self.key),
        }
    }
}

/// A select query against a collection or core.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    filter: Option<Filter>,
    fields: Vec<String>,
    params: Vec<QueryParam>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a query from a loosely-typed filter mapping.
    pub fn from_legacy_spec(spec: FilterSpec) -> Result<Self, LegacySpecError> {
        Ok(Self::new().filter(spec.into_filter()?))
    }

    /// Set the filter expression. Without one the query matches everything.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Add projected fields. Order is kept and duplicates are ignored.
    pub fn fields<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for field in fields {
            let field = field.into();
            if !self.fields.contains(&field) {
                self.fields.push(field);
            }
        }
        self
    }

    /// Add a `key=value` parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push(QueryParam {
            key: key.into(),
            value: Some(value.to_string()),
        });
        self
    }

    /// Add one `key=value` pair per value.
    pub fn param_list<V>(mut self, key: impl Into<String>, values: V) -> Self
    where
        V: IntoIterator,
        V::Item: ToString,
    {
        let key = key.into();
        for value in values {
            self.params.push(QueryParam {
                key: key.clone(),
                value: Some(value.to_string()),
            });
        }
        self
    }

    /// Add a valueless parameter rendered as `&key`.
    pub fn flag(mut self, key: impl Into<String>) -> Self {
        self.params.push(QueryParam {
            key: key.into(),
            value: None,
        });
        self
    }

    pub fn filter_expr(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn projected_fields(&self) -> &[String] {
        &self.fields
    }

    /// Render the filter clause alone, without `q=`.
    pub fn filter_clause(&self) -> String {
        match &self.filter {
            Some(filter) => filter.render(),
            None => MATCH_ALL.to_string(),
        }
    }

    /// Parameters as sent: the format parameter forced to `json`, keeping the
    /// caller's position for it when present and appending it otherwise.
    pub fn effective_params(&self) -> Vec<QueryParam> {
        let mut params = Vec::with_capacity(self.params.len() + 1);
        let mut format_seen = false;
        for param in &self.params {
            if param.key == FORMAT_PARAM {
                if !format_seen {
                    params.push(QueryParam {
                        key: FORMAT_PARAM.to_string(),
                        value: Some(FORMAT_VALUE.to_string()),
                    });
                    format_seen = true;
                }
            } else {
                params.push(param.clone());
            }
        }
        if !format_seen {
            params.push(QueryParam {
                key: FORMAT_PARAM.to_string(),
                value: Some(FORMAT_VALUE.to_string()),
            });
        }
        params
    }

    /// Render the complete query string that follows `select?`.
    pub fn to_query_string(&self) -> String {
        let mut out = format!("q={}", self.filter_clause());

        if !self.fields.is_empty() {
            out.push_str("&fl=");
            out.push_str(&self.fields.join(","));
            if self.fields.iter().any(|f| f == CONTENT_FIELD) {
                out.push_str("&exclude=false");
            }
        }

        for param in self.effective_params() {
            out.push_str(&param.render());
        }
        out
    }
}
