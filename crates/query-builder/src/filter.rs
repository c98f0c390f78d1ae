//! Filter expressions rendered into the `q=` clause.

use std::fmt;

/// Filter clause used when no filter is given.
pub const MATCH_ALL: &str = "*:*";

/// A structured filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `field:value`
    Equals { field: String, value: String },

    /// Matches when any of `fields` holds any of `values`.
    ///
    /// Renders as `(f1:v1 OR f1:v2 OR f2:v1 OR f2:v2)`.
    OneOf {
        fields: Vec<String>,
        values: Vec<String>,
    },

    /// A raw boolean expression used verbatim, wrapped in parentheses.
    ///
    /// Inside an [`Filter::And`] the first raw expression replaces the whole
    /// filter and every other clause is discarded.
    Raw(String),

    /// All clauses must match. An empty conjunction matches everything.
    And(Vec<Filter>),
}

impl Filter {
    pub fn equals(field: impl Into<String>, value: impl ToString) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.to_string(),
        }
    }

    pub fn one_of<F, V>(fields: F, values: V) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        V: IntoIterator,
        V::Item: ToString,
    {
        Self::OneOf {
            fields: fields.into_iter().map(Into::into).collect(),
            values: values.into_iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn raw(expr: impl Into<String>) -> Self {
        Self::Raw(expr.into())
    }

    pub fn and(clauses: impl IntoIterator<Item = Filter>) -> Self {
        Self::And(clauses.into_iter().collect())
    }

    /// Returns true when this filter renders as the match-all clause.
    pub fn is_match_all(&self) -> bool {
        matches!(self, Filter::And(clauses) if clauses.is_empty())
    }

    /// Render the filter clause, without the leading `q=`.
    pub fn render(&self) -> String {
        match self {
            Filter::Equals { field, value } => format!("{field}:{value}"),
            Filter::OneOf { fields, values } => {
                let terms: Vec<String> = fields
                    .iter()
                    .flat_map(|field| values.iter().map(move |value| format!("{field}:{value}")))
                    .collect();
                format!("({})", terms.join(" OR "))
            }
            Filter::Raw(expr) => format!("({expr})"),
            Filter::And(clauses) => {
                if clauses.is_empty() {
                    return MATCH_ALL.to_string();
                }
                if let Some(raw) = clauses.iter().find(|c| matches!(c, Filter::Raw(_))) {
                    return raw.render();
                }
                clauses
                    .iter()
                    .map(|clause| match clause {
                        Filter::And(inner) if inner.len() > 1 => format!("({})", clause.render()),
                        _ => clause.render(),
                    })
                    .collect::<Vec<_>>()
                    .join(" AND ")
            }
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
