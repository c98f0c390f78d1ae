//! Query-string builder for index-cluster select requests.
//!
//! A [`Query`] combines a filter expression, an optional projection and extra
//! request parameters, and renders them into the query string that follows
//! `/select?` on a collection or core.
//!
//! # Example
//!
//! ```rust
//! use index_query::{Filter, Query};
//!
//! let query = Query::new()
//!     .filter(Filter::and([
//!         Filter::equals("FileExtension", "pdf"),
//!         Filter::one_of(["ClientId"], [1, 2]),
//!     ]))
//!     .fields(["FileName", "Size"])
//!     .param("rows", 10);
//!
//! assert_eq!(
//!     query.to_query_string(),
//!     "q=FileExtension:pdf AND (ClientId:1 OR ClientId:2)&fl=FileName,Size&rows=10&wt=json"
//! );
//! ```
//!
//! Loosely-typed filter mappings (field or field-tuple keys, scalar or list
//! values and the reserved `keyword` key) can be lowered with
//! [`legacy::FilterSpec`].

pub mod filter;
pub mod legacy;
pub mod query;

pub use filter::Filter;
pub use legacy::{FilterKey, FilterSpec, FilterValue, LegacySpecError};
pub use query::{Query, QueryParam, FORMAT_PARAM, FORMAT_VALUE};
