//! sphinxql - SphinxQL statement building for Sphinx full-text search.
//!
//! Builds parameterized SphinxQL for searching, inserting, replacing,
//! updating and deleting documents in a Sphinx index, and runs those
//! statements through any transport implementing [`Connection`].
//!
//! # Quick Start
//!
//! ```
//! use sphinxql::prelude::*;
//!
//! let builder = QueryBuilder::new("articles");
//! let filters = Filters::new()
//!     .filter("views", 100_i64..)
//!     .filter("author_id", vec![7_i64, 9])
//!     .order_by(OrderBy::desc("relevance"))
//!     .limit(20);
//!
//! let (sql, params) = builder.select("cats", &filters);
//! assert_eq!(
//!     sql,
//!     "SELECT *, WEIGHT() AS relevance FROM articles \
//!      WHERE MATCH(?) AND views >= ? AND author_id IN(?, ?) \
//!      ORDER BY relevance DESC LIMIT 0, 20"
//! );
//! assert_eq!(params.len(), 4);
//! ```
//!
//! Filters may also come from JSON:
//!
//! ```
//! use sphinxql::prelude::*;
//! use serde_json::json;
//!
//! let filters = Filters::from_json(&json!({
//!     "attrs": ["id", "title"],
//!     "views": {"gt": 10},
//!     "limit": 5,
//! }))
//! .unwrap();
//! let (sql, _) = QueryBuilder::new("articles").select("", &filters);
//! assert_eq!(sql, "SELECT id, title FROM articles WHERE views > ? LIMIT 0, 5");
//! ```
//!
//! Against a live server, wrap a [`Connection`] in an [`Index`] and call
//! [`Index::search`] from an asupersync runtime.

pub mod index;

pub use sphinxql_core::config::DEFAULT_RELEVANCE_EXPR;
pub use sphinxql_core::{
    BatchError, ColumnInfo, Connection, ConnectionError, ConnectionErrorKind, Cx, Error,
    FilterError, FilterErrorKind, IndexConfig, Outcome, QueryError, Result, Row, TypeError,
    Value,
};
pub use sphinxql_query::{
    Attributes, Comparison, Condition, Filters, Fragment, Id, Limit, OrderBy, OrderDirection,
    QueryBuilder, QueryPlan, RELEVANCE, Select,
};

pub use index::{Index, SearchResults};

/// Commonly used items.
///
/// ```
/// use sphinxql::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Attributes, Comparison, Condition, Connection, Cx, Error, Filters, Id, Index,
        IndexConfig, OrderBy, OrderDirection, Outcome, QueryBuilder, Row, SearchResults, Value,
    };
}
