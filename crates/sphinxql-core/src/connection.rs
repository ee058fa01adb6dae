//! Transport seam.
//!
//! The statement builders produce `(sql, params)` pairs; a [`Connection`]
//! sends them to the search server over the MySQL wire protocol and reports
//! rows or an affected-row count. No concrete transport lives in this
//! workspace.
//!
//! All operations integrate with asupersync's structured concurrency via `Cx`
//! for cancellation and timeouts.

use crate::row::Row;
use crate::value::Value;
use asupersync::{Cx, Outcome};

/// A connection to a SphinxQL server.
///
/// Implementations must bind `params` to the `?` placeholders of `sql`
/// positionally (prepared-statement style), never by string interpolation.
///
/// # Example
///
/// ```rust,ignore
/// let rows = conn
///     .query(&cx, "SELECT * FROM articles WHERE MATCH(?)", &[Value::from("cats")])
///     .await;
/// ```
pub trait Connection: Send + Sync {
    /// Execute a statement and return all rows of its result set.
    fn query(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<Vec<Row>, crate::Error>> + Send;

    /// Execute a statement (INSERT, REPLACE, UPDATE, DELETE) and return rows affected.
    fn execute(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<u64, crate::Error>> + Send;
}
