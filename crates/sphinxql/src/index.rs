//! Index handle: builds statements for one index and runs them through a
//! caller-supplied [`Connection`].

use asupersync::{Cx, Outcome};
use sphinxql_core::{Connection, Error, IndexConfig, Row, Value};
use sphinxql_query::{Attributes, Filters, Id, QueryBuilder};

/// Rows of a search plus the server's `SHOW META` report.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    /// Matching documents, in server order
    pub records: Vec<Row>,
    /// Total matches reported by the server (`total_found`), or the record
    /// count when meta is unavailable
    pub total_found: u64,
    /// Server-side search time in seconds, if reported
    pub time: Option<f64>,
    /// All `SHOW META` variables in server order
    pub meta: Vec<(String, String)>,
}

impl SearchResults {
    fn new(records: Vec<Row>, meta: Vec<(String, String)>) -> Self {
        let lookup = |name: &str| {
            meta.iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        };
        let total_found = lookup("total_found")
            .and_then(|v| v.parse().ok())
            .unwrap_or(records.len() as u64);
        let time = lookup("time").and_then(|v| v.parse().ok());

        Self {
            records,
            total_found,
            time,
            meta,
        }
    }

    /// Look up one `SHOW META` variable.
    pub fn meta(&self, name: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Number of records returned.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no records were returned.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Collect `Variable_name` / `Value` rows of `SHOW META`.
fn meta_pairs(rows: &[Row]) -> Vec<(String, String)> {
    rows.iter()
        .filter_map(|row| {
            let name = row.get_by_name("Variable_name")?.as_str()?.to_string();
            let value = row.get_by_name("Value").map_or_else(String::new, Value::to_string);
            Some((name, value))
        })
        .collect()
}

/// A handle on one search index.
///
/// # Example
///
/// ```ignore
/// let index = Index::new(conn, IndexConfig::new("articles"));
/// let results = index
///     .search(&cx, "cats", &Filters::new().filter("views", 100_i64..).limit(20))
///     .await;
/// ```
#[derive(Debug)]
pub struct Index<C: Connection> {
    conn: C,
    builder: QueryBuilder,
    config: IndexConfig,
}

impl<C: Connection> Index<C> {
    /// Create a handle for the configured index.
    pub fn new(conn: C, config: IndexConfig) -> Self {
        Self {
            builder: QueryBuilder::from_config(&config),
            conn,
            config,
        }
    }

    /// The index name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The statement builder used by this handle.
    pub fn builder(&self) -> &QueryBuilder {
        &self.builder
    }

    /// The underlying connection.
    pub fn connection(&self) -> &C {
        &self.conn
    }

    /// Run a full-text search (the query may be empty) with filters.
    #[tracing::instrument(level = "debug", skip(self, cx, filters), fields(index = %self.config.name))]
    pub async fn search(
        &self,
        cx: &Cx,
        query: &str,
        filters: &Filters,
    ) -> Outcome<SearchResults, Error> {
        let (sql, params) = self.builder.select(query, filters);
        tracing::trace!(sql = %sql, "Search SQL");

        let records = match self.conn.query(cx, &sql, &params).await {
            Outcome::Ok(rows) => rows,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        let meta = if self.config.fetch_meta {
            match self.conn.query(cx, "SHOW META", &[]).await {
                Outcome::Ok(rows) => meta_pairs(&rows),
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            }
        } else {
            Vec::new()
        };

        let results = SearchResults::new(records, meta);
        tracing::debug!(
            records = results.len(),
            total_found = results.total_found,
            "Search complete"
        );
        Outcome::Ok(results)
    }

    /// Run several searches, returning results keyed by name in input order.
    pub async fn multi_search(
        &self,
        cx: &Cx,
        searches: &[(&str, &str, Filters)],
    ) -> Outcome<Vec<(String, SearchResults)>, Error> {
        let mut out = Vec::with_capacity(searches.len());
        for (name, query, filters) in searches {
            match self.search(cx, query, filters).await {
                Outcome::Ok(results) => out.push(((*name).to_string(), results)),
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            }
        }
        Outcome::Ok(out)
    }

    /// Insert one document and return rows affected.
    pub async fn insert(&self, cx: &Cx, id: i64, attributes: &Attributes) -> Outcome<u64, Error> {
        let (sql, params) = self.builder.insert(id, attributes);
        self.execute(cx, "INSERT", &sql, &params).await
    }

    /// Insert several documents in one statement.
    pub async fn insert_many(&self, cx: &Cx, rows: &[(i64, Attributes)]) -> Outcome<u64, Error> {
        match self.builder.insert_many(rows) {
            Ok((sql, params)) => self.execute(cx, "INSERT", &sql, &params).await,
            Err(e) => Outcome::Err(e),
        }
    }

    /// Replace one document and return rows affected.
    pub async fn replace(&self, cx: &Cx, id: i64, attributes: &Attributes) -> Outcome<u64, Error> {
        let (sql, params) = self.builder.replace(id, attributes);
        self.execute(cx, "REPLACE", &sql, &params).await
    }

    /// Replace several documents in one statement.
    pub async fn replace_many(&self, cx: &Cx, rows: &[(i64, Attributes)]) -> Outcome<u64, Error> {
        match self.builder.replace_many(rows) {
            Ok((sql, params)) => self.execute(cx, "REPLACE", &sql, &params).await,
            Err(e) => Outcome::Err(e),
        }
    }

    /// Update attributes of one or many documents.
    pub async fn update(
        &self,
        cx: &Cx,
        id: impl Into<Id>,
        attributes: &Attributes,
    ) -> Outcome<u64, Error> {
        match self.builder.update(id, attributes) {
            Ok((sql, params)) => self.execute(cx, "UPDATE", &sql, &params).await,
            Err(e) => Outcome::Err(e),
        }
    }

    /// Delete one or many documents.
    pub async fn delete(&self, cx: &Cx, id: impl Into<Id>) -> Outcome<u64, Error> {
        let (sql, params) = self.builder.delete(id);
        self.execute(cx, "DELETE", &sql, &params).await
    }

    async fn execute(
        &self,
        cx: &Cx,
        kind: &str,
        sql: &str,
        params: &[Value],
    ) -> Outcome<u64, Error> {
        tracing::debug!(index = %self.config.name, kind, params = params.len(), "Executing statement");
        tracing::trace!(sql = %sql, "Statement SQL");
        let affected = self.conn.execute(cx, sql, params).await;
        affected.map(|n| {
            tracing::debug!(affected = n, "{} complete", kind);
            n
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta_row(name: &str, value: &str) -> Row {
        Row::new(
            vec!["Variable_name".into(), "Value".into()],
            vec![Value::from(name), Value::from(value)],
        )
    }

    #[test]
    fn results_read_total_and_time_from_meta() {
        let meta = meta_pairs(&[
            meta_row("total", "20"),
            meta_row("total_found", "1234"),
            meta_row("time", "0.004"),
        ]);
        let results = SearchResults::new(Vec::new(), meta);

        assert_eq!(results.total_found, 1234);
        assert_eq!(results.time, Some(0.004));
        assert_eq!(results.meta("total"), Some("20"));
        assert!(results.is_empty());
    }

    #[test]
    fn results_fall_back_to_record_count() {
        let records = vec![Row::new(vec!["id".into()], vec![Value::BigInt(1)])];
        let results = SearchResults::new(records, Vec::new());

        assert_eq!(results.total_found, 1);
        assert_eq!(results.time, None);
    }

    #[test]
    fn meta_rows_without_names_are_skipped() {
        let rows = vec![Row::new(vec!["other".into()], vec![Value::BigInt(1)])];
        assert!(meta_pairs(&rows).is_empty());
    }
}
