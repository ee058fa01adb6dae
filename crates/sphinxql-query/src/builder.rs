//! Statement builder bound to one index: SELECT, INSERT, REPLACE, UPDATE, DELETE.

use crate::clause::Fragment;
use crate::filter::Filters;
use crate::select::Select;
use sphinxql_core::config::IndexConfig;
use sphinxql_core::{BatchError, Error, FilterError, Result, Value};

/// Document id: a single id or a batch of ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Id {
    One(i64),
    Many(Vec<i64>),
}

impl Id {
    /// `id = ?` or `id IN(?, ?, …)`.
    fn predicate(&self) -> Fragment {
        match self {
            Id::One(id) => {
                let mut f = Fragment::raw("id = ");
                f.push_bind(Value::BigInt(*id));
                f
            }
            Id::Many(ids) => {
                let mut f = Fragment::raw("id IN(");
                f.push_bind_list(ids.iter().copied().map(Value::BigInt));
                f.push_sql(")");
                f
            }
        }
    }

    /// Number of ids.
    pub fn len(&self) -> usize {
        match self {
            Id::One(_) => 1,
            Id::Many(ids) => ids.len(),
        }
    }

    /// Check if this is an empty batch.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<i64> for Id {
    fn from(id: i64) -> Self {
        Id::One(id)
    }
}

impl From<i32> for Id {
    fn from(id: i32) -> Self {
        Id::One(i64::from(id))
    }
}

impl From<u32> for Id {
    fn from(id: u32) -> Self {
        Id::One(i64::from(id))
    }
}

impl From<Vec<i64>> for Id {
    fn from(ids: Vec<i64>) -> Self {
        Id::Many(ids)
    }
}

impl From<&[i64]> for Id {
    fn from(ids: &[i64]) -> Self {
        Id::Many(ids.to_vec())
    }
}

impl<const N: usize> From<[i64; N]> for Id {
    fn from(ids: [i64; N]) -> Self {
        Id::Many(ids.to_vec())
    }
}

/// Ordered column → value map for INSERT, REPLACE and UPDATE.
///
/// Sequence values (multi-value attributes) render as a placeholder tuple.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<(String, Value)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, replacing an existing value in place.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a column, replacing an existing value in place.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Read attributes from a JSON object; arrays become multi-value attributes.
    #[allow(clippy::result_large_err)]
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| FilterError::invalid("attributes must be an object"))?;
        Ok(map.iter().map(|(k, v)| (k.clone(), Value::from(v))).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (k, v) in iter {
            attributes.insert(k, v);
        }
        attributes
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Attributes {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// Builds SphinxQL statements for a single index.
///
/// Stateless apart from the index name and relevance expression; every call
/// is a pure function of its arguments, so one builder can be shared across
/// threads freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    index: String,
    relevance_expr: String,
}

impl QueryBuilder {
    /// Create a builder for `index` using the default relevance expression.
    pub fn new(index: impl Into<String>) -> Self {
        Self::from_config(&IndexConfig::new(index))
    }

    /// Create a builder from an index configuration.
    pub fn from_config(config: &IndexConfig) -> Self {
        Self {
            index: config.name.clone(),
            relevance_expr: config.relevance_expr.clone(),
        }
    }

    /// Use a different scoring expression for the synthetic relevance field.
    #[must_use]
    pub fn relevance_expr(mut self, expr: impl Into<String>) -> Self {
        self.relevance_expr = expr.into();
        self
    }

    /// The target index.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Build a SELECT for the full-text `query` (may be empty) and `filters`.
    ///
    /// # Example
    ///
    /// ```
    /// use sphinxql_query::{Filters, QueryBuilder};
    ///
    /// let builder = QueryBuilder::new("articles");
    /// let (sql, params) = builder.select("cats", &Filters::new().filter("views", 100_i64..).limit(10));
    /// assert_eq!(sql, "SELECT * FROM articles WHERE MATCH(?) AND views >= ? LIMIT 0, 10");
    /// assert_eq!(params.len(), 2);
    /// ```
    pub fn select(&self, query: &str, filters: &Filters) -> (String, Vec<Value>) {
        Select::new(&self.index, query, filters.plan(&self.relevance_expr)).build()
    }

    /// Build an INSERT for one document.
    pub fn insert(&self, id: i64, attributes: &Attributes) -> (String, Vec<Value>) {
        self.values_statement("INSERT", &[(id, attributes)])
    }

    /// Build a multi-row INSERT. Column names come from the first row.
    #[allow(clippy::result_large_err)]
    pub fn insert_many(&self, rows: &[(i64, Attributes)]) -> Result<(String, Vec<Value>)> {
        self.batch_statement("INSERT", rows)
    }

    /// Build a REPLACE for one document.
    pub fn replace(&self, id: i64, attributes: &Attributes) -> (String, Vec<Value>) {
        self.values_statement("REPLACE", &[(id, attributes)])
    }

    /// Build a multi-row REPLACE. Column names come from the first row.
    #[allow(clippy::result_large_err)]
    pub fn replace_many(&self, rows: &[(i64, Attributes)]) -> Result<(String, Vec<Value>)> {
        self.batch_statement("REPLACE", rows)
    }

    /// Build an UPDATE of `attributes` for one or many documents.
    ///
    /// Attribute values are bound first, then the id(s). An empty attribute
    /// map has no SET clause to render and is rejected.
    #[allow(clippy::result_large_err)]
    #[tracing::instrument(level = "trace", skip(self, id, attributes), fields(index = %self.index))]
    pub fn update(&self, id: impl Into<Id>, attributes: &Attributes) -> Result<(String, Vec<Value>)> {
        if attributes.is_empty() {
            return Err(Error::Batch(BatchError {
                message: "UPDATE requires at least one attribute".to_string(),
            }));
        }
        let id = id.into();
        let assignments = attributes.iter().map(|(column, value)| {
            let mut f = Fragment::raw(format!("{} = ", column));
            f.push_bind(value.clone());
            f
        });

        let mut stmt = Fragment::raw(format!("UPDATE {} SET ", self.index));
        stmt.append(Fragment::join(assignments, ", "));
        stmt.push_sql(" WHERE ");
        stmt.append(id.predicate());

        let (sql, params) = stmt.into_parts();
        tracing::trace!(sql = %sql, params = params.len(), "Built UPDATE");
        Ok((sql, params))
    }

    /// Build a DELETE for one or many documents.
    #[tracing::instrument(level = "trace", skip(self, id), fields(index = %self.index))]
    pub fn delete(&self, id: impl Into<Id>) -> (String, Vec<Value>) {
        let mut stmt = Fragment::raw(format!("DELETE FROM {} WHERE ", self.index));
        stmt.append(id.into().predicate());

        let (sql, params) = stmt.into_parts();
        tracing::trace!(sql = %sql, params = params.len(), "Built DELETE");
        (sql, params)
    }

    #[allow(clippy::result_large_err)]
    fn batch_statement(&self, verb: &str, rows: &[(i64, Attributes)]) -> Result<(String, Vec<Value>)> {
        if rows.is_empty() {
            return Err(Error::Batch(BatchError {
                message: format!("{} requires at least one row", verb),
            }));
        }
        let rows: Vec<_> = rows.iter().map(|(id, attrs)| (*id, attrs)).collect();
        Ok(self.values_statement(verb, &rows))
    }

    /// `<verb> INTO <index> (<cols>, id) VALUES (…), (…)`.
    ///
    /// `rows` is non-empty. Every row renders its values in the first row's
    /// column order, with the document id as the final placeholder.
    #[tracing::instrument(level = "trace", skip(self, rows), fields(index = %self.index, rows = rows.len()))]
    fn values_statement(&self, verb: &str, rows: &[(i64, &Attributes)]) -> (String, Vec<Value>) {
        let first = rows.first().map(|(_, attrs)| *attrs);
        let columns: Vec<&str> = first
            .into_iter()
            .flat_map(|attrs| attrs.columns())
            .filter(|column| {
                if *column == "id" {
                    tracing::warn!("'id' attribute ignored; the document id is bound instead");
                    return false;
                }
                true
            })
            .collect();

        let tuples = rows.iter().enumerate().map(|(i, (id, attrs))| {
            if i > 0 && attrs.columns().any(|c| c != "id" && !columns.contains(&c)) {
                tracing::warn!(row = i, "row has columns not present in the first row; ignoring them");
            }
            let mut values: Vec<Fragment> = columns
                .iter()
                .map(|column| {
                    let value = attrs.get(column).cloned().unwrap_or_else(|| {
                        tracing::warn!(row = i, column, "row is missing a column; binding NULL");
                        Value::Null
                    });
                    Fragment::bound(value)
                })
                .collect();
            values.push(Fragment::bound(*id));

            let mut tuple = Fragment::raw("(");
            tuple.append(Fragment::join(values, ", "));
            tuple.push_sql(")");
            tuple
        });

        let mut column_list = columns.clone();
        column_list.push("id");

        let mut stmt = Fragment::raw(format!(
            "{} INTO {} ({}) VALUES ",
            verb,
            self.index,
            column_list.join(", ")
        ));
        stmt.append(Fragment::join(tuples, ", "));

        let (sql, params) = stmt.into_parts();
        tracing::trace!(sql = %sql, params = params.len(), "Built {}", verb);
        (sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> QueryBuilder {
        QueryBuilder::new("articles")
    }

    #[test]
    fn test_delete_single_and_batch() {
        let (sql, params) = builder().delete(5_i64);
        assert_eq!(sql, "DELETE FROM articles WHERE id = ?");
        assert_eq!(params, vec![Value::BigInt(5)]);

        let (sql, params) = builder().delete(vec![1_i64, 2, 3]);
        assert_eq!(sql, "DELETE FROM articles WHERE id IN(?, ?, ?)");
        assert_eq!(
            params,
            vec![Value::BigInt(1), Value::BigInt(2), Value::BigInt(3)]
        );
    }

    #[test]
    fn test_update_binds_id_last() {
        let attrs = Attributes::new().set("status", "active");
        let (sql, params) = builder().update(5_i64, &attrs).unwrap();

        assert_eq!(sql, "UPDATE articles SET status = ? WHERE id = ?");
        assert_eq!(params, vec![Value::Text("active".into()), Value::BigInt(5)]);
    }

    #[test]
    fn test_update_without_attributes_is_rejected() {
        let err = builder().update(5_i64, &Attributes::new()).unwrap_err();
        assert!(matches!(err, Error::Batch(_)));
        assert!(err.to_string().contains("UPDATE"));
    }

    #[test]
    fn test_update_many_with_multi_value() {
        let attrs = Attributes::new()
            .set("views", 10_i64)
            .set("tags", vec![4_i64, 5]);
        let (sql, params) = builder().update([7_i64, 8], &attrs).unwrap();

        assert_eq!(
            sql,
            "UPDATE articles SET views = ?, tags = (?, ?) WHERE id IN(?, ?)"
        );
        assert_eq!(
            params,
            vec![
                Value::BigInt(10),
                Value::BigInt(4),
                Value::BigInt(5),
                Value::BigInt(7),
                Value::BigInt(8),
            ]
        );
    }

    #[test]
    fn test_insert_nested_tuple_and_trailing_id() {
        let attrs = Attributes::from([
            ("title", Value::from("x")),
            ("tags", Value::from(vec![1_i64, 2])),
        ]);
        let (sql, params) = builder().insert(1, &attrs);

        assert_eq!(
            sql,
            "INSERT INTO articles (title, tags, id) VALUES (?, (?, ?), ?)"
        );
        assert_eq!(
            params,
            vec![
                Value::Text("x".into()),
                Value::BigInt(1),
                Value::BigInt(2),
                Value::BigInt(1),
            ]
        );
    }

    #[test]
    fn test_replace_uses_replace_keyword() {
        let attrs = Attributes::new().set("title", "y");
        let (sql, params) = builder().replace(9, &attrs);

        assert_eq!(sql, "REPLACE INTO articles (title, id) VALUES (?, ?)");
        assert_eq!(params, vec![Value::Text("y".into()), Value::BigInt(9)]);
    }

    #[test]
    fn test_insert_many_rows() {
        let rows = vec![
            (1, Attributes::new().set("title", "a").set("views", 3_i64)),
            (2, Attributes::new().set("views", 4_i64).set("title", "b")),
        ];
        let (sql, params) = builder().insert_many(&rows).unwrap();

        assert_eq!(
            sql,
            "INSERT INTO articles (title, views, id) VALUES (?, ?, ?), (?, ?, ?)"
        );
        assert_eq!(
            params,
            vec![
                Value::Text("a".into()),
                Value::BigInt(3),
                Value::BigInt(1),
                Value::Text("b".into()),
                Value::BigInt(4),
                Value::BigInt(2),
            ]
        );
    }

    #[test]
    fn test_insert_many_missing_column_binds_null() {
        let rows = vec![
            (1, Attributes::new().set("title", "a").set("views", 3_i64)),
            (2, Attributes::new().set("title", "b").set("extra", 1_i64)),
        ];
        let (sql, params) = builder().replace_many(&rows).unwrap();

        assert_eq!(
            sql,
            "REPLACE INTO articles (title, views, id) VALUES (?, ?, ?), (?, ?, ?)"
        );
        assert_eq!(params[4], Value::Null);
        assert_eq!(params.len(), 6);
    }

    #[test]
    fn test_insert_ignores_id_attribute() {
        let attrs = Attributes::new().set("id", 99_i64).set("title", "z");
        let (sql, params) = builder().insert(3, &attrs);

        assert_eq!(sql, "INSERT INTO articles (title, id) VALUES (?, ?)");
        assert_eq!(params, vec![Value::Text("z".into()), Value::BigInt(3)]);
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        let err = builder().insert_many(&[]).unwrap_err();
        assert!(matches!(err, Error::Batch(_)));
    }

    #[test]
    fn attributes_set_replaces_in_place() {
        let attrs = Attributes::new()
            .set("a", 1_i64)
            .set("b", 2_i64)
            .set("a", 3_i64);
        assert_eq!(attrs.columns().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(attrs.get("a"), Some(&Value::BigInt(3)));
    }

    #[test]
    fn attributes_from_json_keep_order() {
        let attrs =
            Attributes::from_json(&serde_json::json!({"title": "t", "tags": [1, 2], "views": 5}))
                .unwrap();
        assert_eq!(
            attrs.columns().collect::<Vec<_>>(),
            vec!["title", "tags", "views"]
        );
        assert!(Attributes::from_json(&serde_json::json!([1])).is_err());
    }

    #[test]
    fn relevance_expression_is_configurable() {
        let builder = QueryBuilder::new("articles").relevance_expr("@weight");
        let (sql, _) = builder.select("", &Filters::new().order("relevance", None));
        assert_eq!(
            sql,
            "SELECT *, @weight AS relevance FROM articles ORDER BY relevance ASC"
        );
    }

    #[test]
    fn builder_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QueryBuilder>();
    }
}
