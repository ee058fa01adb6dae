//! SELECT statement assembly.

use crate::clause::{Fragment, options_sql};
use crate::filter::QueryPlan;
use sphinxql_core::Value;

/// A SELECT against one index, ready to render.
#[derive(Debug, Clone)]
pub struct Select<'a> {
    index: &'a str,
    query: &'a str,
    plan: QueryPlan<'a>,
}

impl<'a> Select<'a> {
    /// Create a SELECT for `index` matching the full-text `query` (may be empty).
    pub fn new(index: &'a str, query: &'a str, plan: QueryPlan<'a>) -> Self {
        Self { index, query, plan }
    }

    /// Build the WHERE clause body: MATCH, free-form condition, then one
    /// comparison per attribute filter, joined with AND.
    fn where_clause(&self) -> Option<Fragment> {
        let mut parts = Vec::with_capacity(self.plan.attributes.len() + 2);

        if !self.query.is_empty() {
            let mut matched = Fragment::raw("MATCH(");
            matched.push_bind(Value::from(self.query));
            matched.push_sql(")");
            parts.push(matched);
        }

        if let Some(condition) = self.plan.conditions {
            parts.push(condition.to_fragment());
        }

        parts.extend(
            self.plan
                .attributes
                .iter()
                .map(|(attribute, comparison)| comparison.for_attribute(attribute)),
        );

        if parts.is_empty() {
            None
        } else {
            Some(Fragment::join(parts, " AND "))
        }
    }

    /// Build the SQL query and parameters.
    #[tracing::instrument(level = "trace", skip(self), fields(index = self.index))]
    pub fn build(&self) -> (String, Vec<Value>) {
        let mut stmt = Fragment::raw(format!(
            "SELECT {} FROM {}",
            self.plan.fields.join(", "),
            self.index
        ));

        // WHERE
        if let Some(where_clause) = self.where_clause() {
            stmt.push_sql(" WHERE ");
            stmt.append(where_clause);
        }

        // GROUP BY
        if let Some(group) = self.plan.group {
            stmt.push_sql(" GROUP BY ");
            stmt.push_sql(group);
        }

        // ORDER BY
        if !self.plan.order.is_empty() {
            let order_strs: Vec<_> = self.plan.order.iter().map(|o| o.to_sql()).collect();
            stmt.push_sql(" ORDER BY ");
            stmt.push_sql(&order_strs.join(", "));
        }

        // LIMIT
        if let Some(limit) = self.plan.limit {
            stmt.push_sql(" ");
            stmt.push_sql(&limit.to_sql());
        }

        // OPTION
        if !self.plan.options.is_empty() {
            stmt.push_sql(" ");
            stmt.push_sql(&options_sql(self.plan.options));
        }

        let (sql, params) = stmt.into_parts();
        tracing::trace!(sql = %sql, params = params.len(), "Built SELECT");
        (sql, params)
    }
}
