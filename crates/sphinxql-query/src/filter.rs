//! Filter descriptions and their normalized query plan.
//!
//! [`Filters`] describes one search: selected fields, attribute filters, a
//! free-form condition, grouping, ordering, paging and options. It can be
//! built fluently or read from a JSON mapping with the reserved keys
//! `attrs`, `limit`, `offset`, `order`, `options`, `group` and `conditions`;
//! every other key is an attribute filter.
//!
//! [`Filters::plan`] is a read-only pass producing a [`QueryPlan`]; the
//! description is never modified by building a statement from it.
//!
//! # Trust boundary
//!
//! Field names, attribute names, `group`, `options` values and the text of
//! `conditions` are inserted into statements verbatim. Only filter *values*
//! are bound. Never route untrusted input through the verbatim paths.

use crate::clause::{Fragment, Limit, OrderBy, OrderDirection};
use crate::comparison::Comparison;
use regex::Regex;
use serde_json::Value as Json;
use sphinxql_core::{Error, FilterError, Result, Value};
use std::sync::OnceLock;

/// Alias given to the synthetic relevance field.
pub const RELEVANCE: &str = "relevance";

/// A pre-formed condition inserted verbatim into the WHERE clause, with the
/// values for its placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    sql: String,
    params: Vec<Value>,
}

impl Condition {
    /// The caller guarantees the flattened `params` match the `?`
    /// placeholders in `sql`. Array values are expanded element by element,
    /// so `"tags IN(?, ?)"` takes either two scalars or one two-element array.
    pub fn new(sql: impl Into<String>, params: impl IntoIterator<Item = Value>) -> Self {
        let mut flat = Vec::new();
        for value in params {
            value.flatten_into(&mut flat);
        }
        Self {
            sql: sql.into(),
            params: flat,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub(crate) fn to_fragment(&self) -> Fragment {
        Fragment::with_params(self.sql.clone(), self.params.clone())
    }
}

/// Description of one search request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    attrs: Option<Vec<String>>,
    attributes: Vec<(String, Comparison)>,
    conditions: Option<Condition>,
    group: Option<String>,
    order: Vec<(String, Option<OrderDirection>)>,
    limit: Option<Value>,
    offset: Option<Value>,
    options: Vec<(String, String)>,
}

impl Filters {
    /// Create an empty description: all fields, no filters, no paging.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select specific fields or expressions instead of `*`.
    pub fn attrs<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attrs = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Add an attribute filter.
    pub fn filter(mut self, attribute: impl Into<String>, comparison: impl Into<Comparison>) -> Self {
        self.attributes.push((attribute.into(), comparison.into()));
        self
    }

    /// Add an attribute filter from a dynamic value, classifying its shape.
    #[allow(clippy::result_large_err)]
    pub fn try_filter(self, attribute: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        let attribute = attribute.into();
        let comparison = Comparison::try_from(value.into())
            .map_err(|e| Error::Filter(e.for_attribute(&attribute)))?;
        Ok(self.filter(attribute, comparison))
    }

    /// Set the free-form condition (replaces any previous one).
    pub fn conditions(mut self, condition: Condition) -> Self {
        self.conditions = Some(condition);
        self
    }

    /// Group by an expression.
    pub fn group(mut self, expr: impl Into<String>) -> Self {
        self.group = Some(expr.into());
        self
    }

    /// Order by an attribute; `None` means ascending.
    pub fn order(mut self, attribute: impl Into<String>, direction: Option<OrderDirection>) -> Self {
        self.order.push((attribute.into(), direction));
        self
    }

    /// Order by a prepared [`OrderBy`] entry.
    pub fn order_by(self, order: OrderBy) -> Self {
        let direction = order.direction();
        self.order(order.column(), Some(direction))
    }

    /// Set the result count. Non-numeric values coerce to zero.
    pub fn limit(mut self, limit: impl Into<Value>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Set the result offset. Only used when a limit is present.
    pub fn offset(mut self, offset: impl Into<Value>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    /// Add an `OPTION name = value` entry; the value is emitted verbatim.
    pub fn option(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.options.push((name.into(), value.to_string()));
        self
    }

    /// Attribute filters in the order they were added.
    pub fn attribute_filters(&self) -> &[(String, Comparison)] {
        &self.attributes
    }

    /// Read a JSON filter description.
    ///
    /// ```
    /// use sphinxql_query::Filters;
    ///
    /// let filters = Filters::from_json(&serde_json::json!({
    ///     "attrs": ["title"],
    ///     "views": {"gte": 100},
    ///     "order": [["relevance", "desc"]],
    ///     "limit": 20,
    /// }))
    /// .unwrap();
    /// assert_eq!(filters.attribute_filters().len(), 1);
    /// ```
    #[allow(clippy::result_large_err)]
    pub fn from_json(desc: &Json) -> Result<Self> {
        let map = desc
            .as_object()
            .ok_or_else(|| FilterError::invalid("filter description must be an object"))?;

        let mut filters = Filters::new();
        for (key, value) in map {
            match key.as_str() {
                "attrs" => filters.attrs = Some(parse_attrs(value)?),
                "limit" => filters.limit = Some(Value::from(value)),
                "offset" => filters.offset = Some(Value::from(value)),
                "order" => filters.order = parse_order(value)?,
                "options" => filters.options = parse_options(value)?,
                "group" => filters.group = Some(parse_group(value)?),
                "conditions" => filters.conditions = Some(parse_conditions(value)?),
                attribute => {
                    let comparison = Comparison::try_from(value)
                        .map_err(|e| Error::Filter(e.for_attribute(attribute)))?;
                    filters.attributes.push((attribute.to_string(), comparison));
                }
            }
        }
        Ok(filters)
    }

    /// Normalize into a [`QueryPlan`].
    ///
    /// `relevance_expr` is the scoring expression used when ordering refers
    /// to `relevance` but no requested field provides it.
    pub fn plan(&self, relevance_expr: &str) -> QueryPlan<'_> {
        let order = normalize_order(&self.order);

        let mut fields = self
            .attrs
            .clone()
            .unwrap_or_else(|| vec!["*".to_string()]);
        let orders_by_relevance = order.iter().any(|o| o.column() == RELEVANCE);
        if orders_by_relevance && !fields.iter().any(|f| names_relevance(f)) {
            fields.push(format!("{} AS {}", relevance_expr, RELEVANCE));
        }

        let limit = self.limit.as_ref().map(|limit| Limit {
            offset: self.offset.as_ref().map_or(0, |o| coerce_paging("offset", o)),
            count: coerce_paging("limit", limit),
        });

        QueryPlan {
            fields,
            conditions: self.conditions.as_ref(),
            attributes: &self.attributes,
            group: self.group.as_deref(),
            order,
            limit,
            options: &self.options,
        }
    }
}

/// Normalized, immutable view of a [`Filters`] ready for rendering.
#[derive(Debug, Clone)]
pub struct QueryPlan<'a> {
    pub fields: Vec<String>,
    pub conditions: Option<&'a Condition>,
    pub attributes: &'a [(String, Comparison)],
    pub group: Option<&'a str>,
    pub order: Vec<OrderBy>,
    pub limit: Option<Limit>,
    pub options: &'a [(String, String)],
}

fn relevance_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\brelevance\b").expect("static regex"))
}

fn names_relevance(field: &str) -> bool {
    relevance_pattern().is_match(field)
}

/// Collapse repeated attributes (first position, last direction) and apply
/// the ascending default.
fn normalize_order(order: &[(String, Option<OrderDirection>)]) -> Vec<OrderBy> {
    let mut out: Vec<OrderBy> = Vec::with_capacity(order.len());
    for (column, direction) in order {
        let entry = OrderBy::new(column.clone(), direction.unwrap_or_default());
        match out.iter_mut().find(|o| o.column() == column) {
            Some(existing) => *existing = entry,
            None => out.push(entry),
        }
    }
    out
}

fn coerce_paging(name: &str, value: &Value) -> u64 {
    let numeric = value.as_i64().is_some()
        || value.as_f64().is_some()
        || value.as_str().is_some_and(|s| s.trim().parse::<i64>().is_ok());
    if !numeric {
        tracing::warn!(
            key = name,
            value = %value,
            "non-numeric paging value; coercing leniently"
        );
    }
    value.to_paging()
}

fn json_text(value: &Json) -> Option<String> {
    match value {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        Json::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_attrs(value: &Json) -> std::result::Result<Vec<String>, FilterError> {
    match value {
        Json::Array(items) => items
            .iter()
            .map(|item| {
                json_text(item)
                    .ok_or_else(|| FilterError::invalid("'attrs' entries must be strings"))
            })
            .collect(),
        Json::String(s) => Ok(vec![s.clone()]),
        _ => Err(FilterError::invalid("'attrs' must be an array of field names")),
    }
}

fn parse_direction(attribute: &str, value: Option<&Json>) -> Option<OrderDirection> {
    match value {
        None | Some(Json::Null) => None,
        Some(Json::String(s)) => OrderDirection::parse(s).or_else(|| {
            tracing::warn!(attribute, direction = %s, "unknown order direction; using ASC");
            None
        }),
        Some(other) => {
            tracing::warn!(attribute, direction = %other, "unknown order direction; using ASC");
            None
        }
    }
}

fn parse_order(
    value: &Json,
) -> std::result::Result<Vec<(String, Option<OrderDirection>)>, FilterError> {
    let entry = |item: &Json| match item {
        Json::String(attribute) => Ok((attribute.clone(), None)),
        Json::Array(pair) => match pair.first() {
            Some(Json::String(attribute)) => {
                Ok((attribute.clone(), parse_direction(attribute, pair.get(1))))
            }
            _ => Err(FilterError::invalid(
                "'order' entries must start with an attribute name",
            )),
        },
        _ => Err(FilterError::invalid(
            "'order' entries must be names or [name, direction] pairs",
        )),
    };

    match value {
        Json::Null => Ok(Vec::new()),
        Json::Array(items) => items.iter().map(entry).collect(),
        Json::Object(map) => Ok(map
            .iter()
            .map(|(attribute, dir)| (attribute.clone(), parse_direction(attribute, Some(dir))))
            .collect()),
        single @ Json::String(_) => Ok(vec![entry(single)?]),
        _ => Err(FilterError::invalid("'order' must be an array or object")),
    }
}

/// Objects render as `(k=v, k=v)`, the syntax of `field_weights` and
/// `index_weights`.
fn option_text(value: &Json) -> String {
    match value {
        Json::Object(map) => {
            let parts: Vec<_> = map
                .iter()
                .map(|(k, v)| format!("{}={}", k, option_text(v)))
                .collect();
            format!("({})", parts.join(", "))
        }
        Json::Array(items) => items.iter().map(option_text).collect::<Vec<_>>().join(", "),
        Json::Null => String::new(),
        scalar => json_text(scalar).unwrap_or_default(),
    }
}

fn parse_options(value: &Json) -> std::result::Result<Vec<(String, String)>, FilterError> {
    match value {
        Json::Object(map) => Ok(map
            .iter()
            .map(|(name, v)| (name.clone(), option_text(v)))
            .collect()),
        _ => Err(FilterError::invalid("'options' must be an object")),
    }
}

fn parse_group(value: &Json) -> std::result::Result<String, FilterError> {
    json_text(value).ok_or_else(|| FilterError::invalid("'group' must be a single expression"))
}

fn parse_conditions(value: &Json) -> std::result::Result<Condition, FilterError> {
    match value {
        Json::String(sql) => Ok(Condition::new(sql.clone(), Vec::new())),
        Json::Array(items) => match items.split_first() {
            Some((Json::String(sql), params)) => {
                Ok(Condition::new(sql.clone(), params.iter().map(Value::from)))
            }
            _ => Err(FilterError::invalid(
                "'conditions' must be [fragment, bind...] with a string fragment",
            )),
        },
        _ => Err(FilterError::invalid(
            "'conditions' must be a string or [fragment, bind...]",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plan_defaults_to_all_fields_without_paging() {
        let filters = Filters::new();
        let plan = filters.plan("WEIGHT()");

        assert_eq!(plan.fields, vec!["*"]);
        assert!(plan.conditions.is_none());
        assert!(plan.attributes.is_empty());
        assert!(plan.order.is_empty());
        assert!(plan.limit.is_none());
    }

    #[test]
    fn relevance_ordering_adds_synthetic_field() {
        let filters = Filters::new().attrs(["title"]).order("relevance", None);
        let plan = filters.plan("WEIGHT()");

        assert_eq!(plan.fields, vec!["title", "WEIGHT() AS relevance"]);
        assert_eq!(plan.order, vec![OrderBy::asc("relevance")]);
    }

    #[test]
    fn explicit_relevance_field_is_not_duplicated() {
        let filters = Filters::new()
            .attrs(["title", "@weight AS relevance"])
            .order("relevance", Some(OrderDirection::Desc));
        let plan = filters.plan("WEIGHT()");

        assert_eq!(plan.fields, vec!["title", "@weight AS relevance"]);
    }

    #[test]
    fn relevance_match_is_word_bounded() {
        assert!(names_relevance("relevance"));
        assert!(names_relevance("WEIGHT() AS relevance"));
        assert!(!names_relevance("relevance_score"));
        assert!(!names_relevance("irrelevance"));
    }

    #[test]
    fn offset_defaults_to_zero_and_needs_limit() {
        let filters = Filters::new().limit(10);
        assert_eq!(
            filters.plan("WEIGHT()").limit,
            Some(Limit {
                offset: 0,
                count: 10
            })
        );

        let offset_only = Filters::new().offset(5);
        assert!(offset_only.plan("WEIGHT()").limit.is_none());
    }

    #[test]
    fn non_numeric_paging_coerces_to_zero() {
        let filters = Filters::new().limit("lots").offset("3");
        assert_eq!(
            filters.plan("WEIGHT()").limit,
            Some(Limit {
                offset: 3,
                count: 0
            })
        );
    }

    #[test]
    fn repeated_order_keys_collapse() {
        let filters = Filters::new()
            .order("views", None)
            .order("title", Some(OrderDirection::Desc))
            .order("views", Some(OrderDirection::Desc));
        let plan = filters.plan("WEIGHT()");

        assert_eq!(
            plan.order,
            vec![OrderBy::desc("views"), OrderBy::desc("title")]
        );
    }

    #[test]
    fn planning_leaves_description_untouched() {
        let filters = Filters::new()
            .conditions(Condition::new("views > ?", [Value::BigInt(3)]))
            .filter("author_id", 7_i64);
        let before = filters.clone();

        let _ = filters.plan("WEIGHT()");
        let _ = filters.plan("WEIGHT()");

        assert_eq!(filters, before);
    }

    #[test]
    fn from_json_reads_reserved_keys_and_attribute_filters() {
        let filters = Filters::from_json(&json!({
            "attrs": ["title", "views"],
            "views": {"gt": 10},
            "author_id": [1, 2],
            "conditions": ["views < ?", 1000],
            "group": "author_id",
            "order": [["views", "desc"], ["title"]],
            "limit": "25",
            "offset": 50,
            "options": {"ranker": "sph04", "field_weights": {"title": 10, "body": 3}},
        }))
        .unwrap();

        let plan = filters.plan("WEIGHT()");
        assert_eq!(plan.fields, vec!["title", "views"]);
        assert_eq!(
            plan.attributes,
            &[
                ("views".to_string(), Comparison::gt(10_i64)),
                ("author_id".to_string(), Comparison::in_list([1_i64, 2])),
            ]
        );
        assert_eq!(plan.conditions.map(Condition::sql), Some("views < ?"));
        assert_eq!(plan.group, Some("author_id"));
        assert_eq!(plan.order, vec![OrderBy::desc("views"), OrderBy::asc("title")]);
        assert_eq!(
            plan.limit,
            Some(Limit {
                offset: 50,
                count: 25
            })
        );
        assert_eq!(
            plan.options,
            &[
                ("ranker".to_string(), "sph04".to_string()),
                ("field_weights".to_string(), "(title=10, body=3)".to_string()),
            ]
        );
    }

    #[test]
    fn from_json_order_shapes() {
        let object = Filters::from_json(&json!({"order": {"views": "DESC", "title": null}})).unwrap();
        assert_eq!(
            object.plan("WEIGHT()").order,
            vec![OrderBy::desc("views"), OrderBy::asc("title")]
        );

        let names = Filters::from_json(&json!({"order": ["views"]})).unwrap();
        assert_eq!(names.plan("WEIGHT()").order, vec![OrderBy::asc("views")]);

        let unknown = Filters::from_json(&json!({"order": [["views", "sideways"]]})).unwrap();
        assert_eq!(unknown.plan("WEIGHT()").order, vec![OrderBy::asc("views")]);
    }

    #[test]
    fn from_json_rejects_unsupported_filter_value() {
        let err = Filters::from_json(&json!({"views": {"near": 5}})).unwrap_err();
        assert!(err.is_unsupported_filter());
        assert!(err.to_string().contains("'views'"));
    }

    #[test]
    fn from_json_rejects_malformed_description() {
        assert!(Filters::from_json(&json!([1, 2])).is_err());
        assert!(Filters::from_json(&json!({"attrs": 5})).is_err());
        assert!(Filters::from_json(&json!({"options": "ranker=none"})).is_err());
        assert!(Filters::from_json(&json!({"conditions": [1, 2]})).is_err());
    }

    #[test]
    fn try_filter_classifies_dynamic_values() {
        let filters = Filters::new()
            .try_filter("tags", vec![1_i64, 2])
            .unwrap()
            .try_filter("title", "x")
            .unwrap();
        assert_eq!(
            filters.attribute_filters(),
            &[
                ("tags".to_string(), Comparison::in_list([1_i64, 2])),
                ("title".to_string(), Comparison::equal("x")),
            ]
        );

        let nested = Value::Array(vec![Value::from(vec![1_i64])]);
        assert!(Filters::new().try_filter("tags", nested).is_err());
    }

    #[test]
    fn condition_array_binds_are_flattened() {
        let filters = Filters::from_json(&json!({
            "conditions": ["tags IN(?, ?) AND views > ?", [1, 2], 10],
        }))
        .unwrap();
        let condition = filters.plan("WEIGHT()").conditions.unwrap();
        assert_eq!(
            condition.params(),
            &[Value::BigInt(1), Value::BigInt(2), Value::BigInt(10)]
        );

        let typed = Condition::new("tags IN(?, ?)", [Value::from(vec![3_i64, 4])]);
        assert_eq!(typed.params(), &[Value::BigInt(3), Value::BigInt(4)]);
    }
}
