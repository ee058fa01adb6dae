//! SphinxQL clause types (bound fragments, ORDER BY, LIMIT, OPTION).

use sphinxql_core::Value;

/// A piece of statement text together with the values bound to its `?`
/// placeholders, in left-to-right order.
///
/// Placeholders are only ever written by [`push_bind`](Fragment::push_bind)
/// and [`push_bind_list`](Fragment::push_bind_list), which append the
/// matching values in the same call. Text added through [`raw`](Fragment::raw),
/// [`push_sql`](Fragment::push_sql) or [`with_params`](Fragment::with_params)
/// is trusted verbatim: it must not come from untrusted input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    sql: String,
    params: Vec<Value>,
}

impl Fragment {
    /// Create an empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trusted text with no bound values.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Trusted, pre-formed text carrying its own bound values.
    ///
    /// The caller guarantees `params` matches the placeholders in `sql`.
    pub fn with_params(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// A fragment consisting of a single bound value.
    pub fn bound(value: impl Into<Value>) -> Self {
        let mut fragment = Self::new();
        fragment.push_bind(value.into());
        fragment
    }

    /// Append trusted text.
    pub fn push_sql(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Append a placeholder for `value`.
    ///
    /// Arrays (multi-value attributes) render as a parenthesized placeholder
    /// tuple `(?, ?, …)` and contribute one bound value per element.
    pub fn push_bind(&mut self, value: Value) -> &mut Self {
        match value {
            Value::Array(items) => {
                self.sql.push('(');
                self.push_bind_list(items);
                self.sql.push(')');
            }
            scalar => {
                self.sql.push('?');
                self.params.push(scalar);
            }
        }
        self
    }

    /// Append a comma-separated placeholder list, one entry per value.
    pub fn push_bind_list(&mut self, values: impl IntoIterator<Item = Value>) -> &mut Self {
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.push_bind(value);
        }
        self
    }

    /// Append another fragment, text and values together.
    pub fn append(&mut self, other: Fragment) -> &mut Self {
        self.sql.push_str(&other.sql);
        self.params.extend(other.params);
        self
    }

    /// Join fragments with a separator, keeping values in order.
    pub fn join(parts: impl IntoIterator<Item = Fragment>, separator: &str) -> Self {
        let mut joined = Self::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                joined.sql.push_str(separator);
            }
            joined.append(part);
        }
        joined
    }

    /// Check if this fragment has no text.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// The statement text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The bound values.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Split into statement text and bound values.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

/// ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    column: String,
    direction: OrderDirection,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    /// Parse `asc`/`desc` in any letter case.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(OrderDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(OrderDirection::Desc)
        } else {
            None
        }
    }

    /// The keyword as emitted in statements.
    pub const fn as_sql(self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

impl OrderBy {
    /// Create an order entry with an explicit direction.
    pub fn new(column: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    /// Create an ascending order entry.
    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, OrderDirection::Asc)
    }

    /// Create a descending order entry.
    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, OrderDirection::Desc)
    }

    /// The ordered expression.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// The sort direction.
    pub const fn direction(&self) -> OrderDirection {
        self.direction
    }

    /// Generate SQL for this ORDER BY entry.
    pub fn to_sql(&self) -> String {
        format!("{} {}", self.column, self.direction.as_sql())
    }
}

/// LIMIT clause in the `LIMIT <offset>, <count>` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub offset: u64,
    pub count: u64,
}

impl Limit {
    /// Generate SQL for this LIMIT clause.
    pub fn to_sql(&self) -> String {
        format!("LIMIT {}, {}", self.offset, self.count)
    }
}

/// Render `OPTION name = value, …`. Values are emitted verbatim.
pub fn options_sql(options: &[(String, String)]) -> String {
    let parts: Vec<_> = options
        .iter()
        .map(|(name, value)| format!("{} = {}", name, value))
        .collect();
    format!("OPTION {}", parts.join(", "))
}
