//! Attribute comparisons.
//!
//! A [`Comparison`] turns one attribute-filter value into a comparison
//! fragment such as `= ?`, `IN(?, ?)` or `NOT BETWEEN ? AND ?` plus the values
//! bound to it. Typed values convert infallibly through `From`; dynamic
//! values ([`Value`], JSON) are classified with `TryFrom` and may be rejected
//! as unsupported.

use crate::clause::Fragment;
use sphinxql_core::{FilterError, Value};
use std::ops::{Range, RangeFrom, RangeInclusive, RangeTo, RangeToInclusive};

/// Comparison against a single attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    /// `= ?`
    Eq(Value),
    /// `IN(?, ?, …)`
    In(Vec<Value>),
    /// `BETWEEN ? AND ?` (inclusive on both ends)
    Between(Value, Value),
    /// `> ?`
    Gt(Value),
    /// `>= ?`
    Gte(Value),
    /// `< ?`
    Lt(Value),
    /// `<= ?`
    Lte(Value),
    /// Negated form of the inner comparison
    Not(Box<Comparison>),
}

impl Comparison {
    pub fn equal(value: impl Into<Value>) -> Self {
        Comparison::Eq(value.into())
    }

    pub fn in_list<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Comparison::In(values.into_iter().map(Into::into).collect())
    }

    pub fn between(low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Comparison::Between(low.into(), high.into())
    }

    pub fn gt(value: impl Into<Value>) -> Self {
        Comparison::Gt(value.into())
    }

    pub fn gte(value: impl Into<Value>) -> Self {
        Comparison::Gte(value.into())
    }

    pub fn lt(value: impl Into<Value>) -> Self {
        Comparison::Lt(value.into())
    }

    pub fn lte(value: impl Into<Value>) -> Self {
        Comparison::Lte(value.into())
    }

    /// Wrap this comparison in a negation. Negating twice cancels out.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Comparison::Not(inner) => *inner,
            other => Comparison::Not(Box::new(other)),
        }
    }

    /// Number of values bound by [`to_sql`](Self::to_sql).
    pub fn bind_count(&self) -> usize {
        match self {
            Comparison::Not(inner) => inner.bind_count(),
            Comparison::In(values) => values.iter().map(Value::cardinality).sum(),
            Comparison::Between(low, high) => low.cardinality() + high.cardinality(),
            Comparison::Eq(v)
            | Comparison::Gt(v)
            | Comparison::Gte(v)
            | Comparison::Lt(v)
            | Comparison::Lte(v) => v.cardinality(),
        }
    }

    /// Render the comparison fragment, without the attribute name.
    pub fn to_sql(&self) -> Fragment {
        self.render(false)
    }

    fn render(&self, negated: bool) -> Fragment {
        let (op, value) = match self {
            Comparison::Not(inner) => return inner.render(!negated),
            Comparison::In(values) => {
                let mut f = Fragment::raw(if negated { "NOT IN(" } else { "IN(" });
                f.push_bind_list(values.iter().cloned());
                f.push_sql(")");
                return f;
            }
            Comparison::Between(low, high) => {
                let mut f = Fragment::raw(if negated {
                    "NOT BETWEEN "
                } else {
                    "BETWEEN "
                });
                f.push_bind(low.clone());
                f.push_sql(" AND ");
                f.push_bind(high.clone());
                return f;
            }
            Comparison::Eq(v) => (if negated { "!=" } else { "=" }, v),
            Comparison::Gt(v) => (if negated { "<=" } else { ">" }, v),
            Comparison::Gte(v) => (if negated { "<" } else { ">=" }, v),
            Comparison::Lt(v) => (if negated { ">=" } else { "<" }, v),
            Comparison::Lte(v) => (if negated { ">" } else { "<=" }, v),
        };
        let mut f = Fragment::raw(op);
        f.push_sql(" ");
        f.push_bind(value.clone());
        f
    }

    /// Render `<attribute> <comparison>`.
    pub fn for_attribute(&self, attribute: &str) -> Fragment {
        let mut f = Fragment::raw(attribute);
        f.push_sql(" ");
        f.append(self.to_sql());
        f
    }
}

impl std::ops::Not for Comparison {
    type Output = Comparison;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

macro_rules! impl_from_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Comparison {
                fn from(v: $t) -> Self {
                    Comparison::Eq(v.into())
                }
            }
        )*
    };
}

impl_from_scalar!(bool, i32, i64, u32, f32, f64, String, &str);

impl<T: Into<Value>> From<Vec<T>> for Comparison {
    fn from(v: Vec<T>) -> Self {
        Comparison::in_list(v)
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Comparison {
    fn from(v: [T; N]) -> Self {
        Comparison::in_list(v)
    }
}

macro_rules! impl_from_ranges {
    ($($t:ty),* $(,)?) => {
        $(
            /// Half-open integer range: the upper bound is made inclusive.
            /// An empty range renders `BETWEEN MAX AND MIN`, which matches nothing.
            impl From<Range<$t>> for Comparison {
                fn from(r: Range<$t>) -> Self {
                    if r.is_empty() {
                        return Comparison::between(<$t>::MAX, <$t>::MIN);
                    }
                    Comparison::between(r.start, r.end - 1)
                }
            }

            impl From<RangeInclusive<$t>> for Comparison {
                fn from(r: RangeInclusive<$t>) -> Self {
                    let (low, high) = r.into_inner();
                    Comparison::between(low, high)
                }
            }

            impl From<RangeFrom<$t>> for Comparison {
                fn from(r: RangeFrom<$t>) -> Self {
                    Comparison::gte(r.start)
                }
            }

            impl From<RangeTo<$t>> for Comparison {
                fn from(r: RangeTo<$t>) -> Self {
                    Comparison::lt(r.end)
                }
            }

            impl From<RangeToInclusive<$t>> for Comparison {
                fn from(r: RangeToInclusive<$t>) -> Self {
                    Comparison::lte(r.end)
                }
            }
        )*
    };
}

impl_from_ranges!(i32, i64, u32);

impl From<RangeInclusive<f64>> for Comparison {
    fn from(r: RangeInclusive<f64>) -> Self {
        let (low, high) = r.into_inner();
        Comparison::between(low, high)
    }
}

impl From<RangeFrom<f64>> for Comparison {
    fn from(r: RangeFrom<f64>) -> Self {
        Comparison::gte(r.start)
    }
}

impl From<RangeTo<f64>> for Comparison {
    fn from(r: RangeTo<f64>) -> Self {
        Comparison::lt(r.end)
    }
}

/// Classify a dynamic value.
///
/// - arrays of scalars become `IN`
/// - JSON objects with exactly one operator key (`eq`, `in`, `between`, `gt`,
///   `gte`, `lt`, `lte`, `not`) become that comparison
/// - any other scalar becomes `=`
///
/// Nested arrays and any other object are rejected.
impl TryFrom<Value> for Comparison {
    type Error = FilterError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(items) => Ok(Comparison::In(scalars(items, "IN list")?)),
            Value::Json(serde_json::Value::Object(map)) => {
                let mut entries = map.into_iter();
                let (op, operand) = match (entries.next(), entries.next()) {
                    (Some(entry), None) => entry,
                    (None, _) => {
                        return Err(FilterError::unsupported(None, "empty operator object"));
                    }
                    (Some(_), Some(_)) => {
                        return Err(FilterError::unsupported(
                            None,
                            "operator object must have exactly one key",
                        ));
                    }
                };
                from_operator(&op, Value::from(operand))
            }
            Value::Json(other) => Comparison::try_from(Value::from(other)),
            scalar => Ok(Comparison::Eq(scalar)),
        }
    }
}

impl TryFrom<&serde_json::Value> for Comparison {
    type Error = FilterError;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        Comparison::try_from(Value::from(value))
    }
}

fn from_operator(op: &str, operand: Value) -> Result<Comparison, FilterError> {
    match op {
        "eq" => Ok(Comparison::Eq(scalar(operand, op)?)),
        "gt" => Ok(Comparison::Gt(scalar(operand, op)?)),
        "gte" => Ok(Comparison::Gte(scalar(operand, op)?)),
        "lt" => Ok(Comparison::Lt(scalar(operand, op)?)),
        "lte" => Ok(Comparison::Lte(scalar(operand, op)?)),
        "in" => match operand {
            Value::Array(items) => Ok(Comparison::In(scalars(items, "IN list")?)),
            other => Err(FilterError::unsupported(
                None,
                format!("'in' expects an array, found {}", other.type_name()),
            )),
        },
        "between" => match operand {
            Value::Array(items) if items.len() == 2 => {
                let bounds: [Value; 2] = scalars(items, "BETWEEN bound")?
                    .try_into()
                    .map_err(|_| FilterError::unsupported(None, "'between' expects [low, high]"))?;
                let [low, high] = bounds;
                Ok(Comparison::Between(low, high))
            }
            other => Err(FilterError::unsupported(
                None,
                format!(
                    "'between' expects [low, high], found {} value(s)",
                    other.cardinality()
                ),
            )),
        },
        "not" => Ok(Comparison::try_from(operand)?.negate()),
        other => Err(FilterError::unsupported(
            None,
            format!("unknown operator '{}'", other),
        )),
    }
}

fn scalar(value: Value, op: &str) -> Result<Value, FilterError> {
    match value {
        Value::Array(_) | Value::Json(_) => Err(FilterError::unsupported(
            None,
            format!("'{}' expects a scalar, found {}", op, value.type_name()),
        )),
        scalar => Ok(scalar),
    }
}

fn scalars(items: Vec<Value>, context: &str) -> Result<Vec<Value>, FilterError> {
    items.into_iter().map(|v| scalar(v, context)).collect()
}
