//! Index configuration.

use serde::{Deserialize, Serialize};

/// Scoring expression of Sphinx 2.1 and later. Sphinx 2.0 servers use `@weight`.
pub const DEFAULT_RELEVANCE_EXPR: &str = "WEIGHT()";

/// Configuration for statements targeting one index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Index name the statements target
    pub name: String,
    /// Expression aliased to `relevance` when ordering by relevance
    pub relevance_expr: String,
    /// Whether searches follow the SELECT with `SHOW META`
    pub fetch_meta: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            relevance_expr: DEFAULT_RELEVANCE_EXPR.to_string(),
            fetch_meta: true,
        }
    }
}

impl IndexConfig {
    /// Create a configuration for `name` with default values.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the relevance expression.
    pub fn relevance_expr(mut self, expr: impl Into<String>) -> Self {
        self.relevance_expr = expr.into();
        self
    }

    /// Enable or disable `SHOW META` after searches.
    pub fn fetch_meta(mut self, enabled: bool) -> Self {
        self.fetch_meta = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = IndexConfig::new("articles");
        assert_eq!(config.name, "articles");
        assert_eq!(config.relevance_expr, "WEIGHT()");
        assert!(config.fetch_meta);
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let config: IndexConfig =
            serde_json::from_str(r#"{"name": "posts", "relevance_expr": "@weight"}"#).unwrap();
        assert_eq!(config, IndexConfig::new("posts").relevance_expr("@weight"));
    }
}
