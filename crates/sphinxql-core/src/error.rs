//! Error types for SphinxQL statement building and execution.

use std::fmt;

/// The primary error type for all sphinxql operations.
#[derive(Debug)]
pub enum Error {
    /// Filter description or filter value could not be interpreted
    Filter(FilterError),
    /// Batch statement could not be assembled
    Batch(BatchError),
    /// Type conversion errors
    Type(TypeError),
    /// Statement rejected by the search server
    Query(QueryError),
    /// Transport-level errors (connect, disconnect, timeout)
    Connection(ConnectionError),
}

#[derive(Debug, Clone)]
pub struct FilterError {
    pub kind: FilterErrorKind,
    /// Attribute the value was supplied for, when known
    pub attribute: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterErrorKind {
    /// A filter value shape no comparison can be built from
    UnsupportedValue,
    /// The filter description itself is malformed (not a mapping, bad reserved key)
    InvalidDescription,
}

#[derive(Debug, Clone)]
pub struct BatchError {
    pub message: String,
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

#[derive(Debug)]
pub struct QueryError {
    pub sql: Option<String>,
    /// Server error code (MySQL protocol errno), if reported
    pub code: Option<u16>,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug)]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// Failed to establish connection
    Connect,
    /// Connection lost during operation
    Disconnected,
    /// Statement issued on a closed connection
    Closed,
}

impl FilterError {
    /// An attribute filter value that cannot be classified.
    pub fn unsupported(attribute: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            kind: FilterErrorKind::UnsupportedValue,
            attribute: attribute.map(str::to_string),
            message: message.into(),
        }
    }

    /// A malformed filter description.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            kind: FilterErrorKind::InvalidDescription,
            attribute: None,
            message: message.into(),
        }
    }

    /// Attach the attribute name this error was raised for.
    #[must_use]
    pub fn for_attribute(mut self, attribute: &str) -> Self {
        if self.attribute.is_none() {
            self.attribute = Some(attribute.to_string());
        }
        self
    }
}

impl Error {
    /// Is this an unsupported filter value error?
    pub fn is_unsupported_filter(&self) -> bool {
        matches!(
            self,
            Error::Filter(FilterError {
                kind: FilterErrorKind::UnsupportedValue,
                ..
            })
        )
    }

    /// Is this a connection error that likely requires reconnection?
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Get the statement that caused this error, if available
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Query(q) => q.sql.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Filter(e) => write!(f, "Filter error: {}", e),
            Error::Batch(e) => write!(f, "Batch error: {}", e.message),
            Error::Type(e) => write!(f, "Type error: {}", e),
            Error::Query(e) => write!(f, "Query error: {}", e),
            Error::Connection(e) => write!(f, "Connection error: {}", e.message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Query(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Connection(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            FilterErrorKind::UnsupportedValue => "unsupported filter value",
            FilterErrorKind::InvalidDescription => "invalid filter description",
        };
        if let Some(attr) = &self.attribute {
            write!(f, "{} for '{}': {}", what, attr, self.message)
        } else {
            write!(f, "{}: {}", what, self.message)
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = &self.column {
            write!(
                f,
                "expected {} for column '{}', found {}",
                self.expected, col, self.actual
            )
        } else {
            write!(f, "expected {}, found {}", self.expected, self.actual)
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.code {
            write!(f, "{} (error {})", self.message, code)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<FilterError> for Error {
    fn from(err: FilterError) -> Self {
        Error::Filter(err)
    }
}

impl From<BatchError> for Error {
    fn from(err: BatchError) -> Self {
        Error::Batch(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}

impl From<ConnectionError> for Error {
    fn from(err: ConnectionError) -> Self {
        Error::Connection(err)
    }
}

/// Result type alias for sphinxql operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_filter_display_names_attribute() {
        let err: Error = FilterError::unsupported(None, "unknown operator 'near'")
            .for_attribute("views")
            .into();

        assert!(err.is_unsupported_filter());
        assert_eq!(
            err.to_string(),
            "Filter error: unsupported filter value for 'views': unknown operator 'near'"
        );
    }

    #[test]
    fn for_attribute_keeps_innermost_name() {
        let err = FilterError::unsupported(Some("inner"), "bad").for_attribute("outer");
        assert_eq!(err.attribute.as_deref(), Some("inner"));
    }

    #[test]
    fn query_error_exposes_sql_and_code() {
        let err = Error::Query(QueryError {
            sql: Some("SELECT * FROM missing".to_string()),
            code: Some(1064),
            message: "unknown local index 'missing'".to_string(),
            source: None,
        });

        assert_eq!(err.sql(), Some("SELECT * FROM missing"));
        assert!(!err.is_connection_error());
        assert_eq!(
            err.to_string(),
            "Query error: unknown local index 'missing' (error 1064)"
        );
    }

    #[test]
    fn connection_errors_are_flagged() {
        let err = Error::Connection(ConnectionError {
            kind: ConnectionErrorKind::Closed,
            message: "Cannot execute query on a closed connection".to_string(),
            source: None,
        });
        assert!(err.is_connection_error());
        assert!(!err.is_unsupported_filter());
    }
}
