//! Core types and traits for sphinxql.
//!
//! - `Value` for bind parameters and result cells
//! - `Error` / `Result` shared by the builder and the transport seam
//! - `Row` for result sets
//! - `IndexConfig` for the index a builder targets
//! - `Connection` trait for whatever transport executes generated statements
//! - `Cx` / `Outcome` re-exported from asupersync

// Re-export asupersync primitives for structured concurrency
pub use asupersync::{Cx, Outcome};

pub mod config;
pub mod connection;
pub mod error;
pub mod row;
pub mod value;

pub use config::IndexConfig;
pub use connection::Connection;
pub use error::{
    BatchError, ConnectionError, ConnectionErrorKind, Error, FilterError, FilterErrorKind,
    QueryError, Result, TypeError,
};
pub use row::{ColumnInfo, Row};
pub use value::Value;
