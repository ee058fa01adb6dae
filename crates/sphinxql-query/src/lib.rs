//! SphinxQL statement builder.
//!
//! `sphinxql-query` is the **statement construction layer**. It turns a
//! full-text query string plus a [`Filters`] description into SphinxQL text
//! and the ordered list of values bound to its `?` placeholders, and builds
//! INSERT, REPLACE, UPDATE and DELETE statements for documents by id.
//!
//! # Role In The Architecture
//!
//! - **Comparisons**: [`Comparison`] renders one attribute filter.
//! - **Filters**: [`Filters`] is normalized into a [`QueryPlan`] without
//!   touching the caller's description.
//! - **Fragments**: every placeholder is written by [`Fragment`] together with
//!   its bound value, so the statement text and parameter list cannot drift.
//!
//! The resulting statements execute through the `Connection` trait from
//! `sphinxql-core`. Most users reach these builders via the `sphinxql` facade.

pub mod builder;
pub mod clause;
pub mod comparison;
pub mod filter;
pub mod select;

pub use builder::{Attributes, Id, QueryBuilder};
pub use clause::{Fragment, Limit, OrderBy, OrderDirection};
pub use comparison::Comparison;
pub use filter::{Condition, Filters, QueryPlan, RELEVANCE};
pub use select::Select;
