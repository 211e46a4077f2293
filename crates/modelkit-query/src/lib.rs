//! Dialect-neutral queries for modelkit.
//!
//! `modelkit-query` turns one predicate language into either a parameterized
//! SQL `SELECT` or a document-store filter, depending on the dialect of the
//! connection at execution time.
//!
//! - [`Query`] collects `(column, operator, value)` predicates and a limit.
//! - [`sql`] renders them for Postgres, MySQL and SQLite placeholders.
//! - [`document`] renders them as a filter document for `Adapter::find`.

pub mod builder;
pub mod document;
pub mod predicate;
pub mod sql;

pub use builder::{Query, Statement};
pub use document::{FindStatement, like_to_regex, render_filter};
pub use predicate::{Operator, Predicate};
pub use sql::{SqlStatement, render_select, render_where};
