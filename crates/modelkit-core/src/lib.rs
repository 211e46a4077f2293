//! Core types and traits for modelkit.
//!
//! `modelkit-core` is the **foundation layer** for the workspace. It defines the
//! contracts and data types every other crate builds on.
//!
//! # Role In The Architecture
//!
//! - **Contract layer**: [`Adapter`] is implemented by external drivers, [`Model`]
//!   by the host's model layer. [`Connection`] wraps exactly one adapter.
//! - **Data model**: [`Value`], [`Row`] and [`QueryResult`] carry query inputs and
//!   outputs across dialects.
//! - **Error taxonomy**: [`Error`] separates validation failures, capability and
//!   connectivity problems, transaction state errors and backend errors.
//! - **Structured concurrency**: re-exports `Cx` and `Outcome` from asupersync so
//!   every suspending operation is cancel-correct and budget-aware.
//!
//! # Who Uses This Crate
//!
//! - `modelkit-query` renders predicates for a [`Dialect`] and runs them through a
//!   [`Connection`].
//! - `modelkit-session` drives the adapter's transaction primitives.
//! - `modelkit-validate` reads [`Model`] fields and raises [`ValidationError`].

// Re-export asupersync primitives for structured concurrency
pub use asupersync::{Cx, Outcome};

pub mod adapter;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod model;
pub mod row;
pub mod value;

pub use adapter::{Adapter, BoxFuture, IsolationLevel};
pub use connection::Connection;
pub use dialect::{Dialect, DialectFamily};
pub use error::{
    Capability, CapabilityError, ConnectionError, ConnectionErrorKind, Error, QueryError,
    QueryErrorKind, Result, TransactionError, TransactionErrorKind, ValidationError,
};
pub use model::{DynamicModel, Model};
pub use row::{QueryResult, Row};
pub use value::Value;
