//! Transaction lifecycle for modelkit.
//!
//! A [`Transaction`] wraps the adapter's begin/commit/rollback primitives
//! with a state machine that rejects illegal transitions:
//!
//! ```text
//! begin ──► Active ──commit──► Committed
//!              │
//!              └──rollback──► RolledBack ──rollback──► RolledBack (no-op)
//! ```
//!
//! [`Transaction::run`] is the scoped form: it commits when the work
//! succeeds and rolls back when it fails, returning the work's own error.
//!
//! # Example
//!
//! ```ignore
//! let id = Transaction::run(cx, &conn, |tx| async move {
//!     let rows = Query::new("users", tx.connection())
//!         .filter_eq("email", "a@b.co")
//!         .execute(cx)
//!         .await;
//!     rows.map(|r| r.row_count)
//! })
//! .await;
//! ```

pub mod transaction;

pub use transaction::{Transaction, TransactionOptions, TxState};
