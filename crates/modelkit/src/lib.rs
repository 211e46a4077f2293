//! modelkit: cross-dialect queries, transactions and field validation.
//!
//! This is the facade crate. It re-exports the workspace crates:
//!
//! - [`modelkit_core`]: values, rows, the [`Adapter`] and [`Model`] contracts,
//!   [`Connection`] and the [`Error`] taxonomy.
//! - [`modelkit_query`]: the dialect-neutral [`Query`] builder.
//! - [`modelkit_session`]: [`Transaction`] and its scoped-run helper.
//! - [`modelkit_validate`]: rules, rule maps and the [`Validator`] engine.
//!
//! Most applications only need the prelude:
//!
//! ```ignore
//! use modelkit::prelude::*;
//!
//! let conn = Connection::new(MyPostgresAdapter::new(url));
//! conn.connect(cx).await;
//!
//! let slot = ConnectionSlot::with(conn.clone());
//! let rules = RuleMap::new()
//!     .rule("email", Required::new())
//!     .rule("email", Email::new())
//!     .rule("email", Unique::new("users", "email").connection(slot));
//!
//! Transaction::run(cx, &conn, |tx| async move {
//!     Validator::new().validate(cx, &user, &rules).await
//! })
//! .await;
//! ```

pub use modelkit_core;
pub use modelkit_query;
pub use modelkit_session;
pub use modelkit_validate;

pub use modelkit_core::{
    Adapter, BoxFuture, Capability, Connection, Cx, Dialect, DynamicModel, Error, IsolationLevel,
    Model, Outcome, QueryResult, Row, ValidationError, Value,
};
pub use modelkit_query::{Operator, Query, Statement};
pub use modelkit_session::{Transaction, TransactionOptions};
pub use modelkit_validate::{RuleMap, Validator};

/// Everything needed to declare rules, run queries and manage transactions.
pub mod prelude {
    pub use modelkit_core::{
        Adapter, BoxFuture, Capability, Connection, Cx, Dialect, DynamicModel, Error,
        IsolationLevel, Model, Outcome, QueryResult, Row, ValidationError, Value,
    };
    pub use modelkit_query::{Operator, Query, Statement};
    pub use modelkit_session::{Transaction, TransactionOptions, TxState};
    pub use modelkit_validate::{
        ArrayRule, ConnectionSlot, ConnectionSource, Custom, DateRule, Email, Length, MaxLength,
        MinLength, Pattern, Range, Required, Rule, RuleFuture, RuleMap, SyncRule, Unique, Url,
        ValidationResult, Validator,
    };
}
