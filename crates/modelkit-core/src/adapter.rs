//! The per-dialect driver contract.
//!
//! An [`Adapter`] is the only thing that talks to a backend. modelkit never
//! implements one for a real engine; drivers live outside this workspace and
//! plug in through this trait. Every method that may suspend returns a boxed
//! future so adapters can be held as `Arc<dyn Adapter>`.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use asupersync::{Cx, Outcome};
use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::{Capability, Error};
use crate::row::QueryResult;
use crate::value::Value;

/// A `Send` future boxed for use behind trait objects.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Transaction isolation level passed to the adapter's begin primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    ReadUncommitted,
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub const fn as_sql(self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

/// Per-dialect driver.
///
/// Only `dialect` and `query` are required. Optional primitives report their
/// availability through [`Adapter::supports`] and default to returning
/// [`Error::Capability`].
pub trait Adapter: Send + Sync + fmt::Debug {
    /// Dialect of the backend this adapter talks to.
    fn dialect(&self) -> Dialect;

    /// Whether an optional primitive is implemented.
    fn supports(&self, capability: Capability) -> bool {
        let _ = capability;
        false
    }

    /// Establish the backend session.
    fn connect<'a>(&'a self, cx: &'a Cx) -> BoxFuture<'a, Outcome<(), Error>> {
        let _ = cx;
        Box::pin(async { Outcome::Ok(()) })
    }

    /// Tear down the backend session.
    fn close<'a>(&'a self, cx: &'a Cx) -> BoxFuture<'a, Outcome<(), Error>> {
        let _ = cx;
        Box::pin(async { Outcome::Ok(()) })
    }

    /// Run a raw command with bound parameters.
    fn query<'a>(
        &'a self,
        cx: &'a Cx,
        command: &'a str,
        params: &'a [Value],
    ) -> BoxFuture<'a, Outcome<QueryResult, Error>>;

    /// Document-store lookup: every document in `collection` matching
    /// `filter`, capped at `limit` documents when given.
    fn find<'a>(
        &'a self,
        cx: &'a Cx,
        collection: &'a str,
        filter: &'a serde_json::Value,
        limit: Option<u64>,
    ) -> BoxFuture<'a, Outcome<QueryResult, Error>> {
        let _ = (cx, collection, filter, limit);
        let err = Error::capability(Capability::Find, self.dialect().name());
        Box::pin(async move { Outcome::Err(err) })
    }

    fn begin_transaction<'a>(
        &'a self,
        cx: &'a Cx,
        isolation: Option<IsolationLevel>,
    ) -> BoxFuture<'a, Outcome<(), Error>> {
        let _ = (cx, isolation);
        let err = Error::capability(Capability::Transactions, self.dialect().name());
        Box::pin(async move { Outcome::Err(err) })
    }

    fn commit<'a>(&'a self, cx: &'a Cx) -> BoxFuture<'a, Outcome<(), Error>> {
        let _ = cx;
        let err = Error::capability(Capability::Transactions, self.dialect().name());
        Box::pin(async move { Outcome::Err(err) })
    }

    fn rollback<'a>(&'a self, cx: &'a Cx) -> BoxFuture<'a, Outcome<(), Error>> {
        let _ = cx;
        let err = Error::capability(Capability::Transactions, self.dialect().name());
        Box::pin(async move { Outcome::Err(err) })
    }
}
