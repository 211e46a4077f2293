//! Connection handle shared by queries, transactions and storage-backed rules.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use asupersync::{Cx, Outcome};

use crate::adapter::Adapter;
use crate::dialect::Dialect;
use crate::error::{ConnectionErrorKind, Error};

/// Shared, cloneable handle to one adapter session.
///
/// Clones share the adapter and the connectivity flag, so a connection can
/// be handed to several queries and transactions at once. Only one
/// transaction should be active on it at a time; serializing them is the
/// adapter's job.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

struct ConnectionInner {
    adapter: Option<Arc<dyn Adapter>>,
    connected: AtomicBool,
}

impl Connection {
    /// Wrap an adapter. The connection starts out not established.
    pub fn new<A: Adapter + 'static>(adapter: A) -> Self {
        Self::from_adapter(Arc::new(adapter))
    }

    pub fn from_adapter(adapter: Arc<dyn Adapter>) -> Self {
        Self {
            inner: Arc::new(ConnectionInner {
                adapter: Some(adapter),
                connected: AtomicBool::new(false),
            }),
        }
    }

    /// A connection with no adapter attached.
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(ConnectionInner {
                adapter: None,
                connected: AtomicBool::new(false),
            }),
        }
    }

    /// Establish the adapter session and mark the connection as connected.
    #[tracing::instrument(level = "debug", skip(self, cx))]
    pub async fn connect(&self, cx: &Cx) -> Outcome<(), Error> {
        let Some(adapter) = self.adapter() else {
            return Outcome::Err(no_adapter());
        };

        tracing::info!(dialect = adapter.dialect().name(), "Connecting");

        match adapter.connect(cx).await {
            Outcome::Ok(()) => {
                self.inner.connected.store(true, Ordering::Release);
                Outcome::Ok(())
            }
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    /// Close the adapter session. Closing an unestablished connection is a no-op.
    #[tracing::instrument(level = "debug", skip(self, cx))]
    pub async fn close(&self, cx: &Cx) -> Outcome<(), Error> {
        let Some(adapter) = self.adapter() else {
            return Outcome::Ok(());
        };
        if !self.is_connected() {
            return Outcome::Ok(());
        }

        tracing::info!(dialect = adapter.dialect().name(), "Closing connection");

        let result = adapter.close(cx).await;
        self.inner.connected.store(false, Ordering::Release);
        result
    }

    /// Set the connectivity flag directly, for adapters whose session is
    /// managed elsewhere (for example, handed out already open by a pool).
    pub fn mark_connected(&self, connected: bool) {
        self.inner.connected.store(connected, Ordering::Release);
    }

    pub fn is_connected(&self) -> bool {
        self.inner.adapter.is_some() && self.inner.connected.load(Ordering::Acquire)
    }

    pub fn adapter(&self) -> Option<&Arc<dyn Adapter>> {
        self.inner.adapter.as_ref()
    }

    /// Dialect reported by the adapter right now; `None` without an adapter.
    pub fn dialect(&self) -> Option<Dialect> {
        self.inner.adapter.as_ref().map(|a| a.dialect())
    }

    /// The adapter, provided the connection is established.
    pub fn established_adapter(&self) -> Result<&Arc<dyn Adapter>, Error> {
        let Some(adapter) = self.adapter() else {
            return Err(no_adapter());
        };
        if !self.inner.connected.load(Ordering::Acquire) {
            return Err(Error::connection(
                ConnectionErrorKind::NotConnected,
                format!("{} connection is not established", adapter.dialect()),
            ));
        }
        Ok(adapter)
    }

    /// Whether two handles share the same underlying session.
    pub fn same_as(&self, other: &Connection) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("dialect", &self.dialect())
            .field("connected", &self.is_connected())
            .finish()
    }
}

fn no_adapter() -> Error {
    Error::connection(
        ConnectionErrorKind::NoAdapter,
        "No adapter is attached to this connection",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::BoxFuture;
    use crate::row::QueryResult;
    use crate::value::Value;

    #[derive(Debug)]
    struct NullAdapter;

    impl Adapter for NullAdapter {
        fn dialect(&self) -> Dialect {
            Dialect::Sqlite
        }

        fn query<'a>(
            &'a self,
            _cx: &'a Cx,
            _command: &'a str,
            _params: &'a [Value],
        ) -> BoxFuture<'a, Outcome<QueryResult, Error>> {
            Box::pin(async { Outcome::Ok(QueryResult::default()) })
        }
    }

    #[test]
    fn test_new_connection_is_not_established() {
        let conn = Connection::new(NullAdapter);
        assert!(!conn.is_connected());
        assert_eq!(conn.dialect(), Some(Dialect::Sqlite));
        assert!(matches!(
            conn.established_adapter(),
            Err(Error::Connection(ref e)) if e.kind == ConnectionErrorKind::NotConnected
        ));
    }

    #[test]
    fn test_mark_connected_is_shared_by_clones() {
        let conn = Connection::new(NullAdapter);
        let clone = conn.clone();
        conn.mark_connected(true);
        assert!(clone.is_connected());
        assert!(clone.same_as(&conn));
        assert!(clone.established_adapter().is_ok());
    }

    #[test]
    fn test_empty_connection() {
        let conn = Connection::empty();
        conn.mark_connected(true);
        assert!(!conn.is_connected());
        assert_eq!(conn.dialect(), None);
        assert!(matches!(
            conn.established_adapter(),
            Err(Error::Connection(ref e)) if e.kind == ConnectionErrorKind::NoAdapter
        ));
    }

    /// Refuses to connect and reports the backend dropping on close.
    #[derive(Debug)]
    struct FlakyAdapter;

    impl Adapter for FlakyAdapter {
        fn dialect(&self) -> Dialect {
            Dialect::Postgres
        }

        fn connect<'a>(&'a self, _cx: &'a Cx) -> BoxFuture<'a, Outcome<(), Error>> {
            Box::pin(async {
                Outcome::Err(Error::connection(
                    ConnectionErrorKind::Connect,
                    "connection refused",
                ))
            })
        }

        fn close<'a>(&'a self, _cx: &'a Cx) -> BoxFuture<'a, Outcome<(), Error>> {
            Box::pin(async {
                Outcome::Err(Error::connection(
                    ConnectionErrorKind::Disconnected,
                    "server closed the connection",
                ))
            })
        }

        fn query<'a>(
            &'a self,
            _cx: &'a Cx,
            _command: &'a str,
            _params: &'a [Value],
        ) -> BoxFuture<'a, Outcome<QueryResult, Error>> {
            Box::pin(async { Outcome::Ok(QueryResult::default()) })
        }
    }

    fn connection_kind(outcome: Outcome<(), Error>) -> ConnectionErrorKind {
        match outcome {
            Outcome::Err(Error::Connection(e)) => e.kind,
            _ => panic!("expected a connection error"),
        }
    }

    #[test]
    fn test_failed_connect_leaves_connection_unestablished() {
        let rt = asupersync::runtime::RuntimeBuilder::current_thread()
            .build()
            .expect("create asupersync runtime");
        let cx = Cx::for_testing();
        let conn = Connection::new(FlakyAdapter);

        let kind = rt.block_on(async { connection_kind(conn.connect(&cx).await) });
        assert_eq!(kind, ConnectionErrorKind::Connect);
        assert!(!conn.is_connected());
    }

    #[test]
    fn test_close_clears_the_flag_even_when_the_backend_fails() {
        let rt = asupersync::runtime::RuntimeBuilder::current_thread()
            .build()
            .expect("create asupersync runtime");
        let cx = Cx::for_testing();
        let conn = Connection::new(FlakyAdapter);
        conn.mark_connected(true);

        let kind = rt.block_on(async { connection_kind(conn.close(&cx).await) });
        assert_eq!(kind, ConnectionErrorKind::Disconnected);
        assert!(!conn.is_connected());
    }

    #[test]
    fn test_connect_without_adapter() {
        let rt = asupersync::runtime::RuntimeBuilder::current_thread()
            .build()
            .expect("create asupersync runtime");
        let cx = Cx::for_testing();
        let conn = Connection::empty();

        let kind = rt.block_on(async { connection_kind(conn.connect(&cx).await) });
        assert_eq!(kind, ConnectionErrorKind::NoAdapter);
    }
}
