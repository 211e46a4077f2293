//! Transaction handle and scoped-run helper.

use std::any::Any;
use std::fmt;
use std::future::{Future, poll_fn};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::task::Poll;

use asupersync::{Cx, Outcome, PanicPayload};
use modelkit_core::{
    Adapter, Capability, Connection, Error, IsolationLevel, TransactionError, TransactionErrorKind,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Options and State
// ============================================================================

/// Options passed to the adapter when a transaction begins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionOptions {
    /// Isolation level; `None` leaves the backend default in place.
    pub isolation: Option<IsolationLevel>,
}

impl TransactionOptions {
    pub fn isolation(mut self, level: IsolationLevel) -> Self {
        self.isolation = Some(level);
        self
    }
}

/// Lifecycle state of a transaction. Terminal states are never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxState {
    Active,
    Committed,
    RolledBack,
}

impl TxState {
    const fn to_u8(self) -> u8 {
        match self {
            TxState::Active => 0,
            TxState::Committed => 1,
            TxState::RolledBack => 2,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => TxState::Committed,
            2 => TxState::RolledBack,
            _ => TxState::Active,
        }
    }
}

// ============================================================================
// Transaction
// ============================================================================

/// An open transaction on one connection.
///
/// Clones are handles to the same transaction: committing through one is
/// visible through all of them. `committed` and `rolled_back` are never both
/// true.
#[derive(Clone)]
pub struct Transaction {
    connection: Connection,
    adapter: Arc<dyn Adapter>,
    options: TransactionOptions,
    state: Arc<AtomicU8>,
}

impl Transaction {
    /// Begin a transaction with default options.
    pub async fn begin(cx: &Cx, connection: &Connection) -> Outcome<Self, Error> {
        Self::begin_with(cx, connection, TransactionOptions::default()).await
    }

    /// Begin a transaction.
    ///
    /// Fails with a connection error when the connection has no adapter or is
    /// not established, and with a capability error when the adapter has no
    /// transaction primitives.
    #[tracing::instrument(level = "debug", skip(cx, connection))]
    pub async fn begin_with(
        cx: &Cx,
        connection: &Connection,
        options: TransactionOptions,
    ) -> Outcome<Self, Error> {
        let adapter = match connection.established_adapter() {
            Ok(adapter) => Arc::clone(adapter),
            Err(e) => return Outcome::Err(e),
        };
        let dialect = adapter.dialect();
        if !adapter.supports(Capability::Transactions) {
            return Outcome::Err(Error::capability(Capability::Transactions, dialect.name()));
        }

        tracing::info!(
            dialect = dialect.name(),
            isolation = ?options.isolation,
            "Beginning transaction"
        );

        match adapter.begin_transaction(cx, options.isolation).await {
            Outcome::Ok(()) => Outcome::Ok(Self {
                connection: connection.clone(),
                adapter,
                options,
                state: Arc::new(AtomicU8::new(TxState::Active.to_u8())),
            }),
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    /// Commit the transaction.
    #[tracing::instrument(level = "debug", skip(self, cx))]
    pub async fn commit(&self, cx: &Cx) -> Outcome<(), Error> {
        match self.state() {
            TxState::Committed => {
                return Outcome::Err(
                    TransactionError::new(TransactionErrorKind::AlreadyCommitted).into(),
                );
            }
            TxState::RolledBack => {
                return Outcome::Err(
                    TransactionError::new(TransactionErrorKind::AlreadyRolledBack).into(),
                );
            }
            TxState::Active => {}
        }

        tracing::info!("Committing transaction");

        match self.adapter.commit(cx).await {
            Outcome::Ok(()) => {
                self.set_state(TxState::Committed);
                Outcome::Ok(())
            }
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    /// Roll the transaction back. Rolling back twice is a no-op.
    #[tracing::instrument(level = "debug", skip(self, cx))]
    pub async fn rollback(&self, cx: &Cx) -> Outcome<(), Error> {
        match self.state() {
            TxState::Committed => {
                return Outcome::Err(
                    TransactionError::new(TransactionErrorKind::RollbackAfterCommit).into(),
                );
            }
            TxState::RolledBack => return Outcome::Ok(()),
            TxState::Active => {}
        }

        tracing::info!("Rolling back transaction");

        match self.adapter.rollback(cx).await {
            Outcome::Ok(()) => {
                self.set_state(TxState::RolledBack);
                Outcome::Ok(())
            }
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    pub fn state(&self) -> TxState {
        TxState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_active(&self) -> bool {
        self.state() == TxState::Active
    }

    pub fn is_committed(&self) -> bool {
        self.state() == TxState::Committed
    }

    pub fn is_rolled_back(&self) -> bool {
        self.state() == TxState::RolledBack
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn options(&self) -> &TransactionOptions {
        &self.options
    }

    fn set_state(&self, state: TxState) {
        self.state.store(state.to_u8(), Ordering::Release);
    }

    // ========================================================================
    // Scoped Execution
    // ========================================================================

    /// Run `work` inside a transaction with default options.
    ///
    /// See [`Transaction::run_with`].
    pub async fn run<T, F, Fut>(cx: &Cx, connection: &Connection, work: F) -> Outcome<T, Error>
    where
        F: FnOnce(Transaction) -> Fut,
        Fut: Future<Output = Outcome<T, Error>>,
    {
        Self::run_with(cx, connection, TransactionOptions::default(), work).await
    }

    /// Begin a transaction, run `work` with a handle to it, and commit if the
    /// work succeeds.
    ///
    /// If the work or the commit fails, the transaction is rolled back while
    /// still active and the original failure is returned. A failed rollback is
    /// logged and never replaces the original error. If the work itself ends
    /// the transaction, its value is returned as-is.
    ///
    /// A panic raised while running the work is caught, the transaction is
    /// rolled back, and the panic is returned as [`Outcome::Panicked`].
    pub async fn run_with<T, F, Fut>(
        cx: &Cx,
        connection: &Connection,
        options: TransactionOptions,
        work: F,
    ) -> Outcome<T, Error>
    where
        F: FnOnce(Transaction) -> Fut,
        Fut: Future<Output = Outcome<T, Error>>,
    {
        let tx = match Self::begin_with(cx, connection, options).await {
            Outcome::Ok(tx) => tx,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        match run_catching(work, tx.clone()).await {
            Outcome::Ok(value) => {
                if !tx.is_active() {
                    return Outcome::Ok(value);
                }
                match tx.commit(cx).await {
                    Outcome::Ok(()) => Outcome::Ok(value),
                    Outcome::Err(e) => {
                        tx.rollback_after_failure(cx).await;
                        Outcome::Err(e)
                    }
                    Outcome::Cancelled(r) => {
                        tx.rollback_after_failure(cx).await;
                        Outcome::Cancelled(r)
                    }
                    Outcome::Panicked(p) => {
                        tx.rollback_after_failure(cx).await;
                        Outcome::Panicked(p)
                    }
                }
            }
            failed => {
                tx.rollback_after_failure(cx).await;
                failed
            }
        }
    }

    async fn rollback_after_failure(&self, cx: &Cx) {
        if !self.is_active() {
            return;
        }
        match self.rollback(cx).await {
            Outcome::Ok(()) => tracing::debug!("Rolled back after failed work"),
            Outcome::Err(e) => tracing::warn!(error = %e, "Rollback failed during cleanup"),
            Outcome::Cancelled(r) => {
                tracing::warn!(reason = ?r, "Rollback cancelled during cleanup");
            }
            Outcome::Panicked(p) => {
                tracing::warn!(panic = ?p, "Rollback panicked during cleanup");
            }
        }
    }
}

/// Drive `work` to completion, turning an unwinding panic into
/// [`Outcome::Panicked`].
async fn run_catching<T, F, Fut>(work: F, tx: Transaction) -> Outcome<T, Error>
where
    F: FnOnce(Transaction) -> Fut,
    Fut: Future<Output = Outcome<T, Error>>,
{
    let mut future = match catch_unwind(AssertUnwindSafe(|| Box::pin(work(tx)))) {
        Ok(future) => future,
        Err(payload) => return Outcome::Panicked(panic_payload(payload.as_ref())),
    };
    poll_fn(|task| match catch_unwind(AssertUnwindSafe(|| future.as_mut().poll(task))) {
        Ok(poll) => poll,
        Err(payload) => Poll::Ready(Outcome::Panicked(panic_payload(payload.as_ref()))),
    })
    .await
}

fn panic_payload(payload: &(dyn Any + Send)) -> PanicPayload {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "transaction work panicked".to_string());
    tracing::warn!(panic = %message, "Transaction work panicked");
    PanicPayload::new(message)
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("dialect", &self.adapter.dialect())
            .field("state", &self.state())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
