//! Error types shared by every modelkit crate.
//!
//! The taxonomy mirrors how failures are handled upstream:
//!
//! - [`Error::Validation`] carries one aggregated [`ValidationError`] per
//!   validation pass. It is data-driven and expected.
//! - [`Error::Capability`] means an adapter lacks a primitive (transactions,
//!   document `find`). It indicates misconfiguration and is never aggregated.
//! - [`Error::Connection`] means no established connection was available.
//! - [`Error::Transaction`] is an illegal transaction state transition.
//! - [`Error::Query`] is a failure reported by the backend itself.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// The primary error type for modelkit operations.
#[derive(Debug)]
pub enum Error {
    /// One or more fields failed validation.
    Validation(ValidationError),
    /// The adapter does not support a required operation.
    Capability(CapabilityError),
    /// No established connection when one was required.
    Connection(ConnectionError),
    /// Illegal transaction state transition.
    Transaction(TransactionError),
    /// Backend error raised while executing a command.
    Query(QueryError),
    /// Free-form error.
    Custom(String),
}

/// Result type alias for synchronous modelkit operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a connection error of the given kind.
    pub fn connection(kind: ConnectionErrorKind, message: impl Into<String>) -> Self {
        Error::Connection(ConnectionError {
            kind,
            message: message.into(),
            source: None,
        })
    }

    /// Shorthand for a capability error.
    pub fn capability(capability: Capability, dialect: impl Into<String>) -> Self {
        let dialect = dialect.into();
        Error::Capability(CapabilityError {
            message: format!(
                "Adapter for dialect '{}' does not support {}",
                dialect,
                capability.describe()
            ),
            capability,
            dialect,
        })
    }

    /// Shorthand for a query error without a source.
    pub fn query(kind: QueryErrorKind, message: impl Into<String>) -> Self {
        Error::Query(QueryError {
            kind,
            message: message.into(),
            command: None,
            source: None,
        })
    }

    /// Whether this is an aggregated validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Borrow the aggregated validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation(e) => write!(f, "{e}"),
            Error::Capability(e) => write!(f, "{e}"),
            Error::Connection(e) => write!(f, "{e}"),
            Error::Transaction(e) => write!(f, "{e}"),
            Error::Query(e) => write!(f, "{e}"),
            Error::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connection(e) => e
                .source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::Query(e) => e
                .source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err)
    }
}

impl From<TransactionError> for Error {
    fn from(err: TransactionError) -> Self {
        Error::Transaction(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Query(QueryError {
            kind: QueryErrorKind::Database,
            message: format!("JSON encoding failed: {err}"),
            command: None,
            source: Some(Box::new(err)),
        })
    }
}

// ============================================================================
// Capability
// ============================================================================

/// An optional adapter primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `begin_transaction` / `commit` / `rollback`.
    Transactions,
    /// Document-store `find` with a filter document.
    Find,
}

impl Capability {
    /// Human-readable description used in error messages.
    pub const fn describe(self) -> &'static str {
        match self {
            Capability::Transactions => "transactions",
            Capability::Find => "document find queries",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CapabilityError {
    pub capability: Capability,
    /// Dialect name reported by the adapter.
    pub dialect: String,
    pub message: String,
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capability error: {}", self.message)
    }
}

// ============================================================================
// Connection
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// The connection exists but is not established.
    NotConnected,
    /// The connection has no adapter attached.
    NoAdapter,
    /// Establishing the connection failed.
    Connect,
    /// The backend went away mid-operation.
    Disconnected,
}

#[derive(Debug)]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Connection error: {}", self.message)
    }
}

// ============================================================================
// Transaction
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionErrorKind {
    /// `commit` on a committed transaction.
    AlreadyCommitted,
    /// `commit` on a rolled back transaction.
    AlreadyRolledBack,
    /// `rollback` on a committed transaction.
    RollbackAfterCommit,
}

#[derive(Debug, Clone)]
pub struct TransactionError {
    pub kind: TransactionErrorKind,
    pub message: String,
}

impl TransactionError {
    pub fn new(kind: TransactionErrorKind) -> Self {
        let message = match kind {
            TransactionErrorKind::AlreadyCommitted => "Transaction already committed",
            TransactionErrorKind::AlreadyRolledBack => "Cannot commit a rolled back transaction",
            TransactionErrorKind::RollbackAfterCommit => "Cannot rollback committed transaction",
        };
        Self {
            kind,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

// ============================================================================
// Query
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Malformed command or predicate.
    Syntax,
    /// Generic backend failure.
    Database,
    /// Constraint violation reported by the backend.
    Constraint,
    /// The command is not expressible in the target dialect.
    Unsupported,
}

#[derive(Debug)]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub message: String,
    /// The rendered command, when known.
    pub command: Option<String>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.command {
            Some(command) => write!(f, "Query error: {} (command: {})", self.message, command),
            None => write!(f, "Query error: {}", self.message),
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Aggregated validation failure for one validation pass.
///
/// Maps field names to the messages produced by that field's failing rules,
/// in rule evaluation order. Fields keep the order in which they first
/// failed. A `ValidationError` always holds at least one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    fields: Vec<(String, Vec<String>)>,
}

impl ValidationError {
    /// Build an error from per-field messages.
    ///
    /// Fields with no messages are dropped. Returns `None` when nothing is
    /// left, since an empty validation error is not representable.
    pub fn from_fields<I, F, M>(fields: I) -> Option<Self>
    where
        I: IntoIterator<Item = (F, M)>,
        F: Into<String>,
        M: IntoIterator<Item = String>,
    {
        let mut collected: Vec<(String, Vec<String>)> = Vec::new();
        for (field, messages) in fields {
            let messages: Vec<String> = messages.into_iter().collect();
            if messages.is_empty() {
                continue;
            }
            let field = field.into();
            match collected.iter_mut().find(|(name, _)| *name == field) {
                Some((_, existing)) => existing.extend(messages),
                None => collected.push((field, messages)),
            }
        }
        if collected.is_empty() {
            None
        } else {
            Some(Self { fields: collected })
        }
    }

    /// Single-field, single-message error.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fields: vec![(field.into(), vec![message.into()])],
        }
    }

    /// All failing fields with their messages, in order.
    pub fn errors(&self) -> &[(String, Vec<String>)] {
        &self.fields
    }

    /// Messages recorded for one field; empty when the field passed.
    pub fn field_errors(&self, field: &str) -> &[String] {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map_or(&[], |(_, messages)| messages.as_slice())
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == field)
    }

    /// Names of the failing fields.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of messages across all fields.
    pub fn message_count(&self) -> usize {
        self.fields.iter().map(|(_, m)| m.len()).sum()
    }

    /// Combined, human-readable message.
    pub fn message(&self) -> String {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect();
        format!("Validation failed: {}", parts.join("; "))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ValidationError {}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, messages) in &self.fields {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}
