//! Where storage-backed rules get their connection from.
//!
//! A rule is handed a [`ConnectionSource`] when it is built. The source is
//! asked for a connection on every validation call, so a [`ConnectionSlot`]
//! can be filled, swapped or emptied after the rule exists.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use modelkit_core::Connection;

/// Supplies the connection a rule should query.
pub trait ConnectionSource: Send + Sync + fmt::Debug {
    /// The connection to use right now, if any.
    fn resolve(&self) -> Option<Connection>;
}

impl ConnectionSource for Connection {
    fn resolve(&self) -> Option<Connection> {
        Some(self.clone())
    }
}

impl ConnectionSource for Option<Connection> {
    fn resolve(&self) -> Option<Connection> {
        self.clone()
    }
}

/// A shared, resettable holder for a connection.
///
/// Clones share the same slot. Hosts typically keep one slot per database
/// and give it to every rule that needs that database.
#[derive(Clone, Default)]
pub struct ConnectionSlot {
    inner: Arc<RwLock<Option<Connection>>>,
}

impl ConnectionSlot {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(connection: Connection) -> Self {
        let slot = Self::new();
        slot.set(connection);
        slot
    }

    /// Replace the held connection.
    pub fn set(&self, connection: Connection) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(connection);
    }

    /// Empty the slot, returning what it held.
    pub fn clear(&self) -> Option<Connection> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn get(&self) -> Option<Connection> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_set(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl ConnectionSource for ConnectionSlot {
    fn resolve(&self) -> Option<Connection> {
        self.get()
    }
}

impl fmt::Debug for ConnectionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSlot")
            .field("connection", &self.get())
            .finish()
    }
}
