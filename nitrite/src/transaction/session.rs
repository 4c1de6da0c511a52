use super::nitrite_transaction::NitriteTransaction;
use crate::common::LockRegistry;
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use crate::nitrite::Nitrite;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// A session represents a transactional context for database operations.
///
/// Manages multiple transactions within a single session, providing isolated transaction
/// contexts for concurrent or sequential operations. Must be explicitly closed to release
/// resources and roll back any uncommitted transactions.
///
/// # Purpose
/// Sessions encapsulate a database connection's transactional context, enabling creation
/// and management of multiple independent transactions. Each session maintains its own
/// state and transaction registry.
///
/// # Characteristics
/// - **Unique ID**: Each session has a unique UUID identifier
/// - **Active State**: Tracks whether the session is open or closed via atomic flag
/// - **Transaction Registry**: Maintains HashMap of active transactions
/// - **Thread-Safe**: All internal state protected by Arc and Mutex
/// - **Auto-Cleanup**: Calls `close()` on drop to release resources
/// - **Idempotent Close**: Can be closed multiple times without error
///
/// # Usage
/// Create a session from a Nitrite database instance:
/// ```ignore
/// let session = Session::new(db, lock_registry);
/// let txn = session.begin_transaction()?;
/// txn.commit()?;
/// session.close()?;
/// ```
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Creates a new session.
    ///
    /// # Arguments
    /// * `db` - Reference to the Nitrite database
    /// * `lock_registry` - Registry for coordinating locks across transaction contexts
    ///
    /// # Returns
    /// A new `Session` initialized with a unique ID and active state
    ///
    /// The session is created in an active state and can immediately be used to
    /// begin transactions.
    pub fn new(db: Nitrite, lock_registry: LockRegistry) -> Self {
        Session {
            inner: Arc::new(SessionInner::new(db, lock_registry)),
        }
    }

    /// Gets the session ID.
    ///
    /// # Returns
    /// A string slice containing the unique UUID of this session
    pub fn id(&self) -> &str {
        self.inner.id()
    }

    /// Checks if this session is active.
    ///
    /// # Returns
    /// `true` if the session is open and can accept new transactions, `false` if closed
    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    /// Begins a new transaction in this session.
    ///
    /// # Returns
    /// * `Ok(NitriteTransaction)` - A new transaction initialized in Active state
    /// * `Err(NitriteError)` - If the session is closed or transaction creation fails
    ///
    /// The transaction is tracked in the session's active transaction registry and will
    /// be rolled back when the session is closed if not explicitly committed.
    pub fn begin_transaction(&self) -> NitriteResult<NitriteTransaction> {
        self.inner.begin_transaction()
    }

    /// Lists all active transaction IDs in this session.
    ///
    /// # Returns
    /// Vector of transaction ID strings currently tracked by this session
    pub fn active_transactions(&self) -> Vec<String> {
        self.inner.active_transactions()
    }

    /// Closes the session and releases all resources.
    ///
    /// # Returns
    /// * `Ok(())` - If session closed successfully
    /// * `Err(NitriteError)` - If session was already closed (unlikely, as close is idempotent)
    ///
    /// Transitions the session to inactive state using atomic compare-exchange operation.
    /// Rolls back all active transactions, clearing the transaction registry.
    /// Idempotent: calling close multiple times is safe and returns Ok.
    pub fn close(&self) -> NitriteResult<()> {
        self.inner.close()
    }
}

/// Inner session implementation with transaction management.
///
/// Contains the actual session state and transaction tracking logic. Accessed through
/// the `Session` wrapper type which provides Arc-based shared ownership.
///
/// # Purpose
/// Implements the core session functionality including transaction creation, tracking,
/// and lifecycle management. Maintains isolation between transactions and coordinates
/// resource cleanup on session close.
///
/// # Characteristics
/// - **Session ID**: Unique UUID assigned at creation
/// - **Active Flag**: Atomic boolean tracking session state (true = open, false = closed)
/// - **Transaction Map**: Mutex-protected HashMap<String, NitriteTransaction> for tracking
/// - **Database Reference**: Shared Arc to the parent Nitrite database
/// - **Lock Registry**: Shared registry for coordinating locks across transactions
/// - **Idempotent Operations**: Close operation can be called multiple times safely
struct SessionInner {
    id: String,
    active: Arc<AtomicBool>,
    transactions: Arc<Mutex<HashMap<String, NitriteTransaction>>>,
    db: Nitrite,
    lock_registry: LockRegistry,
}

impl SessionInner {
    /// Creates a new session inner implementation.
    ///
    /// # Arguments
    /// * `db` - Reference to the Nitrite database
    /// * `lock_registry` - Registry for coordinating locks across transaction contexts
    ///
    /// # Returns
    /// A new `SessionInner` with unique ID and active state initialized to true
    pub fn new(db: Nitrite, lock_registry: LockRegistry) -> Self {
        SessionInner {
            id: Uuid::new_v4().to_string(),
            active: Arc::new(AtomicBool::new(true)),
            transactions: Arc::new(Mutex::new(HashMap::new())),
            db,
            lock_registry,
        }
    }

    /// Gets the session ID.
    ///
    /// # Returns
    /// A string slice containing the unique UUID of this session
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Checks if this session is active.
    ///
    /// # Returns
    /// `true` if the session is open and can accept new transactions, `false` if closed
    ///
    /// Uses SeqCst (sequential consistency) atomic ordering to ensure proper synchronization
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Begins a new transaction in this session.
    ///
    /// # Returns
    /// * `Ok(NitriteTransaction)` - A new transaction initialized in Active state
    /// * `Err(NitriteError)` - If the session is closed
    ///
    /// Creates a new transaction and registers it in the session's transaction map.
    /// Multiple transactions can exist simultaneously within a session, each with their
    /// own isolated transactional context.
    pub fn begin_transaction(&self) -> NitriteResult<NitriteTransaction> {
        self.check_active()?;

        let tx = NitriteTransaction::new(self.db.clone(), self.lock_registry.clone())?;
        let tx_id = tx.id().to_string();

        self.transactions.lock().insert(tx_id, tx.clone());

        Ok(tx)
    }

    /// Lists all active transaction IDs in this session.
    ///
    /// # Returns
    /// Vector of transaction ID strings currently tracked by this session
    ///
    /// Acquires lock on transaction map to read current state. Committed or rolled back
    /// transactions are automatically removed from this list.
    pub fn active_transactions(&self) -> Vec<String> {
        self.transactions.lock().keys().cloned().collect()
    }

    /// Closes the session and releases all resources.
    ///
    /// # Returns
    /// * `Ok(())` - Always returns Ok, even if already closed (idempotent)
    ///
    /// Transitions the session to inactive state using atomic compare-exchange operation
    /// with SeqCst ordering. Rolls back all active transactions by calling `rollback()`
    /// on each, then clears the transaction registry.
    ///
    /// If the session is already closed, the compare-exchange fails and returns early.
    pub fn close(&self) -> NitriteResult<()> {
        if self
            .active
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst).is_err()
        {
            // Already closed
            return Ok(());
        }

        let mut txs = self.transactions.lock();
        for (_, tx) in txs.drain() {
            // Rollback any uncommitted transaction
            let _ = tx.rollback();
        }

        Ok(())
    }

    /// Checks if session is active and returns an error if not.
    ///
    /// # Returns
    /// * `Ok(())` - If session is active
    /// * `Err(NitriteError)` - If session is closed with error kind `InvalidOperation`
    ///
    /// Used internally by `begin_transaction()` to validate session state before creating
    /// new transactions.
    fn check_active(&self) -> NitriteResult<()> {
        if !self.is_active() {
            return Err(NitriteError::new(
                "Session is closed",
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Best-effort close - ignore errors
        let _ = self.close();
    }
}
