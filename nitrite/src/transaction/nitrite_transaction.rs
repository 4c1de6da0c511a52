use super::core::{JournalEntry, TransactionContext, TransactionState, UndoEntry};
use super::transaction_store::TransactionStore;
use crate::collection::operation::CollectionOperations;
use crate::collection::{NitriteCollection, NitriteCollectionProvider};
use crate::common::{
    repository_name_by_type, Convertible, LockRegistry, NitriteEventBus, NitriteModule,
    NitritePlugin, PluginRegistrar,
};
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use crate::nitrite::Nitrite;
use crate::nitrite_config::NitriteConfig;
use crate::repository::{NitriteEntity, ObjectRepository, RepositoryOperations};
use crate::store::NitriteStore;
use crate::transaction::transactional_collection::TransactionalCollection;
use crate::transaction::transactional_repository::TransactionalRepository;
use parking_lot::Mutex;

/// A wrapper module that provides a pre-created store
struct TransactionStoreModule {
    store: NitriteStore,
}

impl TransactionStoreModule {
    fn new(store: NitriteStore) -> Self {
        TransactionStoreModule { store }
    }
}

impl NitriteModule for TransactionStoreModule {
    fn plugins(&self) -> NitriteResult<Vec<NitritePlugin>> {
        Ok(vec![self.store.as_plugin()])
    }

    fn load(&self, plugin_registrar: &PluginRegistrar) -> NitriteResult<()> {
        plugin_registrar.register_store_plugin(self.store.clone())
    }
}
/// Nitrite transaction implementation
///
/// Provides transaction coordination with support for:
/// - Multi-collection operations
/// - Two-phase commit
/// - Automatic rollback on failure
/// - ACID guarantees
use std::collections::HashMap;
use std::ops::DerefMut;
use std::sync::Arc;
use uuid::Uuid;

/// A Nitrite transaction coordinator.
///
/// Manages ACID transaction semantics across multiple collections and repositories with
/// two-phase commit protocol implementation.
///
/// # Purpose
/// Provides atomic, consistent, isolated, and durable operations across multiple data access
/// paths within a single transaction context. Ensures that either all operations commit
/// successfully or all rollback to maintain data consistency.
///
/// # Characteristics
/// - **Transaction ID**: Each transaction has a unique UUID identifier
/// - **State Machine**: Transitions through Active → PartiallyCommitted → Committed/Failed states
/// - **Multi-Collection**: Supports operations across multiple named collections
/// - **Two-Phase Commit**: First executes all commits, then records undos; rolls back on failure
/// - **Automatic Cleanup**: Calls `close()` on drop to release resources
/// - **Thread-Safe**: All internal state protected by Arc<Mutex<>>
/// - **Lock Coordination**: Uses LockRegistry for proper lock ordering
///
/// # Usage
/// Obtain a transaction from a Nitrite database instance:
/// ```ignore
/// let txn = db.begin_transaction()?;
/// let coll = txn.collection("my_collection")?;
/// // Perform operations...
/// txn.commit()?; // or rollback
/// ```
pub struct NitriteTransaction {
    id: String,
    state: Arc<Mutex<TransactionState>>,
    contexts: Arc<Mutex<HashMap<String, TransactionContext>>>,
    undo_registry: Arc<Mutex<HashMap<String, Vec<UndoEntry>>>>,
    collection_registry: Arc<Mutex<HashMap<String, TransactionalCollection>>>,
    repository_registry: Arc<Mutex<HashMap<String, TransactionalCollection>>>,
    db: Nitrite,
    lock_registry: LockRegistry,
    store: TransactionStore,
    tx_config: NitriteConfig,
}

impl NitriteTransaction {
    /// Creates a new transaction.
    ///
    /// # Arguments
    /// * `db` - Reference to the parent Nitrite database
    /// * `lock_registry` - Registry for coordinating locks across transaction contexts
    ///
    /// # Returns
    /// * `Ok(NitriteTransaction)` - A new transaction initialized in Active state
    /// * `Err(NitriteError)` - If configuration or store initialization fails
    ///
    /// The transaction creates an isolated transaction store that snapshots the
    /// current database state, ensuring read consistency for the transaction's lifetime.
    pub fn new(db: Nitrite, lock_registry: LockRegistry) -> NitriteResult<Self> {
        let db_store = db.store();
        let tx_store = TransactionStore::new(db_store);

        // Create a transaction-specific config that uses the transaction store
        // This ensures index operations in the transaction are isolated
        let tx_config = NitriteConfig::new();
        tx_config.load_module(TransactionStoreModule::new(NitriteStore::new(
            tx_store.clone(),
        )))?;
        tx_config.auto_configure()?;
        tx_config.initialize()?;

        Ok(NitriteTransaction {
            id: Uuid::new_v4().to_string(),
            state: Arc::new(Mutex::new(TransactionState::Active)),
            contexts: Arc::new(Mutex::new(HashMap::new())),
            undo_registry: Arc::new(Mutex::new(HashMap::new())),
            collection_registry: Arc::new(Mutex::new(HashMap::new())),
            repository_registry: Arc::new(Mutex::new(HashMap::new())),
            db,
            lock_registry,
            store: tx_store,
            tx_config,
        })
    }

    /// Gets the transaction ID.
    ///
    /// # Returns
    /// A string slice containing the UUID of this transaction
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Gets the current transaction state.
    ///
    /// # Returns
    /// Current `TransactionState` (Active, PartiallyCommitted, Committed, Closed, Failed, or Aborted)
    pub fn state(&self) -> TransactionState {
        *self.state.lock()
    }

    /// Gets or creates a transactional collection.
    ///
    /// # Arguments
    /// * `name` - The name of the collection to access
    ///
    /// # Returns
    /// * `Ok(NitriteCollection)` - A transactional view of the collection
    /// * `Err(NitriteError)` - If transaction is not active or collection access fails
    ///
    /// Multiple calls with the same name return the same transactional collection instance.
    /// Operations on the returned collection are recorded in the transaction journal.
    pub fn collection(&self, name: &str) -> NitriteResult<NitriteCollection> {
        self.check_active()?;

        let mut registry = self.collection_registry.lock();
        if let Some(tc) = registry.get(name) {
            return Ok(NitriteCollection::new(tc.clone()));
        }

        let primary = self.db.collection(name)?;
        let context = self.get_or_create_context(name.to_string())?;
        let db_store = self.db.store();
        let event_bus = NitriteEventBus::new();
        let operations = CollectionOperations::new(
            name,
            context.txn_map().clone(),
            self.tx_config.clone(), // Use transaction config for isolated index operations
            event_bus.clone(),
        )?;
        let tc = TransactionalCollection::new(primary, context, db_store, operations, event_bus);
        registry.insert(name.to_string(), tc.clone());
        Ok(NitriteCollection::new(tc))
    }

    /// Gets or creates a transactional object repository.
    ///
    /// # Type Parameters
    /// * `T` - The entity type, must implement `NitriteEntity` and `Convertible`
    ///
    /// # Returns
    /// * `Ok(ObjectRepository<T>)` - A transactional repository for the entity type
    /// * `Err(NitriteError)` - If transaction is not active or repository access fails
    ///
    /// Creates a repository with an auto-generated key. For keyed repositories, use
    /// `keyed_repository()`.
    pub fn repository<T>(&self) -> NitriteResult<ObjectRepository<T>>
    where
        T: Convertible<Output = T> + NitriteEntity + Send + Sync + 'static,
    {
        self.get_repository::<T>(None)
    }

    /// Gets or creates a keyed transactional object repository.
    ///
    /// # Type Parameters
    /// * `T` - The entity type, must implement `NitriteEntity` and `Convertible`
    ///
    /// # Arguments
    /// * `key` - The repository key to identify this particular repository
    ///
    /// # Returns
    /// * `Ok(ObjectRepository<T>)` - A transactional repository for the entity type
    /// * `Err(NitriteError)` - If transaction is not active or repository access fails
    ///
    /// Multiple repositories with different keys for the same entity type are stored
    /// separately, allowing parallel operations on the same type with different namespaces.
    pub fn keyed_repository<T>(&self, key: &str) -> NitriteResult<ObjectRepository<T>>
    where
        T: Convertible<Output = T> + NitriteEntity + Send + Sync + 'static,
    {
        self.get_repository(Some(key))
    }

    fn get_repository<T>(&self, key: Option<&str>) -> NitriteResult<ObjectRepository<T>>
    where
        T: Convertible<Output = T> + NitriteEntity + Send + Sync + 'static,
    {
        self.check_active()?;

        let mut registry = self.repository_registry.lock();
        // Use key in repository name to differentiate keyed repositories
        let name = repository_name_by_type::<T>(key)?;
        if let Some(tc) = registry.get(&name) {
            let collection = tc.clone();
            return self.create_repository_from_collection(collection, key);
        }

        let primary_repo = match key {
            Some(key) => self.db.keyed_repository::<T>(key)?,
            None => self.db.repository::<T>()?,
        };
        let context = self.get_or_create_context(name.clone())?;
        let db_store = self.db.store();
        let event_bus = NitriteEventBus::new();
        let operations = CollectionOperations::new(
            &name,
            context.txn_map().clone(),
            self.tx_config.clone(), // Use transaction config for isolated index operations
            event_bus.clone(),
        )?;
        let tc = TransactionalCollection::new(
            primary_repo.document_collection(),
            context,
            db_store,
            operations,
            event_bus,
        );
        registry.insert(name.clone(), tc.clone());
        self.create_repository_from_collection::<T>(tc, key)
    }

    fn create_repository_from_collection<T>(
        &self,
        tx_collection: TransactionalCollection,
        key: Option<&str>,
    ) -> NitriteResult<ObjectRepository<T>>
    where
        T: Convertible<Output = T> + NitriteEntity + Send + Sync + 'static,
    {
        let primary_repo = match key {
            Some(key) => self.db.keyed_repository::<T>(key)?,
            None => self.db.repository::<T>()?,
        };
        let nitrite_config = self.db.config().clone();
        let operation = RepositoryOperations::new();
        let nitrite_collection = NitriteCollection::new(tx_collection.clone());
        // Initialize the operation with the collection
        operation.initialize::<T>(nitrite_collection.clone())?;
        let tx_repo = TransactionalRepository::new(
            primary_repo,
            nitrite_collection,
            nitrite_config,
            operation,
        );
        Ok(ObjectRepository::new(tx_repo))
    }

    /// Gets or creates a transaction context for a collection
    fn get_or_create_context(&self, collection_name: String) -> NitriteResult<TransactionContext> {
        self.check_active()?;

        let mut contexts = self.contexts.lock();
        if let Some(ctx) = contexts.get(&collection_name) {
            return Ok(ctx.clone());
        }

        // Create a transactional map for this collection
        let txn_map = self.store.open_map(&collection_name)?;
        let ctx = TransactionContext::new(collection_name.clone(), txn_map);
        contexts.insert(collection_name, ctx.clone());
        Ok(ctx)
    }

    /// Adds a journal entry to a collection's context
    pub fn add_journal_entry(
        &self,
        collection_name: String,
        entry: JournalEntry,
    ) -> NitriteResult<()> {
        let ctx = self.get_or_create_context(collection_name)?;
        ctx.add_entry(entry)
    }

    /// Commits the transaction using two-phase commit protocol.
    ///
    /// # Returns
    /// * `Ok(())` - If all operations committed successfully
    /// * `Err(NitriteError)` - If transaction is not active or any commit operation fails
    ///
    /// # Two-Phase Commit Process
    /// 1. Transitions state to PartiallyCommitted
    /// 2. Executes all pending commit commands from journal
    /// 3. Records undo information for successful commits
    /// 4. If any commit fails: rolls back all completed commits and returns error
    /// 5. Transitions to Committed on success or Failed on error
    /// 6. Closes transaction and releases resources
    ///
    /// After commit (success or failure), the transaction is closed and cannot be used.
    pub fn commit(&self) -> NitriteResult<()> {
        // Acquire exclusive access during commit
        let mut state = self.state.lock();

        if *state != TransactionState::Active {
            return Err(NitriteError::new(
                "Transaction is not active",
                ErrorKind::InvalidOperation,
            ));
        }

        *state = TransactionState::PartiallyCommitted;
        drop(state); // Release lock

        // Perform two-phase commit
        match self.perform_commit() {
            Ok(_) => {
                *self.state.lock() = TransactionState::Committed;
                self.close();
                Ok(())
            }
            Err(e) => {
                *self.state.lock() = TransactionState::Failed;
                // Try to rollback on failure
                let _ = self.perform_rollback();
                self.close();
                Err(NitriteError::new(
                    &format!("Commit failed: {}", e.message()),
                    ErrorKind::InvalidOperation,
                ))
            }
        }
    }

    /// Two-phase commit implementation
    fn perform_commit(&self) -> NitriteResult<()> {
        let contexts = self.contexts.lock();
        let mut commit_error: Option<NitriteError> = None;

        for (collection_name, context) in contexts.iter() {
            // NOTE: We don't acquire the collection lock here because:
            // 1. Each commit command (insert/update/remove) will acquire its own lock
            // 2. The individual operations are already atomic
            // 3. Acquiring the lock here and then calling methods that also lock
            //    would cause a deadlock since parking_lot::RwLock is not reentrant

            let mut undo_stack = Vec::new();
            let mut journal = context.journal.lock();
            let mut had_error = false;

            // Phase 1: Execute all commit commands
            while let Some(entry) = journal.pop_front() {
                if let Some(commit_cmd) = &entry.commit {
                    if let Err(e) = commit_cmd() {
                        commit_error = Some(NitriteError::new(
                            &format!("Failed to execute commit: {}", e.message()),
                            ErrorKind::InvalidOperation,
                        ));
                        had_error = true;
                        break;
                    }

                    // Phase 2: Record undo information for successful commits
                    if let Some(rollback_cmd) = &entry.rollback {
                        let undo = UndoEntry {
                            collection_name: collection_name.clone(),
                            rollback: Arc::new(rollback_cmd.clone()),
                        };
                        undo_stack.push(undo);
                    }
                }
            }

            // Always save the undo stack so rollback can undo committed entries
            context.set_inactive();
            self.undo_registry
                .lock()
                .insert(collection_name.clone(), undo_stack);

            // If there was an error, stop processing further collections
            if had_error {
                break;
            }
        }

        if let Some(e) = commit_error {
            return Err(e);
        }

        Ok(())
    }

    /// Rolls back the transaction, undoing all pending operations.
    ///
    /// # Returns
    /// * `Ok(())` - If rollback completed successfully
    /// * `Err(NitriteError)` - If rollback operations fail
    ///
    /// Transitions the state to Aborted and executes all recorded rollback commands
    /// to restore the database to its pre-transaction state. If the transaction is
    /// already closed, returns Ok without further action.
    ///
    /// After rollback, the transaction is closed and cannot be used further.
    pub fn rollback(&self) -> NitriteResult<()> {
        let mut state = self.state.lock();

        if *state == TransactionState::Closed {
            return Ok(());
        }

        *state = TransactionState::Aborted;
        drop(state);

        self.perform_rollback()?;
        self.close();
        Ok(())
    }

    /// Rollback implementation
    fn perform_rollback(&self) -> NitriteResult<()> {
        let undo_registry = self.undo_registry.lock();

        for (_, undo_stack) in undo_registry.iter() {
            // NOTE: We don't acquire the collection lock here because:
            // 1. Each rollback command (remove/update/insert) will acquire its own lock
            // 2. The individual operations are already atomic
            // 3. Acquiring the lock here and then calling methods that also lock
            //    would cause a deadlock since parking_lot::RwLock is not reentrant

            // LIFO order - rollback in reverse
            for undo in undo_stack.iter().rev() {
                (undo.rollback)().ok();
            }
        }

        Ok(())
    }

    /// Closes the transaction and releases all resources.
    ///
    /// Closes all transaction contexts and their associated maps, and transitions
    /// the state to Closed. This is called automatically on drop.
    /// After closing, the transaction cannot be used further.
    pub fn close(&self) {
        let contexts = self.contexts.lock();
        for (_, ctx) in contexts.iter() {
            ctx.close();
        }

        *self.state.lock() = TransactionState::Closed;
        let _ = self.store.close_all();
    }

    /// Checks if transaction is active
    fn check_active(&self) -> NitriteResult<()> {
        let state = *self.state.lock();
        if state != TransactionState::Active {
            return Err(NitriteError::new(
                "Transaction is not active",
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }

    /// Gets the total number of pending operations across all collections.
    ///
    /// # Returns
    /// Sum of all journal entries from all transactional contexts
    pub fn pending_operations(&self) -> usize {
        let contexts = self.contexts.lock();
        contexts.values().map(|ctx| ctx.pending_operations()).sum()
    }

    /// Lists all collection names accessed in this transaction.
    ///
    /// # Returns
    /// Vector of all unique collection names that have been accessed via
    /// `collection()` or repository operations
    pub fn collection_names(&self) -> Vec<String> {
        self.contexts.lock().keys().cloned().collect()
    }
}

impl Clone for NitriteTransaction {
    fn clone(&self) -> Self {
        NitriteTransaction {
            id: self.id.clone(),
            state: Arc::clone(&self.state),
            contexts: Arc::clone(&self.contexts),
            undo_registry: Arc::clone(&self.undo_registry),
            collection_registry: Arc::clone(&self.collection_registry),
            repository_registry: Arc::clone(&self.repository_registry),
            db: self.db.clone(),
            lock_registry: self.lock_registry.clone(),
            store: self.store.clone(),
            tx_config: self.tx_config.clone(),
        }
    }
}

impl std::fmt::Debug for NitriteTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Acquire contexts lock once and extract both values to avoid deadlock
        let contexts = self.contexts.lock();
        let context_count = contexts.len();
        let pending_ops: usize = contexts.values().map(|ctx| ctx.pending_operations()).sum();
        drop(contexts);

        f.debug_struct("NitriteTransaction")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("context_count", &context_count)
            .field("pending_operations", &pending_ops)
            .finish()
    }
}

impl Drop for NitriteTransaction {
    fn drop(&mut self) {
        // Ensure transaction is closed
        self.close();
    }
}
