use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use crate::migration::{InstructionSet, InstructionType};
use std::any::Any;
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

/// Represents a single migration step with its type and arguments.
///
/// # Purpose
/// Encapsulates a discrete database schema migration operation with all necessary context
/// including the operation type, scope (collection/entity), and operation-specific arguments.
///
/// # Characteristics
/// - Immutable after creation (all fields are public and set at construction)
/// - Clone-able for reuse and sharing across execution contexts
/// - Stores arguments in type-erased form via MigrationArguments enum
/// - Scope is optional (database-level operations have None for collection/entity)
///
/// # Fields
/// * `instruction_type` - Type of migration operation (e.g., AddUser, DropCollection)
/// * `collection_name` - Optional: collection affected by this step (None for database-level ops)
/// * `entity_name` - Optional: entity type name for repository operations
/// * `key` - Optional: key field name for repository operations
/// * `arguments` - Type-erased arguments specific to the operation type
#[derive(Clone)]
pub struct MigrationStep {
    pub instruction_type: InstructionType,
    pub collection_name: Option<String>,
    pub entity_name: Option<String>,
    pub key: Option<String>,
    pub arguments: MigrationArguments,
}

impl std::fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationStep")
            .field("instruction_type", &self.instruction_type)
            .field("collection_name", &self.collection_name)
            .field("entity_name", &self.entity_name)
            .field("key", &self.key)
            .field("arguments", &"<arguments>")
            .finish()
    }
}

/// Type-erased arguments container for migration operations.
///
/// # Purpose
/// Provides a flexible mechanism to store arguments of any type (including closures) for
/// migration operations. Uses Arc and Any trait object pattern for thread-safe type erasure.
///
/// # Characteristics
/// - Supports 0 to 4+ arguments via different variants
/// - Thread-safe: all Arc contents implement Send + Sync
/// - Type-erased: arguments must be downcast to correct type when retrieved
/// - Clone-able: arguments are shared via Arc, not copied
///
/// # Variants
/// * `None` - No arguments (e.g., drop_all_indices)
/// * `Single(Arc<T>)` - One argument (e.g., field_name: String)
/// * `Double(Arc<T1>, Arc<T2>)` - Two arguments (e.g., old_name, new_name)
/// * `Triple(Arc<T1>, Arc<T2>, Arc<T3>)` - Three arguments
/// * `Quad(Arc<T1>, Arc<T2>, Arc<T3>, Arc<T4>)` - Four arguments
/// * `Multiple(Vec<Arc<dyn Any>>)` - Variable number of arguments
#[derive(Clone)]
pub enum MigrationArguments {
    None,
    Single(Arc<dyn Any + Send + Sync>),
    Double(Arc<dyn Any + Send + Sync>, Arc<dyn Any + Send + Sync>),
    Triple(Arc<dyn Any + Send + Sync>, Arc<dyn Any + Send + Sync>, Arc<dyn Any + Send + Sync>),
    Quad(Arc<dyn Any + Send + Sync>, Arc<dyn Any + Send + Sync>, Arc<dyn Any + Send + Sync>, Arc<dyn Any + Send + Sync>),
    Multiple(Vec<Arc<dyn Any + Send + Sync>>),
}

impl std::fmt::Debug for MigrationArguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationArguments::None => write!(f, "None"),
            MigrationArguments::Single(_) => write!(f, "Single(<value>)"),
            MigrationArguments::Double(_, _) => write!(f, "Double(<value>, <value>)"),
            MigrationArguments::Triple(_, _, _) => write!(f, "Triple(<value>, <value>, <value>)"),
            MigrationArguments::Quad(_, _, _, _) => write!(f, "Quad(<value>, <value>, <value>, <value>)"),
            MigrationArguments::Multiple(_) => write!(f, "Multiple(<values>)"),
        }
    }
}

impl MigrationArguments {
    /// Downcasts single argument to specified type.
    ///
    /// # Arguments
    /// * `T` - Target type for downcast
    ///
    /// # Returns
    /// `Ok(T)` - Cloned value if downcast succeeds
    /// `Err(NitriteError)` - If variant is not Single or type mismatch
    pub fn as_single<T: Any + Send + Sync + Clone + 'static>(&self) -> NitriteResult<T> {
        match self {
            MigrationArguments::Single(arg) => {
                arg.downcast_ref::<T>()
                    .cloned()
                    .ok_or_else(|| NitriteError::new(
                        "Failed to downcast single argument",
                        ErrorKind::ValidationError,
                    ))
            }
            _ => Err(NitriteError::new(
                "Expected single argument",
                ErrorKind::ValidationError,
            )),
        }
    }

    /// Downcasts two arguments to specified types.
    ///
    /// # Arguments
    /// * `T1` - Target type for first argument
    /// * `T2` - Target type for second argument
    ///
    /// # Returns
    /// `Ok((T1, T2))` - Tuple of cloned values if both downcasts succeed
    /// `Err(NitriteError)` - If variant is not Double or any type mismatch
    pub fn as_double<T1, T2>(&self) -> NitriteResult<(T1, T2)>
    where
        T1: Any + Send + Sync + Clone + 'static,
        T2: Any + Send + Sync + Clone + 'static,
    {
        match self {
            MigrationArguments::Double(arg1, arg2) => {
                let a = arg1.downcast_ref::<T1>()
                    .cloned()
                    .ok_or_else(|| NitriteError::new(
                        "Failed to downcast first argument",
                        ErrorKind::ValidationError,
                    ))?;
                let b = arg2.downcast_ref::<T2>()
                    .cloned()
                    .ok_or_else(|| NitriteError::new(
                        "Failed to downcast second argument",
                        ErrorKind::ValidationError,
                    ))?;
                Ok((a, b))
            }
            _ => Err(NitriteError::new(
                "Expected double arguments",
                ErrorKind::ValidationError,
            )),
        }
    }

    /// Downcasts three arguments to specified types.
    ///
    /// # Arguments
    /// * `T1` - Target type for first argument
    /// * `T2` - Target type for second argument
    /// * `T3` - Target type for third argument
    ///
    /// # Returns
    /// `Ok((T1, T2, T3))` - Tuple of cloned values if all downcasts succeed
    /// `Err(NitriteError)` - If variant is not Triple or any type mismatch
    pub fn as_triple<T1, T2, T3>(&self) -> NitriteResult<(T1, T2, T3)>
    where
        T1: Any + Send + Sync + Clone + 'static,
        T2: Any + Send + Sync + Clone + 'static,
        T3: Any + Send + Sync + Clone + 'static,
    {
        match self {
            MigrationArguments::Triple(arg1, arg2, arg3) => {
                let a = arg1.downcast_ref::<T1>()
                    .cloned()
                    .ok_or_else(|| NitriteError::new(
                        "Failed to downcast first argument",
                        ErrorKind::ValidationError,
                    ))?;
                let b = arg2.downcast_ref::<T2>()
                    .cloned()
                    .ok_or_else(|| NitriteError::new(
                        "Failed to downcast second argument",
                        ErrorKind::ValidationError,
                    ))?;
                let c = arg3.downcast_ref::<T3>()
                    .cloned()
                    .ok_or_else(|| NitriteError::new(
                        "Failed to downcast third argument",
                        ErrorKind::ValidationError,
                    ))?;
                Ok((a, b, c))
            }
            _ => Err(NitriteError::new(
                "Expected triple arguments",
                ErrorKind::ValidationError,
            )),
        }
    }

    /// Downcasts four arguments to specified types.
    ///
    /// # Arguments
    /// * `T1` - Target type for first argument
    /// * `T2` - Target type for second argument
    /// * `T3` - Target type for third argument
    /// * `T4` - Target type for fourth argument
    ///
    /// # Returns
    /// `Ok((T1, T2, T3, T4))` - Tuple of cloned values if all downcasts succeed
    /// `Err(NitriteError)` - If variant is not Quad or any type mismatch
    pub fn as_quad<T1, T2, T3, T4>(&self) -> NitriteResult<(T1, T2, T3, T4)>
    where
        T1: Any + Send + Sync + Clone + 'static,
        T2: Any + Send + Sync + Clone + 'static,
        T3: Any + Send + Sync + Clone + 'static,
        T4: Any + Send + Sync + Clone + 'static,
    {
        match self {
            MigrationArguments::Quad(arg1, arg2, arg3, arg4) => {
                let a = arg1.downcast_ref::<T1>()
                    .cloned()
                    .ok_or_else(|| NitriteError::new(
                        "Failed to downcast first argument",
                        ErrorKind::ValidationError,
                    ))?;
                let b = arg2.downcast_ref::<T2>()
                    .cloned()
                    .ok_or_else(|| NitriteError::new(
                        "Failed to downcast second argument",
                        ErrorKind::ValidationError,
                    ))?;
                let c = arg3.downcast_ref::<T3>()
                    .cloned()
                    .ok_or_else(|| NitriteError::new(
                        "Failed to downcast third argument",
                        ErrorKind::ValidationError,
                    ))?;
                let d = arg4.downcast_ref::<T4>()
                    .cloned()
                    .ok_or_else(|| NitriteError::new(
                        "Failed to downcast fourth argument",
                        ErrorKind::ValidationError,
                    ))?;
                Ok((a, b, c, d))
            }
            _ => Err(NitriteError::new(
                "Expected quad arguments",
                ErrorKind::ValidationError,
            )),
        }
    }

    /// Downcasts multiple arguments to specified type.
    ///
    /// # Arguments
    /// * `T` - Target type for all arguments (must be same for all)
    ///
    /// # Returns
    /// `Ok(Vec<T>)` - Vector of cloned values if variant is Multiple and all downcast
    /// `Err(NitriteError)` - If variant is not Multiple or any type mismatch
    pub fn as_multiple<T: Any + Send + Sync + Clone + 'static>(&self) -> NitriteResult<Vec<T>> {
        match self {
            MigrationArguments::Multiple(args) => {
                args.iter()
                    .map(|arg| {
                        arg.downcast_ref::<T>()
                            .cloned()
                            .ok_or_else(|| NitriteError::new(
                                "Failed to downcast argument in multiple",
                                ErrorKind::ValidationError,
                            ))
                    })
                    .collect()
            }
            _ => Err(NitriteError::new(
                "Expected multiple arguments",
                ErrorKind::ValidationError,
            )),
        }
    }

    /// Returns single argument as Arc<dyn Any> without downcast.
    ///
    /// # Returns
    /// `Ok(Arc<dyn Any>)` - Arc reference to underlying value
    /// `Err(NitriteError)` - If variant is not Single
    pub fn as_any_single(&self) -> NitriteResult<Arc<dyn Any + Send + Sync>> {
        match self {
            MigrationArguments::Single(arg) => Ok(Arc::clone(arg)),
            _ => Err(NitriteError::new(
                "Expected single argument",
                ErrorKind::ValidationError,
            )),
        }
    }

    /// Returns two arguments as Arc<dyn Any> without downcast.
    ///
    /// # Returns
    /// `Ok((Arc, Arc))` - Tuple of Arc references
    /// `Err(NitriteError)` - If variant is not Double
    pub fn as_any_double(&self) -> NitriteResult<(Arc<dyn Any + Send + Sync>, Arc<dyn Any + Send + Sync>)> {
        match self {
            MigrationArguments::Double(arg1, arg2) => Ok((Arc::clone(arg1), Arc::clone(arg2))),
            _ => Err(NitriteError::new(
                "Expected double arguments",
                ErrorKind::ValidationError,
            )),
        }
    }

    /// Returns three arguments as Arc<dyn Any> without downcast.
    ///
    /// # Returns
    /// `Ok((Arc, Arc, Arc))` - Tuple of Arc references
    /// `Err(NitriteError)` - If variant is not Triple
    pub fn as_any_triple(&self) -> NitriteResult<(Arc<dyn Any + Send + Sync>, Arc<dyn Any + Send + Sync>, Arc<dyn Any + Send + Sync>)> {
        match self {
            MigrationArguments::Triple(arg1, arg2, arg3) => Ok((Arc::clone(arg1), Arc::clone(arg2), Arc::clone(arg3))),
            _ => Err(NitriteError::new(
                "Expected triple arguments",
                ErrorKind::ValidationError,
            )),
        }
    }

    /// Returns multiple arguments as Vec<Arc<dyn Any>> without downcast.
    ///
    /// # Returns
    /// `Ok(Vec<Arc>)` - Vector of Arc references
    /// `Err(NitriteError)` - If variant is not Multiple
    pub fn as_any_multiple(&self) -> NitriteResult<Vec<Arc<dyn Any + Send + Sync>>> {
        match self {
            MigrationArguments::Multiple(args) => Ok(args.iter().map(Arc::clone).collect()),
            _ => Err(NitriteError::new(
                "Expected multiple arguments",
                ErrorKind::ValidationError,
            )),
        }
    }

    /// Returns count of arguments for this variant.
    ///
    /// # Returns
    /// Count as usize: 0 for None, 1 for Single, 2 for Double, etc.
    pub fn arg_count(&self) -> usize {
        match self {
            MigrationArguments::None => 0,
            MigrationArguments::Single(_) => 1,
            MigrationArguments::Double(_, _) => 2,
            MigrationArguments::Triple(_, _, _) => 3,
            MigrationArguments::Quad(_, _, _, _) => 4,
            MigrationArguments::Multiple(args) => args.len(),
        }
    }
}

/// Abstract base class for user-defined migrations.
///
/// # Purpose
/// Represents a versioned database schema migration that can be applied to upgrade
/// the database from one schema version to another. Encapsulates migration steps
/// and provides lazy execution semantics.
///
/// # Characteristics
/// - Immutable public API with internal mutable state via Arc<Mutex<>>
/// - Clone-able: clones share the same underlying migration state via Arc
/// - Lazy execution: migration steps are generated on first call to steps()
/// - Idempotent: multiple steps() calls return cached results (execute() called once)
/// - Closure-based: migration logic defined by user-provided function
///
/// # Usage
/// ```ignore
/// let migration = Migration::new(1, 2, |instruction| {
///     instruction.for_database().add_user("admin", "password")
///         .drop_collection("test");
///     instruction.for_collection("users").rename("customers");
///     instruction.for_repository("books", None).delete_field("price");
///     Ok(())
/// });
///
/// // Apply to database
/// let db = Nitrite::builder()
///     .schema_version(2)
///     .add_migration(migration)
///     .open_or_create(Some("admin"), Some("password"))?;
/// ```
#[derive(Debug, Clone)]
pub struct Migration {
    inner: Arc<MigrationInner>,
}

impl Migration {
    /// Creates a new migration for upgrading from one schema version to another.
    ///
    /// # Arguments
    /// * `from_version` - Source schema version
    /// * `to_version` - Target schema version
    /// * `migrate` - Closure that defines migration operations via InstructionSet
    ///
    /// # Returns
    /// Migration instance wrapping the migration logic
    ///
    /// # Behavior
    /// - The migrate closure is not executed immediately
    /// - Execution is deferred until first call to steps() or execute()
    /// - Closure receives immutable InstructionSet reference for building instructions
    pub fn new(from_version: u32, to_version: u32, migrate: impl Fn(&InstructionSet) -> NitriteResult<()> + Send + Sync + 'static) -> Self {
        Migration {
            inner: Arc::new(MigrationInner {
                from_version,
                to_version,
                migration_steps: Mutex::new(VecDeque::new()),
                executed: AtomicBool::new(false),
                migrate: Box::new(migrate),
            }),
        }
    }

    /// Returns the source schema version for this migration.
    ///
    /// # Returns
    /// Schema version as u32
    pub fn from_version(&self) -> u32 {
        self.inner.from_version
    }

    /// Returns the target schema version for this migration.
    ///
    /// # Returns
    /// Schema version as u32
    pub fn to_version(&self) -> u32 {
        self.inner.to_version
    }

    /// Returns all migration steps, triggering lazy execution on first call.
    ///
    /// # Returns
    /// `Ok(Vec<MigrationStep>)` - All migration steps generated by the migration closure
    /// `Err(NitriteError)` - If migration execution fails or state access fails
    ///
    /// # Behavior
    /// - First call executes the migration closure to generate steps
    /// - Subsequent calls return cached steps without re-execution
    /// - Executed flag prevents duplicate execution
    pub fn steps(&self) -> NitriteResult<Vec<MigrationStep>> {
        let executed = self.inner.executed.load(std::sync::atomic::Ordering::SeqCst);
        
        if !executed {
            self.execute()?;
        }

        let steps = self.inner.migration_steps.lock()
            .map_err(|_| NitriteError::new("Failed to acquire lock on migration_steps", ErrorKind::ValidationError))?;
        Ok(steps.iter().cloned().collect())
    }

    /// Executes the migration closure to generate and store migration steps.
    ///
    /// # Returns
    /// `Ok(())` - Migration executed successfully
    /// `Err(NitriteError)` - If migration closure fails or state access fails
    ///
    /// # Behavior
    /// - Creates InstructionSet with empty initial steps
    /// - Calls user-provided migrate closure with InstructionSet
    /// - Collects generated steps from InstructionSet
    /// - Sets executed flag to prevent re-execution
    pub(crate) fn execute(&self) -> NitriteResult<()> {
        let steps = self.get_all_steps()?;
        let instruction_set = InstructionSet::new(steps.into());
        (self.inner.migrate)(&instruction_set)?;
        
        // Replace migration steps with the steps from InstructionSet (which may have been modified by the closure)
        let new_steps = instruction_set.get_steps()?;
        let mut migration_steps = self.inner.migration_steps.lock()
            .map_err(|_| NitriteError::new("Failed to acquire lock on migration_steps", ErrorKind::ValidationError))?;
        migration_steps.clear();
        for step in new_steps {
            migration_steps.push_back(step);
        }
        
        self.inner.executed.store(true, std::sync::atomic::Ordering::SeqCst);
        Ok(())        
    }

    /// Adds a migration step to the internal step queue.
    ///
    /// # Arguments
    /// * `step` - MigrationStep to add
    ///
    /// # Returns
    /// `Ok(())` - Step added successfully
    /// `Err(NitriteError)` - If state access fails
    pub(crate) fn add_step(&self, step: MigrationStep) -> NitriteResult<()> {
        let mut steps = self.inner.migration_steps.lock()
            .map_err(|_| NitriteError::new("Failed to acquire lock on migration_steps", ErrorKind::ValidationError))?;
        steps.push_back(step);
        Ok(())
    }

    /// Returns all currently stored migration steps without execution.
    ///
    /// # Returns
    /// `Ok(Vec<MigrationStep>)` - All accumulated steps
    /// `Err(NitriteError)` - If state access fails
    pub(crate) fn get_all_steps(&self) -> NitriteResult<Vec<MigrationStep>> {
        let steps = self.inner.migration_steps.lock()
            .map_err(|_| NitriteError::new("Failed to acquire lock on migration_steps", ErrorKind::ValidationError))?;
        Ok(steps.iter().cloned().collect())
    }
}

/// Internal implementation details for Migration.
///
/// # Purpose
/// Stores the actual state and closure for a migration. Wrapped in Arc for shared ownership
/// and thread-safe access via Mutex/AtomicBool synchronization primitives.
///
/// # Characteristics
/// - Not directly exposed in public API (wrapped by Migration)
/// - Thread-safe: mutation through Mutex<VecDeque> and AtomicBool
/// - Stores user-provided migrate closure as Box trait object
/// - Immutable version fields for validation
pub struct MigrationInner {
    from_version: u32,
    to_version: u32,
    migration_steps: Mutex<VecDeque<MigrationStep>>,
    executed: AtomicBool,
    migrate: Box<dyn Fn(&InstructionSet) -> NitriteResult<()> + Send + Sync>,
}

impl std::fmt::Debug for MigrationInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationInner")
            .field("from_version", &self.from_version)
            .field("to_version", &self.to_version)
            .finish()
    }
}
