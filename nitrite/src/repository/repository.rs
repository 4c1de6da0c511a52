use crate::collection::operation::WriteResult;
use crate::collection::{CollectionEventListener, Document, FindOptions, NitriteCollection, NitriteId, UpdateOptions};
use crate::common::{
    AttributeAware, Attributes, Convertible, EventAware, PersistentCollection, Processor,
    SubscriberRef,
};
use crate::errors::NitriteResult;
use crate::filter::Filter;
use crate::index::{IndexDescriptor, IndexOptions};
use crate::repository::cursor::ObjectCursor;
use crate::repository::NitriteEntity;
use crate::store::NitriteStore;
use std::ops::Deref;
use std::sync::Arc;

/// A trait for implementing typed repository operations on Nitrite entities.
///
/// # Purpose
///
/// `ObjectRepositoryProvider` defines the complete interface for persisting, querying, and managing
/// strongly-typed entities in a Nitrite database. It provides both write operations (insert, update, remove)
/// and read operations (find, get_by_id), along with collection management and indexing capabilities.
///
/// This trait is generic over `T`, the entity type, which must implement `Convertible` and `NitriteEntity`
/// to enable transparent serialization and schema-aware operations.
///
/// # Characteristics
///
/// - **Generic Over Entity Type**: Works with any type implementing `Convertible<Output = T> + NitriteEntity + Send + Sync`
/// - **Type-Safe Operations**: Automatically converts between entity objects and internal document representation
/// - **Thread-Safe**: Requires `Send + Sync` to enable safe concurrent access
/// - **Inherits Collection Methods**: Extends `PersistentCollection` for index management and lifecycle control
/// - **Filter-Based Queries**: Uses the `Filter` DSL for expressive document filtering
///
/// # Relationship to Related Types
///
/// - `ObjectRepository<T>`: The facade wrapper that implements `Deref` to this trait
/// - `DefaultObjectRepository<T>`: The default implementation in `default_object_repository` module
/// - `NitriteEntity`: Defines schema and identity configuration for the entity type
/// - `Convertible`: Enables bidirectional conversion between objects and documents
pub trait ObjectRepositoryProvider<T>: PersistentCollection
where
    T: Convertible<Output = T> + NitriteEntity + Send + Sync
{    
    /// Inserts a single entity into the repository.
    ///
    /// # Arguments
    ///
    /// * `object` - The entity instance to insert
    ///
    /// # Returns
    ///
    /// A `WriteResult` containing the NitriteIds of all inserted documents, or an error if the operation fails.
    ///
    /// # Behavior
    ///
    /// - Automatically assigns a unique NitriteId to the document
    /// - Converts the entity to a document using `Convertible::to_value`
    /// - Triggers collection event handlers if subscribed
    /// - Respects any unique index constraints; fails if constraint violated
    ///
    /// # Examples
    ///
    /// From nitrite-int-test:
    /// ```ignore
    /// let repository: ObjectRepository<Employee> = db.repository()?;
    /// let emp = Employee { emp_id: Some(1), address: Some("xyz".to_string()), .. };
    /// repository.insert(emp)?;
    /// ```
    fn insert(&self, object: T) -> NitriteResult<WriteResult>;

    /// Inserts multiple entities into the repository in a batch operation.
    ///
    /// # Arguments
    ///
    /// * `objects` - A vector of entity instances to insert
    ///
    /// # Returns
    ///
    /// A `WriteResult` containing the NitriteIds of all inserted documents, or an error if the operation fails.
    ///
    /// # Behavior
    ///
    /// - Converts all entities to documents before insertion
    /// - More efficient than calling `insert()` multiple times due to batch processing
    /// - Automatically assigns unique NitriteIds to all documents
    /// - All insertions are atomic; either all succeed or all fail
    /// - Respects unique index constraints across the entire batch
    ///
    /// # Examples
    ///
    /// From nitrite-int-test:
    /// ```ignore
    /// let repository: ObjectRepository<Employee> = db.repository()?;
    /// let employees = vec![manager.clone(), developer.clone()];
    /// repository.insert_many(employees)?;
    /// ```
    fn insert_many(&self, objects: Vec<T>) -> NitriteResult<WriteResult>;
    
    /// Updates entities matching a filter with a new object state (convenience method).
    ///
    /// # Arguments
    ///
    /// * `filter` - The filter expression to identify entities to update
    /// * `object` - The entity instance with updated data
    ///
    /// # Returns
    ///
    /// A `WriteResult` containing information about updated documents.
    ///
    /// # Behavior
    ///
    /// This is a convenience method that calls `update_with_options` with default `UpdateOptions`.
    /// It updates matching entities but does not insert if no match is found.
    ///
    /// # Examples
    ///
    /// From nitrite-int-test:
    /// ```ignore
    /// let repository: ObjectRepository<TxData> = db.repository()?;
    /// let filter = field("name").eq("John");
    /// let updated = TxData::new(1, "Jane");
    /// repository.update(filter, updated)?;
    /// ```
    fn update(
        &self,
        filter: Filter,
        object: T,
    ) -> NitriteResult<WriteResult> {
        self.update_with_options(filter, object, &UpdateOptions::default())
    }

    /// Updates entities matching a filter with configurable update behavior.
    ///
    /// # Arguments
    ///
    /// * `filter` - The filter expression to identify entities to update
    /// * `object` - The entity instance with updated data
    /// * `update_options` - Configuration controlling insertion behavior and update scope
    ///
    /// # Returns
    ///
    /// A `WriteResult` containing information about updated documents.
    ///
    /// # Behavior
    ///
    /// - Converts the entity to a document representation
    /// - If `insert_if_absent=false` (default): updates only matching documents
    /// - If `insert_if_absent=true`: inserts if no documents match the filter
    /// - If `just_once=true`: updates only the first matching document
    /// - If `just_once=false`: updates all matching documents
    ///
    /// # Examples
    ///
    /// From nitrite-int-test:
    /// ```ignore
    /// let repository: ObjectRepository<TestEntity> = db.repository()?;
    /// let filter = field("id").eq("test_id");
    /// let update_options = UpdateOptions::default();
    /// repository.update_with_options(filter, entity, &update_options)?;
    /// ```
    fn update_with_options(
        &self,
        filter: Filter,
        object: T,
        update_options: &UpdateOptions,
    ) -> NitriteResult<WriteResult>;

    /// Updates a single entity by matching on its unique identifier field(s).
    ///
    /// # Arguments
    ///
    /// * `object` - The entity instance with updated data
    /// * `insert_if_absent` - If true, inserts the entity if no match is found; otherwise fails silently
    ///
    /// # Returns
    ///
    /// A `WriteResult` containing information about the update operation.
    ///
    /// # Behavior
    ///
    /// - Uses the entity's configured unique identifier field(s) from `NitriteEntity::entity_id()`
    /// - Updates only the single document matching the entity's ID
    /// - If `insert_if_absent=true`: inserts the entity if no ID match is found
    /// - If `insert_if_absent=false`: returns success even if no document matched
    /// - Most efficient for ID-based updates as it uses a unique filter
    ///
    /// # Examples
    ///
    /// From nitrite-int-test:
    /// ```ignore
    /// let repository: ObjectRepository<TxData> = db.repository()?;
    /// let updated = TxData::new(1, "Jane");
    /// repository.update_one(updated, true)?;
    /// ```
    fn update_one(&self, object: T, insert_if_absent: bool) -> NitriteResult<WriteResult>;

    /// Updates documents at the raw document level matching a filter.
    ///
    /// # Arguments
    ///
    /// * `filter` - The filter expression to identify documents to update
    /// * `document` - The raw document with updated fields
    /// * `just_once` - If true, updates only the first matching document; if false, updates all matches
    ///
    /// # Returns
    ///
    /// A `WriteResult` containing information about updated documents.
    ///
    /// # Behavior
    ///
    /// - Updates documents directly without entity conversion
    /// - Useful when you have partial document updates that don't map to full entity objects
    /// - Works with raw `Document` values rather than typed entities
    /// - All documents matching the filter are updated with the provided field values
    ///
    /// # Examples
    ///
    /// From nitrite-int-test:
    /// ```ignore
    /// let repository: ObjectRepository<TestEntity> = db.repository()?;
    /// let filter = all();
    /// let document = Document::default();
    /// repository.update_document(filter, &document, true)?;
    /// ```
    fn update_document(
        &self,
        filter: Filter,
        document: &Document,
        just_once: bool,
    ) -> NitriteResult<WriteResult>;

    /// Updates an entity directly by its NitriteId without filter-based lookup.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique NitriteId of the document to update
    /// * `object` - The entity instance with updated data
    /// * `insert_if_absent` - If true, inserts if the id doesn't exist; otherwise fails silently
    ///
    /// # Returns
    ///
    /// A `WriteResult` containing information about the update operation.
    ///
    /// # Behavior
    ///
    /// - **O(1) operation**: Directly accesses the document by its internal NitriteId key
    /// - No filter-based search required, making it extremely efficient
    /// - Particularly useful when iterating over retrieved entities and updating them
    /// - The most performant way to update a known document
    /// - Avoids expensive filter-based lookups on large collections
    ///
    /// # Examples
    ///
    /// From nitrite-int-test (derived from transaction patterns):
    /// ```ignore
    /// let repository: ObjectRepository<Employee> = db.repository()?;
    /// let cursor = repository.find(all())?;
    /// for emp_wrapper in cursor {
    ///     let emp = emp_wrapper.get_object()?;
    ///     // Update the entity directly using its NitriteId
    ///     repository.update_by_nitrite_id(&emp.id, modified_emp, false)?;
    /// }
    /// ```
    fn update_by_nitrite_id(
        &self,
        id: &NitriteId,
        object: T,
        insert_if_absent: bool,
    ) -> NitriteResult<WriteResult>;

    /// Removes a single entity by matching on its unique identifier field(s).
    ///
    /// # Arguments
    ///
    /// * `object` - The entity instance whose ID is used to identify the document to remove
    ///
    /// # Returns
    ///
    /// A `WriteResult` containing information about the removed document.
    ///
    /// # Behavior
    ///
    /// - Uses the entity's configured unique identifier field(s) from `NitriteEntity::entity_id()`
    /// - Removes exactly one document matching the entity's ID
    /// - Fails if no document with the matching ID exists
    /// - Most efficient for ID-based removal
    ///
    /// # Examples
    ///
    /// From nitrite-int-test:
    /// ```ignore
    /// let repository: ObjectRepository<TestEntity> = db.repository()?;
    /// let entity = TestEntity::default();
    /// repository.remove_one(entity)?;
    /// ```
    fn remove_one(&self, object: T) -> NitriteResult<WriteResult>;

    /// Removes documents matching a filter with optional single-match limiting.
    ///
    /// # Arguments
    ///
    /// * `filter` - The filter expression to identify documents to remove
    /// * `just_once` - If true, removes only the first matching document; if false, removes all matches
    ///
    /// # Returns
    ///
    /// A `WriteResult` containing information about removed documents.
    ///
    /// # Behavior
    ///
    /// - Removes all documents matching the filter unless `just_once=true`
    /// - If `just_once=true`: removes only the first matching document
    /// - If `just_once=false`: removes all matching documents
    /// - Deletes documents from all indexes before removing from storage
    /// - Triggers collection event handlers if subscribed
    ///
    /// # Examples
    ///
    /// From nitrite-int-test:
    /// ```ignore
    /// let repository: ObjectRepository<TxData> = db.repository()?;
    /// repository.remove(field("name").eq("John"), false)?;
    /// ```
    fn remove(&self, filter: Filter, just_once: bool) -> NitriteResult<WriteResult>;

    /// Retrieves a single entity by its unique identifier.
    ///
    /// # Arguments
    ///
    /// * `id` - The entity's unique identifier value (type must match entity's ID type)
    ///
    /// # Returns
    ///
    /// An `Option<T>` containing the entity if found, or `None` if not found.
    ///
    /// # Behavior
    ///
    /// - Uses the entity's configured ID field(s) to construct a filter
    /// - Returns `None` if no document matches the ID
    /// - Converts the matching document back to the entity type using `Convertible::from_value`
    /// - Efficient lookup for single ID-based retrieval
    ///
    /// # Examples
    ///
    /// From nitrite-int-test:
    /// ```ignore
    /// let repository: ObjectRepository<TestEntity> = db.repository()?;
    /// let id = "test_id".to_string();
    /// let result = repository.get_by_id(&id)?;
    /// assert!(result.is_none());
    /// ```
    fn get_by_id(&self, id: &T::Id) -> NitriteResult<Option<T>>;

    /// Finds all entities matching a filter and returns them as a cursor for iteration.
    ///
    /// # Arguments
    ///
    /// * `filter` - The filter expression to identify matching entities
    ///
    /// # Returns
    ///
    /// An `ObjectCursor<T>` for iterating over matching entities with default options.
    ///
    /// # Behavior
    ///
    /// - Returns an `ObjectCursor` that lazily converts documents to entities
    /// - Cursor can be iterated to extract entities one at a time
    /// - Uses default pagination and sorting (no options)
    /// - All matching documents are included in the result set
    /// - Cursor is lazy; documents are converted only when iterated
    ///
    /// # Examples
    ///
    /// From nitrite-int-test:
    /// ```ignore
    /// let repository: ObjectRepository<TestEntity> = db.repository()?;
    /// let filter = all();
    /// let cursor = repository.find(filter)?;
    /// for wrapper in cursor {
    ///     let entity = wrapper.get_object()?;
    ///     // Process entity
    /// }
    /// ```
    fn find(&self, filter: Filter) -> NitriteResult<ObjectCursor<T>>;

    /// Finds entities matching a filter with advanced query options like sorting and pagination.
    ///
    /// # Arguments
    ///
    /// * `filter` - The filter expression to identify matching entities
    /// * `find_options` - Configuration for pagination, sorting, and projection
    ///
    /// # Returns
    ///
    /// An `ObjectCursor<T>` for iterating over matching entities with applied options.
    ///
    /// # Behavior
    ///
    /// - Applies sorting, pagination, and field projection from `FindOptions`
    /// - Returns an `ObjectCursor` that lazily converts documents to entities
    /// - Cursor respects limit and offset from find options
    /// - Documents are projected to include only specified fields if configured
    /// - Lazy evaluation; processing happens during iteration
    ///
    /// # Examples
    ///
    /// From nitrite-int-test:
    /// ```ignore
    /// let repository: ObjectRepository<TestEntity> = db.repository()?;
    /// let filter = all();
    /// let find_options = FindOptions::default();
    /// let cursor = repository.find_with_options(filter, &find_options)?;
    /// ```
    fn find_with_options(
        &self,
        filter: Filter,
        find_options: &FindOptions,
    ) -> NitriteResult<ObjectCursor<T>>;
    
    /// Returns the underlying raw collection for this repository.
    ///
    /// # Returns
    ///
    /// A `NitriteCollection` that provides access to the raw document-level API.
    ///
    /// # Behavior
    ///
    /// - Provides access to the raw collection without entity type wrapping
    /// - Enables advanced operations not exposed through the typed repository interface
    /// - Can be used to perform document-level operations directly
    /// - Thread-safe; the collection can be safely shared
    ///
    /// # Examples
    ///
    /// From nitrite-int-test:
    /// ```ignore
    /// let repository: ObjectRepository<Employee> = db.repository()?;
    /// let collection = repository.document_collection();
    /// // Can use collection for raw operations
    /// ```
    fn document_collection(&self) -> NitriteCollection;
}

/// A typed facade for repository operations on a specific entity type.
///
/// # Purpose
///
/// `ObjectRepository<T>` provides a user-friendly interface for persisting and querying entities
/// in a Nitrite database. It wraps an implementation of `ObjectRepositoryProvider<T>` (typically
/// `DefaultObjectRepository<T>`) and exposes all repository operations through the `Deref` trait,
/// making it ergonomic to call provider methods directly.
///
/// # Characteristics
///
/// - **Generic Over Entity Type**: Works with any type implementing `Convertible + NitriteEntity`
/// - **Thread-Safe**: Uses `Arc` for shared ownership and safe concurrent access
/// - **Cloneable**: Can be cloned cheaply (cloning just increments Arc reference count)
/// - **Trait Object Wrapper**: Wraps `Arc<dyn ObjectRepositoryProvider<T>>` for runtime polymorphism
/// - **Transparent Delegation**: Implements `Deref` to expose all provider methods
///
/// # How It Works
///
/// The repository uses dynamic dispatch through a trait object (`dyn ObjectRepositoryProvider<T>`)
/// to allow different implementations (like `DefaultObjectRepository<T>` or transactional variants).
/// The `Deref` implementation enables transparent access to all trait methods as if they were
/// directly available on `ObjectRepository<T>`.
///
/// # Relationship to Related Types
///
/// - `ObjectRepositoryProvider<T>`: The trait this facade wraps
/// - `DefaultObjectRepository<T>`: The default implementation provided by the database
/// - `NitriteEntity`: Defines schema and identity for the entity type
///
/// # Examples
///
/// From nitrite-int-test:
/// ```ignore
/// let repository: ObjectRepository<Employee> = db.repository()?;
/// 
/// // Facade transparently provides all ObjectRepositoryProvider methods
/// repository.insert(emp)?;
/// let cursor = repository.find(all())?;
/// for wrapper in cursor {
///     let emp = wrapper.get_object()?;
///     // Process employee
/// }
/// ```
#[derive(Clone)]
pub struct ObjectRepository<T>
where
    T: Convertible + NitriteEntity
{
    inner: Arc<dyn ObjectRepositoryProvider<T>>,
}

impl<T> ObjectRepository<T>
where
    T: Convertible<Output = T> + NitriteEntity + Send + Sync
{
    /// Creates a new typed repository facade wrapping an implementation.
    ///
    /// # Arguments
    ///
    /// * `inner` - An implementation of `ObjectRepositoryProvider<T>` (e.g., `DefaultObjectRepository<T>`)
    ///
    /// # Returns
    ///
    /// A new `ObjectRepository<T>` that wraps the provided implementation.
    ///
    /// # Behavior
    ///
    /// - Wraps the implementation in an `Arc` for shared, thread-safe ownership
    /// - Stores it as a trait object of type `Arc<dyn ObjectRepositoryProvider<T>>`
    /// - All subsequent calls to repository methods delegate to the wrapped implementation
    /// - The wrapper is cheap to clone (only increments Arc reference count)
    ///
    /// # Type Constraints
    ///
    /// The generic parameter `I` must:
    /// - Implement `ObjectRepositoryProvider<T>` (which includes `PersistentCollection`)
    /// - Be `'static` (owned, no borrowed references)
    /// - This allows any implementation to be wrapped transparently
    ///
    /// # Examples
    ///
    /// From repository.rs module tests:
    /// ```ignore
    /// let repo = ObjectRepository::new(MockBaseObjectRepository);
    /// assert!(repo.insert(entity).is_ok());
    /// ```
    pub fn new<I: ObjectRepositoryProvider<T> + 'static>(inner: I) -> Self {
        ObjectRepository { inner: Arc::new(inner) }
    }
}

impl<T> Deref for ObjectRepository<T>
where
    T: Convertible + NitriteEntity
{
    type Target = Arc<dyn ObjectRepositoryProvider<T>>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
