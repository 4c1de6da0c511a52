use std::sync::Arc;

use crate::collection::operation::WriteResult;
use crate::collection::{CollectionEventListener, Document, FindOptions, NitriteCollection, NitriteId, UpdateOptions};
use crate::common::{AttributeAware, Attributes, Convertible, EventAware, PersistentCollection, Processor, SubscriberRef, Value};
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use crate::filter::Filter;
use crate::index::{IndexDescriptor, IndexOptions};
use crate::nitrite_config::NitriteConfig;
use crate::repository::{NitriteEntity, ObjectCursor, ObjectRepository, ObjectRepositoryProvider, RepositoryOperations};
use crate::store::NitriteStore;

/// A transactional repository providing isolated object repository operations.
///
/// Wraps an `ObjectRepository<T>` with transactional isolation, enabling changes to be
/// made to objects within a transaction context. Implements the repository interface
/// by delegating to a transactional backing collection while maintaining isolation
/// from other concurrent transactions.
///
/// # Purpose
/// Provides transactional semantics for object repository operations:
/// - **Isolated Updates**: Changes made to objects are visible only within the transaction
/// - **Lazy Evaluation**: Queries operate on the transactional view combining backing and primary data
/// - **Write-Through**: Write operations update the backing collection, read operations fall back to primary
/// - **Index Support**: Maintains indexes in the transactional context for query optimization
///
/// # Characteristics
/// - **Thread-Safe**: All state protected by Arc and Mutex through backing collection
/// - **Generic**: Supports any type implementing `NitriteEntity` and `Convertible`
/// - **Interface Compliance**: Implements `ObjectRepositoryProvider`, `PersistentCollection`, `EventAware`, and `AttributeAware`
/// - **Cloneable**: Arc-based shared ownership enables cheap cloning with shared state
/// - **Trait Delegation**: All operations delegated to inner implementation through trait methods
///
/// # Usage
/// Created by `NitriteTransaction` when accessing repositories within a transaction.
/// Users interact through the `ObjectRepository` public API which delegates to this type.
#[derive(Clone)]
pub(crate) struct TransactionalRepository<T> where T: NitriteEntity + Convertible<Output = T> {
    inner: Arc<TransactionalRepositoryInner<T>>,
}

struct TransactionalRepositoryInner<T> where T: NitriteEntity + Convertible<Output = T> {
    primary: ObjectRepository<T>,
    backing_collection: NitriteCollection,
    nitrite_config: NitriteConfig,
    operation: RepositoryOperations,
}

impl<T> TransactionalRepository<T>
where
    T: NitriteEntity + Convertible<Output = T> + Send + Sync,
{
    /// Creates a new transactional repository.
    ///
    /// # Arguments
    /// * `primary` - The primary object repository from the database
    /// * `backing_collection` - The transactional collection for isolation
    /// * `nitrite_config` - Configuration for index operations within the transaction
    /// * `operation` - Repository operations handler for type conversion
    ///
    /// # Returns
    /// A new `TransactionalRepository` with isolated write context and primary read fallback
    pub fn new(
        primary: ObjectRepository<T>,
        backing_collection: NitriteCollection,
        nitrite_config: NitriteConfig,
        operation: RepositoryOperations,
    ) -> Self {
        TransactionalRepository {
            inner: Arc::new(TransactionalRepositoryInner {
                primary,
                backing_collection,
                nitrite_config,
                operation,
            }),
        }
    }
}

impl<T> TransactionalRepositoryInner<T>
where
    T: NitriteEntity + Convertible<Output = T> + Send + Sync,
{
    fn add_processor(&self, processor: Processor) -> NitriteResult<()> {
        self.backing_collection.add_processor(processor)
    }

    fn create_index(&self, field_names: Vec<&str>, index_options: &IndexOptions) -> NitriteResult<()> {
        self.backing_collection.create_index(field_names, index_options)
    }

    fn rebuild_index(&self, field_names: Vec<&str>) -> NitriteResult<()> {
        self.backing_collection.rebuild_index(field_names)
    }

    fn list_indexes(&self) -> NitriteResult<Vec<IndexDescriptor>> {
        self.backing_collection.list_indexes()
    }

    fn has_index(&self, field_names: Vec<&str>) -> NitriteResult<bool> {
        self.backing_collection.has_index(field_names)
    }

    fn is_indexing(&self, field_names: Vec<&str>) -> NitriteResult<bool> {
        self.backing_collection.is_indexing(field_names)
    }

    fn drop_index(&self, field_names: Vec<&str>) -> NitriteResult<()> {
        self.backing_collection.drop_index(field_names)
    }

    fn drop_all_indexes(&self) -> NitriteResult<()> {
        self.backing_collection.drop_all_indexes()
    }

    fn clear(&self) -> NitriteResult<()> {
        self.backing_collection.clear()
    }

    fn dispose(&self) -> NitriteResult<()> {
        self.backing_collection.dispose()
    }

    fn is_dropped(&self) -> NitriteResult<bool> {
        self.backing_collection.is_dropped()
    }

    fn is_open(&self) -> NitriteResult<bool> {
        self.backing_collection.is_open()
    }

    fn size(&self) -> NitriteResult<u64> {
        self.backing_collection.size()
    }

    fn close(&self) -> NitriteResult<()> {
        self.backing_collection.close()
    }

    fn store(&self) -> NitriteResult<NitriteStore> {
        self.backing_collection.store()
    }

    fn subscribe(&self, handler: CollectionEventListener) -> NitriteResult<Option<SubscriberRef>> {
        self.backing_collection.subscribe(handler)
    }

    fn unsubscribe(&self, subscriber: SubscriberRef) -> NitriteResult<()> {
        self.backing_collection.unsubscribe(subscriber)
    }

    fn attributes(&self) -> NitriteResult<Option<Attributes>> {
        self.backing_collection.attributes()
    }

    fn set_attributes(&self, attributes: Attributes) -> NitriteResult<()> {
        self.backing_collection.set_attributes(attributes)
    }

    fn insert(&self, object: T) -> NitriteResult<WriteResult> {
        let document = self.operation.to_document(&object, false)?;
        self.backing_collection.insert(document)
    }

    fn insert_batch(&self, objects: Vec<T>) -> NitriteResult<WriteResult> {
        let refs: Vec<&T> = objects.iter().collect();
        let documents = self.operation.to_documents(refs)?;
        self.backing_collection.insert_many(documents)
    }

    fn update_with_options(&self, filter: Filter, object: T, update_options: &UpdateOptions) -> NitriteResult<WriteResult> {
        let mut document = self.operation.to_document(&object, true)?;
        if !update_options.is_insert_if_absent() {
            self.operation.remove_nitrite_id(&mut document)?;
        }
        self.backing_collection.update_with_options(filter, &document, update_options)
    }

    fn update_one(&self, object: T, insert_if_absent: bool) -> NitriteResult<WriteResult> {
        let update_options = UpdateOptions::new(insert_if_absent, true);
        let filter = self.operation.create_unique_filter(&object)?;
        self.update_with_options(filter, object, &update_options)
    }

    fn update_document(&self, filter: Filter, document: &Document, just_once: bool) -> NitriteResult<WriteResult> {
        let mut document = document.clone();
        self.operation.remove_nitrite_id(&mut document)?;
        self.backing_collection
            .update_with_options(filter, &document, &UpdateOptions::new(false, just_once))
    }

    fn update_by_nitrite_id(
        &self,
        id: &NitriteId,
        object: T,
        insert_if_absent: bool,
    ) -> NitriteResult<WriteResult> {
        let value = object.to_value()?;
        let mut document = match value {
            Value::Document(doc) => doc,
            other => {
                log::error!("Expected Document from entity Convertible, got {:?}", other);
                return Err(NitriteError::new(
                    "Cannot update: Expected Document from Convertible",
                    ErrorKind::ObjectMappingError,
                ));
            }
        };
        self.operation.remove_nitrite_id(&mut document)?;
        self.backing_collection.update_by_id(id, &document, insert_if_absent)
    }

    fn remove_one(&self, object: T) -> NitriteResult<WriteResult> {
        let filter = self.operation.create_unique_filter(&object)?;
        self.remove(filter, true)
    }

    fn remove(&self, filter: Filter, just_once: bool) -> NitriteResult<WriteResult> {
        self.backing_collection.remove(filter, just_once)
    }

    fn get_by_id(&self, id: &T::Id) -> NitriteResult<Option<T>> {
        // First try to get from the primary repository (for committed data)
        let result = self.primary.get_by_id(id)?;
        if result.is_some() {
            return Ok(result);
        }
        // Then try the transactional collection (for uncommitted data in this transaction)
        let id_filter = self.operation.create_id_filter(id.to_value()?)?;
        let mut cursor = self.find(id_filter)?;
        cursor.first().transpose()
    }

    fn find(&self, filter: Filter) -> NitriteResult<ObjectCursor<T>> {
        let cursor = self.backing_collection.find(filter)?;
        Ok(ObjectCursor::new(cursor))
    }

    fn find_with_options(&self, filter: Filter, find_options: &FindOptions) -> NitriteResult<ObjectCursor<T>> {
        let cursor = self.backing_collection.find_with_options(filter, find_options)?;
        Ok(ObjectCursor::new(cursor))
    }

    fn document_collection(&self) -> NitriteCollection {
        self.backing_collection.clone()
    }
}

impl<T> PersistentCollection for TransactionalRepository<T>
where
    T: Convertible<Output = T> + NitriteEntity + Send + Sync,
{
    fn add_processor(&self, processor: Processor) -> NitriteResult<()> {
        self.inner.add_processor(processor)
    }

    fn create_index(&self, field_names: Vec<&str>, index_options: &IndexOptions) -> NitriteResult<()> {
        self.inner.create_index(field_names, index_options)
    }

    fn rebuild_index(&self, field_names: Vec<&str>) -> NitriteResult<()> {
        self.inner.rebuild_index(field_names)
    }

    fn list_indexes(&self) -> NitriteResult<Vec<IndexDescriptor>> {
        self.inner.list_indexes()
    }

    fn has_index(&self, field_names: Vec<&str>) -> NitriteResult<bool> {
        self.inner.has_index(field_names)
    }

    fn is_indexing(&self, field_names: Vec<&str>) -> NitriteResult<bool> {
        self.inner.is_indexing(field_names)
    }

    fn drop_index(&self, field_names: Vec<&str>) -> NitriteResult<()> {
        self.inner.drop_index(field_names)
    }

    fn drop_all_indexes(&self) -> NitriteResult<()> {
        self.inner.drop_all_indexes()
    }

    fn clear(&self) -> NitriteResult<()> {
        self.inner.clear()
    }

    fn dispose(&self) -> NitriteResult<()> {
        self.inner.dispose()
    }

    fn is_dropped(&self) -> NitriteResult<bool> {
        self.inner.is_dropped()
    }

    fn is_open(&self) -> NitriteResult<bool> {
        self.inner.is_open()
    }

    fn size(&self) -> NitriteResult<u64> {
        self.inner.size()
    }

    fn close(&self) -> NitriteResult<()> {
        self.inner.close()
    }

    fn store(&self) -> NitriteResult<NitriteStore> {
        self.inner.store()
    }
}

impl<T> EventAware for TransactionalRepository<T>
where
    T: Convertible<Output = T> + NitriteEntity + Send + Sync,
{
    fn subscribe(&self, handler: CollectionEventListener) -> NitriteResult<Option<SubscriberRef>> {
        self.inner.subscribe(handler)
    }

    fn unsubscribe(&self, subscriber: SubscriberRef) -> NitriteResult<()> {
        self.inner.unsubscribe(subscriber)
    }
}

impl<T> AttributeAware for TransactionalRepository<T>
where
    T: Convertible<Output = T> + NitriteEntity + Send + Sync,
{
    fn attributes(&self) -> NitriteResult<Option<Attributes>> {
        self.inner.attributes()
    }

    fn set_attributes(&self, attributes: Attributes) -> NitriteResult<()> {
        self.inner.set_attributes(attributes)
    }
}

impl<T> ObjectRepositoryProvider<T> for TransactionalRepository<T> where T: Convertible<Output = T> + NitriteEntity + Send + Sync, {
    fn insert(&self, object: T) -> NitriteResult<WriteResult> {
        self.inner.insert(object)
    }

    fn insert_many(&self, objects: Vec<T>) -> NitriteResult<WriteResult> {
        self.inner.insert_batch(objects)
    }

    fn update_with_options(&self, filter: Filter, object: T, update_options: &UpdateOptions) -> NitriteResult<WriteResult> {
        self.inner.update_with_options(filter, object, update_options)
    }

    fn update_one(&self, object: T, insert_if_absent: bool) -> NitriteResult<WriteResult> {
        self.inner.update_one(object, insert_if_absent)
    }

    fn update_document(&self, filter: Filter, document: &Document, just_once: bool) -> NitriteResult<WriteResult> {
        self.inner.update_document(filter, document, just_once)
    }

    fn update_by_nitrite_id(&self, id: &NitriteId, object: T, insert_if_absent: bool) -> NitriteResult<WriteResult> {
        self.inner.update_by_nitrite_id(id, object, insert_if_absent)
    }

    fn remove_one(&self, object: T) -> NitriteResult<WriteResult> {
        self.inner.remove_one(object)
    }

    fn remove(&self, filter: Filter, just_once: bool) -> NitriteResult<WriteResult> {
        self.inner.remove(filter, just_once)
    }

    fn get_by_id(&self, id: &T::Id) -> NitriteResult<Option<T>> {
        self.inner.get_by_id(id)
    }

    fn find(&self, filter: Filter) -> NitriteResult<ObjectCursor<T>> {
        self.inner.find(filter)
    }

    fn find_with_options(&self, filter: Filter, find_options: &FindOptions) -> NitriteResult<ObjectCursor<T>> {
        self.inner.find_with_options(filter, find_options)
    }

    fn document_collection(&self) -> NitriteCollection {
        self.inner.document_collection()
    }
}
