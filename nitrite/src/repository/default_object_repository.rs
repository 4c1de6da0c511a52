use crate::collection::operation::WriteResult;
use crate::collection::{
    CollectionEventListener, Document, FindOptions, NitriteCollection, NitriteCollectionProvider,
    NitriteId, UpdateOptions,
};
use crate::common::{
    AttributeAware, Attributes, Convertible, EventAware, PersistentCollection, Processor,
    SubscriberRef, Value,
};
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use crate::filter::Filter;
use crate::index::{IndexDescriptor, IndexOptions};
use crate::repository::cursor::ObjectCursor;
use crate::repository::repository::ObjectRepositoryProvider;
use crate::repository::repository_operations::RepositoryOperations;
use crate::repository::NitriteEntity;
use crate::store::NitriteStore;
use std::any::TypeId;
use std::marker::PhantomData;
use std::sync::Arc;

pub(crate) struct DefaultObjectRepository<T> {
    nitrite_collection: NitriteCollection,
    repository_operations: RepositoryOperations,
    _phantom: PhantomData<T>,
}

impl<T> DefaultObjectRepository<T> {
    pub(crate) fn new(
        nitrite_collection: NitriteCollection,
        repository_operations: RepositoryOperations,
    ) -> DefaultObjectRepository<T> {
        DefaultObjectRepository {
            nitrite_collection,
            repository_operations,
            _phantom: PhantomData,
        }
    }
}

impl<T> PersistentCollection for DefaultObjectRepository<T>
where
    T: Convertible + NitriteEntity + Send + Sync,
{
    fn add_processor(&self, processor: Processor) -> NitriteResult<()> {
        self.nitrite_collection.add_processor(processor)
    }

    fn create_index(
        &self,
        field_names: Vec<&str>,
        index_options: &IndexOptions,
    ) -> NitriteResult<()> {
        self.nitrite_collection
            .create_index(field_names, index_options)
    }

    fn rebuild_index(&self, field_names: Vec<&str>) -> NitriteResult<()> {
        self.nitrite_collection.rebuild_index(field_names)
    }

    fn list_indexes(&self) -> NitriteResult<Vec<IndexDescriptor>> {
        self.nitrite_collection.list_indexes()
    }

    fn has_index(&self, field_names: Vec<&str>) -> NitriteResult<bool> {
        self.nitrite_collection.has_index(field_names)
    }

    fn is_indexing(&self, field_names: Vec<&str>) -> NitriteResult<bool> {
        self.nitrite_collection.is_indexing(field_names)
    }

    fn drop_index(&self, field_names: Vec<&str>) -> NitriteResult<()> {
        self.nitrite_collection.drop_index(field_names)
    }

    fn drop_all_indexes(&self) -> NitriteResult<()> {
        self.nitrite_collection.drop_all_indexes()
    }

    fn clear(&self) -> NitriteResult<()> {
        self.nitrite_collection.clear()
    }

    fn dispose(&self) -> NitriteResult<()> {
        self.nitrite_collection.dispose()
    }

    fn is_dropped(&self) -> NitriteResult<bool> {
        self.nitrite_collection.is_dropped()
    }

    fn is_open(&self) -> NitriteResult<bool> {
        self.nitrite_collection.is_open()
    }

    fn size(&self) -> NitriteResult<u64> {
        self.nitrite_collection.size()
    }

    fn close(&self) -> NitriteResult<()> {
        self.nitrite_collection.close()
    }

    fn store(&self) -> NitriteResult<NitriteStore> {
        self.nitrite_collection.store()
    }
}

impl<T> EventAware for DefaultObjectRepository<T> {
    fn subscribe(&self, handler: CollectionEventListener) -> NitriteResult<Option<SubscriberRef>> {
        self.nitrite_collection.subscribe(handler)
    }

    fn unsubscribe(&self, subscriber: SubscriberRef) -> NitriteResult<()> {
        self.nitrite_collection.unsubscribe(subscriber)
    }
}

impl<T> AttributeAware for DefaultObjectRepository<T> {
    fn attributes(&self) -> NitriteResult<Option<Attributes>> {
        self.nitrite_collection.attributes()
    }

    fn set_attributes(&self, attributes: Attributes) -> NitriteResult<()> {
        self.nitrite_collection.set_attributes(attributes)
    }
}

impl<T> ObjectRepositoryProvider<T> for DefaultObjectRepository<T>
where
    T: Convertible<Output = T> + NitriteEntity + Send + Sync,
{
    fn insert(&self, object: T) -> NitriteResult<WriteResult> {
        let document = self.repository_operations.to_document(&object, false)?;
        self.nitrite_collection.insert(document)
    }

    fn insert_many(&self, objects: Vec<T>) -> NitriteResult<WriteResult> {
        let refs: Vec<&T> = objects.iter().collect();
        let documents = self.repository_operations.to_documents(refs)?;
        self.nitrite_collection.insert_many(documents)
    }

    fn update_with_options(
        &self,
        filter: Filter,
        object: T,
        update_options: &UpdateOptions,
    ) -> NitriteResult<WriteResult> {
        let mut document = self.repository_operations.to_document(&object, true)?;
        if !update_options.is_insert_if_absent() {
            self.repository_operations
                .remove_nitrite_id(&mut document)?;
        }

        self.nitrite_collection
            .update_with_options(filter, &document, update_options)
    }

    fn update_one(&self, object: T, insert_if_absent: bool) -> NitriteResult<WriteResult> {
        let update_options = UpdateOptions::new(insert_if_absent, true);
        let filter = self.repository_operations.create_unique_filter(&object)?;
        self.update_with_options(filter, object, &update_options)
    }

    fn update_document(
        &self,
        filter: Filter,
        document: &Document,
        just_once: bool,
    ) -> NitriteResult<WriteResult> {
        let mut document = document.clone();
        self.repository_operations
            .remove_nitrite_id(&mut document)?;
        self.nitrite_collection
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
        
        // Remove NitriteId from the update document (it's already known via the id parameter)
        self.repository_operations.remove_nitrite_id(&mut document)?;
        
        self.nitrite_collection.update_by_id(id, &document, insert_if_absent)
    }

    fn remove_one(&self, object: T) -> NitriteResult<WriteResult> {
        let filter = self.repository_operations.create_unique_filter(&object)?;
        self.remove(filter, true)
    }

    fn remove(&self, filter: Filter, just_once: bool) -> NitriteResult<WriteResult> {
        self.nitrite_collection.remove(filter, just_once)
    }

    fn get_by_id(&self, id: &T::Id) -> NitriteResult<Option<T>> {
        if TypeId::of::<T::Id>() == TypeId::of::<()>() {
            log::error!("Entity {} does not have an id field", T::default().entity_name());
            return Err(NitriteError::new(
                "Entity does not have an id field",
                ErrorKind::InvalidOperation,
            ));
        }
        
        let id_filter = self
            .repository_operations
            .create_id_filter(id.to_value()?)?;
        let mut cursor = self.find(id_filter)?;
        cursor.first().transpose()
    }

    fn find(&self, filter: Filter) -> NitriteResult<ObjectCursor<T>> {
        let cursor = self.nitrite_collection.find(filter)?;
        Ok(ObjectCursor::new(cursor))
    }

    fn find_with_options(
        &self,
        filter: Filter,
        find_options: &FindOptions,
    ) -> NitriteResult<ObjectCursor<T>> {
        let cursor = self.nitrite_collection.find_with_options(filter, find_options)?;
        Ok(ObjectCursor::new(cursor))
    }

    fn document_collection(&self) -> NitriteCollection {
        self.nitrite_collection.clone()
    }
}
