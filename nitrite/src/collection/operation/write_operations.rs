use super::{
    index_writer::DocumentIndexWriter, read_operations::ReadOperations, write_result::WriteResult,
};
use crate::{
    collection::{
        CollectionEventInfo, CollectionEventListener, CollectionEvents, Document, FindOptions, NitriteId, UpdateOptions
    }, common::get_current_time_or_zero, errors::{ErrorKind, NitriteError, NitriteResult}, filter::Filter, get_current_time, store::{NitriteMap, NitriteMapProvider}, Key, NitriteEventBus, ProcessorChain, ProcessorProvider, Value, DOC_ID, DOC_MODIFIED, DOC_REVISION, DOC_SOURCE, REPLICATOR
};
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct WriteOperations {
    inner: Arc<WriteOperationsInner>,
}

impl WriteOperations {
    /// Creates a new WriteOperations instance with the required components.
    pub fn new(
        document_index_writer: DocumentIndexWriter,
        read_operations: ReadOperations,
        event_bus: NitriteEventBus<CollectionEventInfo, CollectionEventListener>,
        nitrite_map: NitriteMap,
        processor_chain: ProcessorChain,
    ) -> Self {
        let inner = WriteOperationsInner::new(
            document_index_writer,
            read_operations,
            event_bus,
            nitrite_map,
            processor_chain,
        );

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Returns the document index writer for handling index operations.
    fn document_index_writer(&self) -> DocumentIndexWriter {
        self.inner.document_index_writer.clone()
    }

    /// Returns the read operations handler for querying documents.
    fn read_operations(&self) -> ReadOperations {
        self.inner.read_operations.clone()
    }

    /// Returns the event bus for publishing collection events.
    fn event_bus(&self) -> NitriteEventBus<CollectionEventInfo, CollectionEventListener> {
        self.inner.event_bus.clone()
    }

    /// Returns the underlying nitrite map for direct document storage access.
    fn nitrite_map(&self) -> NitriteMap {
        self.inner.nitrite_map.clone()
    }

    /// Returns the processor chain for pre-write document processing.
    fn processor_chain(&self) -> ProcessorChain {
        self.inner.processor_chain.clone()
    }

    /// Inserts a single document into the collection.
    pub fn insert(&self, document: Document) -> NitriteResult<WriteResult> {
        self.inner.insert(document)
    }

    /// Inserts multiple documents into the collection using optimized batch operations.
    pub fn insert_batch(&self, documents: Vec<Document>) -> NitriteResult<WriteResult> {
        self.inner.insert_batch(documents)
    }

    /// Updates documents matching a filter with the provided update fields.
    pub fn update(
        &self,
        filter: Filter,
        update: &Document,
        update_options: &UpdateOptions,
    ) -> NitriteResult<WriteResult> {
        self.inner.update(filter, update, update_options)
    }

    /// Updates a document directly by its NitriteId without filter-based lookup.
    pub fn update_by_id(
        &self,
        id: &NitriteId,
        update: &Document,
        insert_if_absent: bool,
    ) -> NitriteResult<WriteResult> {
        self.inner.update_by_id(id, update, insert_if_absent)
    }

    /// Removes documents matching a filter.
    pub fn remove(&self, filter: Filter, just_once: bool) -> NitriteResult<WriteResult> {
        self.inner.remove(filter, just_once)
    }

    /// Removes a specific document from the collection.
    pub fn remove_document(&self, document: &Document) -> NitriteResult<WriteResult> {
        self.inner.remove_document(document)
    }
}

/// Inner implementation of write operations containing the actual business logic.
struct WriteOperationsInner {
    document_index_writer: DocumentIndexWriter,
    read_operations: ReadOperations,
    event_bus: NitriteEventBus<CollectionEventInfo, CollectionEventListener>,
    nitrite_map: NitriteMap,
    processor_chain: ProcessorChain,
}

impl WriteOperationsInner {
    fn new(
        document_index_writer: DocumentIndexWriter,
        read_operations: ReadOperations,
        event_bus: NitriteEventBus<CollectionEventInfo, CollectionEventListener>,
        nitrite_map: NitriteMap,
        processor_chain: ProcessorChain,
    ) -> Self {
        Self {
            document_index_writer,
            read_operations,
            event_bus,
            nitrite_map,
            processor_chain,
        }
    }

    pub fn insert(&self, document: Document) -> NitriteResult<WriteResult> {
        self.insert_batch(vec![document])
    }

    pub fn insert_batch(&self, documents: Vec<Document>) -> NitriteResult<WriteResult> {
        if documents.is_empty() {
            return Ok(WriteResult::new(vec![]));
        }
        
        // For small batches, use simple sequential processing
        // (overhead of batch coordination exceeds benefits)
        if documents.len() <= 10 {
            return self.insert_batch_sequential(documents);
        }
        
        // For larger batches, use optimized batch insert with put_all
        self.insert_batch_optimized(documents)
    }
    
    /// Sequential insert for small batches - simple and efficient for few documents
    fn insert_batch_sequential(&self, documents: Vec<Document>) -> NitriteResult<WriteResult> {
        let mut nitrite_ids = Vec::with_capacity(documents.len());
        for document in documents {
            let id = self.process_insert(document)?;
            nitrite_ids.push(id);
        }
        Ok(WriteResult::new(nitrite_ids))
    }
    
    /// Optimized batch insert using put_all for larger batches.
    /// 
    /// This method uses a three-phase approach:
    /// 1. Prepare: Process all documents (metadata, pre-write processing)
    /// 2. Validate: Check for duplicate NitriteIds (primary key constraint)
    /// 3. Commit: Use put_all for atomic batch storage, then write indexes
    /// 
    /// Note: Unique index constraint violations are detected during index writing (Phase 4).
    /// If a unique index violation occurs, all successfully indexed documents and stored
    /// documents are rolled back to maintain consistency.
    fn insert_batch_optimized(&self, documents: Vec<Document>) -> NitriteResult<WriteResult> {
        let batch_size = documents.len();
        
        // Phase 1: Prepare all documents and collect metadata
        let prepared: Vec<(NitriteId, Document, Document, String)> = documents
            .into_iter()
            .map(|doc| self.prepare_document_for_insert(doc))
            .collect::<NitriteResult<Vec<_>>>()?;
        
        // Phase 2: Check for duplicate NitriteIds (primary key uniqueness)
        let keys: Vec<_> = prepared.iter()
            .map(|(id, _, _, _)| Value::NitriteId(*id))
            .collect();
        
        self.validate_no_duplicates(&keys)?;
        
        // Collect all IDs upfront for potential rollback (put_all stores all at once)
        let all_ids: Vec<NitriteId> = prepared.iter()
            .map(|(id, _, _, _)| *id)
            .collect();
        
        // Phase 3: Batch write using put_all
        let entries: Vec<(Key, Value)> = prepared.iter()
            .map(|(id, processed_doc, _, _)| {
                (Value::NitriteId(*id), Value::Document(processed_doc.clone()))
            })
            .collect();
        
        self.nitrite_map.put_all(entries)
            .map_err(|e| NitriteError::new(
                &format!("Failed to batch insert documents: {}", e),
                e.kind().clone(),
            ))?;
        
        // Phase 4: Write index entries and publish events
        // Track successfully indexed documents for potential rollback
        // Unique index constraint violations are detected here
        let mut nitrite_ids = Vec::with_capacity(batch_size);
        let mut indexed_docs: Vec<Document> = Vec::with_capacity(batch_size);
        
        for (id, mut processed_doc, original_doc, source) in prepared {
            // Write index entries - this is where unique index violations are detected
            if let Err(e) = self.document_index_writer.write_index_entry(&mut processed_doc) {
                // Rollback: remove index entries for successfully indexed documents
                self.rollback_batch_indexes(&indexed_docs);
                // Rollback: remove ALL stored documents (put_all stored them all at once)
                self.rollback_batch_insert(&all_ids);
                
                return Err(NitriteError::new(
                    &format!("Failed to write index entries during batch insert (unique constraint violation?): {}", e),
                    e.kind().clone(),
                ));
            }
            
            // Track successfully indexed document for potential rollback
            indexed_docs.push(processed_doc.clone());
            
            // Publish event
            let value = Value::Document(original_doc);
            let event = CollectionEventInfo::new(Some(value), CollectionEvents::Insert, source);
            if let Err(e) = self.event_bus.publish(event) {
                log::warn!("Failed to publish insert event for {}: {}", id, e);
                // Don't fail the operation for event publishing errors
            }
            
            nitrite_ids.push(id);
        }
        
        Ok(WriteResult::new(nitrite_ids))
    }
    
    /// Prepares a document for insertion by setting metadata and processing.
    /// Returns: (NitriteId, processed_doc, original_doc, source)
    fn prepare_document_for_insert(&self, document: Document) -> NitriteResult<(NitriteId, Document, Document, String)> {
        let mut new_doc = document;
        let nitrite_id = new_doc.id()
            .map_err(|e| NitriteError::new(
                &format!("Failed to retrieve document ID during insert: {}", e),
                e.kind().clone(),
            ))?;
        let source = new_doc.source()
            .map_err(|e| NitriteError::new(
                &format!("Failed to retrieve document source during insert: {}", e),
                e.kind().clone(),
            ))?;
        let time = get_current_time_or_zero();

        if REPLICATOR.ne(&source) {
            new_doc.remove(DOC_SOURCE)
                .map_err(|e| NitriteError::new(
                    &format!("Failed to remove document source field during insert: {}", e),
                    e.kind().clone(),
                ))?;
            new_doc.put(DOC_REVISION, Value::I32(1))
                .map_err(|e| NitriteError::new(
                    &format!("Failed to set document revision during insert: {}", e),
                    e.kind().clone(),
                ))?;
            new_doc.put(DOC_MODIFIED, Value::U128(time))
                .map_err(|e| NitriteError::new(
                    &format!("Failed to set document modification time during insert: {}", e),
                    e.kind().clone(),
                ))?;
        } else {
            new_doc.remove(DOC_SOURCE)
                .map_err(|e| NitriteError::new(
                    &format!("Failed to remove document source field during replication insert: {}", e),
                    e.kind().clone(),
                ))?;
        }

        let processed = self.processor_chain.process_before_write(new_doc.clone())
            .map_err(|e| NitriteError::new(
                &format!("Failed to process document before write during insert: {}", e),
                e.kind().clone(),
            ))?;
        
        Ok((nitrite_id, processed, new_doc, source))
    }
    
    /// Validates that none of the keys already exist in the map.
    /// Uses parallel checking for large batches.
    fn validate_no_duplicates(&self, keys: &[Value]) -> NitriteResult<()> {
        // For large batches, use parallel validation
        if keys.len() > 50 {
            let num_threads = std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
                .min(keys.len());
            
            let chunk_size = keys.len().div_ceil(num_threads);
            let chunks: Vec<_> = keys.chunks(chunk_size).collect();
            
            let results: Vec<NitriteResult<Option<NitriteId>>> = std::thread::scope(|s| {
                let handles: Vec<_> = chunks
                    .into_iter()
                    .map(|chunk| {
                        s.spawn(move || {
                            for key in chunk {
                                if self.nitrite_map.contains_key(key)? {
                                    if let Value::NitriteId(id) = key {
                                        return Ok(Some(*id));
                                    }
                                }
                            }
                            Ok(None)
                        })
                    })
                    .collect();
                
                handles.into_iter()
                    .map(|h| h.join().unwrap())
                    .collect()
            });
            
            // Check for any duplicates found
            for result in results {
                if let Some(duplicate_id) = result? {
                    log::error!("Document already exists with id {}", duplicate_id);
                    return Err(NitriteError::new(
                        &format!("Document already exists with id {}", duplicate_id),
                        ErrorKind::UniqueConstraintViolation,
                    ));
                }
            }
        } else {
            // Sequential check for smaller batches
            for key in keys {
                if self.nitrite_map.contains_key(key)? {
                    if let Value::NitriteId(id) = key {
                        log::error!("Document already exists with id {}", id);
                        return Err(NitriteError::new(
                            &format!("Document already exists with id {}", id),
                            ErrorKind::UniqueConstraintViolation,
                        ));
                    }
                }
            }
        }
        Ok(())
    }
    
    /// Rollback helper: removes documents that were inserted during a failed batch
    fn rollback_batch_insert(&self, ids: &[NitriteId]) {
        for id in ids {
            if let Err(e) = self.nitrite_map.remove(&Value::NitriteId(*id)) {
                log::error!("Failed to rollback document {} during batch insert: {}", id, e);
            }
        }
    }
    
    /// Rollback helper: removes index entries for documents that were successfully indexed
    /// during a failed batch operation
    fn rollback_batch_indexes(&self, indexed_docs: &[Document]) {
        for doc in indexed_docs {
            let mut doc_clone = doc.clone();
            if let Err(e) = self.document_index_writer.remove_index_entry(&mut doc_clone) {
                log::error!("Failed to rollback index entries during batch insert: {}", e);
            }
        }
    }
    
    fn process_insert(&self, document: Document) -> NitriteResult<NitriteId> {
        let mut new_doc = document;
        let nitrite_id = new_doc.id()
            .map_err(|e| NitriteError::new(&format!("Failed to retrieve document ID during insert: {}", e), e.kind().clone()))?;
        let source = new_doc.source()
            .map_err(|e| NitriteError::new(&format!("Failed to retrieve document source during insert: {}", e), e.kind().clone()))?;
        let time = get_current_time_or_zero();

        if REPLICATOR.ne(&source) {
            new_doc.remove(DOC_SOURCE)
                .map_err(|e| NitriteError::new(&format!("Failed to remove document source field during insert: {}", e), e.kind().clone()))?;
            new_doc.put(DOC_REVISION, Value::I32(1))
                .map_err(|e| NitriteError::new(&format!("Failed to set document revision during insert: {}", e), e.kind().clone()))?;
            new_doc.put(DOC_MODIFIED, Value::U128(time))
                .map_err(|e| NitriteError::new(&format!("Failed to set document modification time during insert: {}", e), e.kind().clone()))?;
        } else {
            new_doc.remove(DOC_SOURCE)
                .map_err(|e| NitriteError::new(&format!("Failed to remove document source field during replication insert: {}", e), e.kind().clone()))?;
        }

        let mut processed = self.processor_chain.process_before_write(new_doc.clone())
            .map_err(|e| NitriteError::new(&format!("Failed to process document before write during insert: {}", e), e.kind().clone()))?;
        let existing = self.nitrite_map.put_if_absent(
            Value::NitriteId(nitrite_id),
            Value::Document(processed.clone()),
        ).map_err(|e| NitriteError::new(&format!("Failed to store document in map during insert: {}", e), e.kind().clone()))?;

        if existing.is_some() {
            log::error!("Document already exists with id {}", nitrite_id.clone());
            return Err(NitriteError::new(
                &format!("Document already exists with id {}", nitrite_id.clone()),
                ErrorKind::UniqueConstraintViolation,
            ));
        } else {
            let result = self.document_index_writer.write_index_entry(&mut processed);
            if let Err(e) = result {
                self.nitrite_map.remove(&Value::NitriteId(nitrite_id))
                    .map_err(|remove_err| NitriteError::new(&format!("Failed to rollback document storage after index write failure: {}", remove_err), remove_err.kind().clone()))?;
                return Err(NitriteError::new(&format!("Failed to write index entries during insert: {}", e), e.kind().clone()));
            }
        }

        let value = Value::Document(new_doc);
        let event = CollectionEventInfo::new(Some(value), CollectionEvents::Insert, source);
        self.event_bus.publish(event)
            .map_err(|e| NitriteError::new(&format!("Failed to publish insert event: {}", e), e.kind().clone()))?;
        
        Ok(nitrite_id)
    }

    pub fn update(
        &self,
        filter: Filter,
        update: &Document,
        update_options: &UpdateOptions,
    ) -> NitriteResult<WriteResult> {
        let cursor = self.read_operations.find(filter, &FindOptions::new())?;
        let mut nitrite_ids = Vec::new();

        let mut document = update.clone();
        document.remove(DOC_ID)?;

        if REPLICATOR.ne(&document.source()?) {
            document.remove(DOC_REVISION)?;
        }

        if document.is_empty() {
            return Ok(WriteResult::new(nitrite_ids));
        }

        let mut count = 0usize;
        let mut batch_size = 10;
        let mut docs = Vec::with_capacity(batch_size);

        for doc_result in cursor {
            let doc = doc_result?;
            count += 1;
            docs.push(doc);

            if count >= 1 && update_options.is_just_once() {
                break;
            }

            // Process in batches for better performance
            if docs.len() >= batch_size {
                self.process_update_batch(&document, &mut nitrite_ids, docs)?;
                docs = Vec::with_capacity(batch_size);
                
                // Dynamically adjust batch size based on performance
                if count > 100 {
                    batch_size = 50;
                } else if count > 1000 {
                    batch_size = 200;
                }
            }
        }

        // Process remaining docs
        if !docs.is_empty() {
            self.process_update_batch(&document, &mut nitrite_ids, docs)?;
        }

        if count == 0 && update_options.is_insert_if_absent() {
            return self.insert(update.clone());
        }

        Ok(WriteResult::new(nitrite_ids))
    }
    
    fn process_update_batch(
        &self, 
        update_doc: &Document, 
        nitrite_ids: &mut Vec<NitriteId>, 
        docs: Vec<Document>
    ) -> NitriteResult<()> {
        // For small batches, use simple sequential processing
        if docs.len() <= 10 {
            for doc in docs {
                if let Some(id) = self.process_single_update(doc, update_doc)? {
                    nitrite_ids.push(id);
                }
            }
            return Ok(());
        }
        
        // For larger batches, use optimized batch update with put_all
        self.process_update_batch_optimized(update_doc, nitrite_ids, docs)
    }
    
    /// Optimized batch update using put_all for larger batches.
    /// 
    /// This method:
    /// 1. Prepares all updated documents
    /// 2. Uses put_all for batch storage
    /// 3. Updates index entries with proper rollback on failure
    fn process_update_batch_optimized(
        &self,
        update_doc: &Document,
        nitrite_ids: &mut Vec<NitriteId>,
        docs: Vec<Document>,
    ) -> NitriteResult<()> {
        let source = update_doc.source()?;
        let time = get_current_time_or_zero();
        
        // Phase 1: Prepare all updated documents
        // Collect: (NitriteId, old_doc, new_doc, processed_doc)
        let mut prepared: Vec<(NitriteId, Document, Document, Document)> = Vec::with_capacity(docs.len());
        
        for doc in docs {
            let mut new_doc = doc.clone();
            let old_doc = doc;
            let nitrite_id = new_doc.id()?;
            
            if REPLICATOR.ne(&source) {
                new_doc.merge(update_doc)?;
                let revision = new_doc.revision()?;
                new_doc.put(DOC_REVISION, Value::I32(revision + 1))?;
                new_doc.put(DOC_MODIFIED, Value::U128(time))?;
            } else {
                new_doc.merge(update_doc)?;
            }
            
            let processed = self.processor_chain.process_before_write(new_doc.clone())?;
            prepared.push((nitrite_id, old_doc, new_doc, processed));
        }
        
        // Phase 2: Batch write using put_all
        let entries: Vec<(Key, Value)> = prepared.iter()
            .map(|(id, _, _, processed)| {
                (Value::NitriteId(*id), Value::Document(processed.clone()))
            })
            .collect();
        
        self.nitrite_map.put_all(entries)?;
        
        // Phase 3: Update index entries with proper rollback tracking
        // Track successfully updated documents for rollback
        let mut updated_indexes: Vec<(NitriteId, Document, Document)> = Vec::with_capacity(prepared.len());
        
        for (id, mut old_doc, new_doc, mut processed) in prepared {
            // Update index entries
            let result = self.document_index_writer.update_index_entry(
                &mut old_doc,
                &mut processed,
                update_doc,
            );
            
            if let Err(e) = result {
                // Rollback: restore old documents for all updates
                self.rollback_batch_update(&updated_indexes, &id, &old_doc, update_doc)?;
                return Err(e);
            }
            
            // Track for potential rollback
            updated_indexes.push((id, old_doc, processed.clone()));
            
            // Publish event
            let value = Value::Document(new_doc);
            let event = CollectionEventInfo::new(Some(value), CollectionEvents::Update, source.clone());
            if let Err(e) = self.event_bus.publish(event) {
                log::warn!("Failed to publish update event for {}: {}", id, e);
            }
            
            if update_doc.size() > 0 {
                nitrite_ids.push(id);
            }
        }
        
        Ok(())
    }
    
    /// Rollback helper for batch updates: restores old documents and index entries
    fn rollback_batch_update(
        &self,
        updated_indexes: &[(NitriteId, Document, Document)],
        failed_id: &NitriteId,
        failed_old_doc: &Document,
        update_doc: &Document,
    ) -> NitriteResult<()> {
        // Restore the failed document's old state
        self.nitrite_map.put(
            Value::NitriteId(*failed_id),
            Value::Document(failed_old_doc.clone()),
        )?;
        
        // Rollback all successfully updated documents
        let mut restore_entries: Vec<(Key, Value)> = Vec::with_capacity(updated_indexes.len());
        
        for (id, old_doc, processed) in updated_indexes {
            restore_entries.push((
                Value::NitriteId(*id),
                Value::Document(old_doc.clone()),
            ));
            
            // Restore index entries
            let mut old_doc_clone = old_doc.clone();
            let mut processed_clone = processed.clone();
            if let Err(e) = self.document_index_writer.update_index_entry(
                &mut processed_clone,
                &mut old_doc_clone,
                update_doc,
            ) {
                log::error!("Failed to rollback index entry for {}: {}", id, e);
            }
        }
        
        // Batch restore old documents
        if !restore_entries.is_empty() {
            if let Err(e) = self.nitrite_map.put_all(restore_entries) {
                log::error!("Failed to batch restore documents during rollback: {}", e);
            }
        }
        
        Ok(())
    }
    
    fn process_single_update(&self, doc: Document, update_doc: &Document) -> NitriteResult<Option<NitriteId>> {
        let mut new_doc = doc.clone();
        let mut old_doc = doc;
        let source = update_doc.source()?;
        let time = get_current_time_or_zero();

        let nitrite_id = new_doc.id()?;

        if REPLICATOR.ne(&source) {
            new_doc.merge(update_doc)?;

            let revision = new_doc.revision()?;
            new_doc.put(DOC_REVISION, Value::I32(revision + 1))?;
            new_doc.put(DOC_MODIFIED, Value::U128(time))?;
        } else {
            new_doc.merge(update_doc)?;
        }

        let mut processed = self.processor_chain.process_before_write(new_doc.clone())?;
        self.nitrite_map.put(
            Value::NitriteId(nitrite_id),
            Value::Document(processed.clone()),
        )?;

        let result = self.document_index_writer.update_index_entry(
            &mut old_doc,
            &mut processed,
            update_doc,
        );
        
        if let Err(e) = result {
            self.nitrite_map.put(
                Value::NitriteId(nitrite_id),
                Value::Document(old_doc.clone()),
            )?;
            self.document_index_writer.update_index_entry(
                &mut processed,
                &mut old_doc,
                update_doc,
            )?;
            return Err(e);
        }

        let value = Value::Document(new_doc.clone());
        let event = CollectionEventInfo::new(Some(value), CollectionEvents::Update, source);
        self.event_bus.publish(event)?;

        if update_doc.size() > 0 {
            Ok(Some(nitrite_id))
        } else {
            Ok(None)
        }
    }

    /// Updates a document directly by its NitriteId without filter-based lookup.
    /// This is an O(1) operation as it directly accesses the document by its key.
    /// 
    /// # Arguments
    /// * `id` - The NitriteId of the document to update
    /// * `update` - The document containing the fields to update (will be merged with existing)
    /// * `insert_if_absent` - If true, inserts the document if it doesn't exist
    /// 
    /// # Returns
    /// * `Ok(WriteResult)` - Contains the affected NitriteId if update was successful
    /// * `Err(NitriteError)` - If the document doesn't exist and insert_if_absent is false
    pub fn update_by_id(
        &self,
        id: &NitriteId,
        update: &Document,
        insert_if_absent: bool,
    ) -> NitriteResult<WriteResult> {
        // Get the existing document directly by ID (O(1) lookup)
        let existing = self.nitrite_map.get(&Value::NitriteId(*id))?;
        
        match existing {
            Some(value) => {
                let doc = match value.as_document() {
                    Some(d) => d.clone(),
                    None => {
                        log::error!("Expected Document value in collection store for ID {:?}", id);
                        return Err(NitriteError::new(
                            "Invalid value type in collection store",
                            ErrorKind::ValidationError,
                        ));
                    }
                };
                
                // Process through the existing update logic
                let mut nitrite_ids = Vec::new();
                if let Some(updated_id) = self.process_single_update(doc, update)? {
                    nitrite_ids.push(updated_id);
                }
                Ok(WriteResult::new(nitrite_ids))
            }
            None => {
                if insert_if_absent {
                    // Insert the document with the specified ID
                    let mut new_doc = update.clone();
                    new_doc.put(DOC_ID, Value::NitriteId(*id))?;
                    self.insert(new_doc)
                } else {
                    // Document not found and insert_if_absent is false
                    Ok(WriteResult::new(vec![]))
                }
            }
        }
    }

    pub fn remove(&self, filter: Filter, just_once: bool) -> NitriteResult<WriteResult> {
        let cursor = self.read_operations.find(filter, &FindOptions::new())?;
        let mut nitrite_ids = Vec::new();

        for doc_result in cursor {
            let doc = doc_result?;

            let processed = self.processor_chain.process_before_write(doc.clone())?;
            let event = self.remove_internal(processed.clone(), &mut nitrite_ids)?;

            if let Some(event) = event {
                self.event_bus.publish(event)?;
            }

            if just_once {
                break;
            }
        }

        Ok(WriteResult::new(nitrite_ids))
    }

    pub fn remove_document(&self, document: &Document) -> NitriteResult<WriteResult> {
        let mut nitrite_ids = Vec::new();
        let event = self.remove_internal(document.clone(), &mut nitrite_ids)?;

        if event.is_some() {
            let event = event.unwrap();
            event.set_originator(document.source()?);
            self.event_bus.publish(event)?;
        }

        Ok(WriteResult::new(nitrite_ids))
    }

    fn remove_internal(
        &self,
        mut document: Document,
        nitrite_ids: &mut Vec<NitriteId>,
    ) -> NitriteResult<Option<CollectionEventInfo>> {
        let nitrite_id = document.id()?;
        let document = self
            .nitrite_map
            .remove(&Key::NitriteId(nitrite_id))?;
        
        // Validate that removed value is a Document, not another type
        let mut document = match document {
            Some(Value::Document(doc)) => doc,
            Some(other_value) => {
                log::error!("Data corruption: Expected Document in collection store, found {:?}", other_value);
                return Err(NitriteError::new(
                    "Expected Document value in collection store, found corrupted type",
                    ErrorKind::IndexingError,
                ));
            }
            None => return Ok(None),
        };

        let remove_at = get_current_time_or_zero();
        self.document_index_writer
            .remove_index_entry(&mut document)?;
        nitrite_ids.push(nitrite_id);

        let revision = document.revision()? + 1;
        document.put(DOC_REVISION, Value::I32(revision))?;
        document.put(DOC_MODIFIED, Value::U128(remove_at))?;

        let value = Value::Document(document.clone());
        let event = CollectionEventInfo::new(Some(value), CollectionEvents::Remove, document.source()?);
        Ok(Some(event))
    }
}
