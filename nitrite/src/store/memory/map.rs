use crate::common::{
    get_current_time, get_current_time_or_zero, AttributeAware, Attributes, Key, Value,
    META_MAP_NAME,
};
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use crate::store::iters::{
    EntryIterator, KeyIterator, SingleMapEntryProvider, SingleMapKeyProvider,
    SingleMapValueProvider, ValueIterator,
};
use crate::store::memory::store::InMemoryStore;
use crate::store::{NitriteMap, NitriteMapProvider, NitriteStore, NitriteStoreProvider};
use crossbeam_skiplist::SkipMap;
use std::collections::Bound::{Excluded, Included, Unbounded};
use std::iter::Rev;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-memory key-value map implementation using a concurrent skip list.
///
/// # Purpose
/// `InMemoryMap` provides fast, thread-safe access to key-value pairs stored entirely in memory.
/// It uses a concurrent skip list internally for efficient O(log n) operations and supports
/// bidirectional iteration with full range query capabilities.
///
/// # Characteristics
/// - **Thread-Safe**: Can be safely cloned and shared across threads
/// - **Concurrent Skip List**: O(log n) time complexity for get, put, remove operations
/// - **Bidirectional Iteration**: Supports forward and backward traversal
/// - **Range Queries**: Supports finding keys based on ordering relations
/// - **Lifecycle Management**: Supports opening, closing, and disposal
/// - **Attribute Support**: Can store and retrieve attributes metadata
///
/// # Usage
/// Typically obtained via `NitriteStore::open_map()`:
/// ```text
/// let store = InMemoryStore::new(InMemoryStoreConfig::new());
/// let nitrite_store = NitriteStore::new(store);
/// let map = nitrite_store.open_map("users").unwrap();
/// ```
#[derive(Clone)]
pub struct InMemoryMap {
    inner: Arc<InMemoryMapInner>,
}

impl InMemoryMap {
    /// Creates a new in-memory map.
    ///
    /// # Arguments
    /// * `name` - The name/identifier for the map
    /// * `store` - The parent `NitriteStore` that owns this map
    ///
    /// # Returns
    /// A new `InMemoryMap` instance
    pub fn new(name: &str, store: NitriteStore) -> Self {
        InMemoryMap {
            inner: Arc::new(InMemoryMapInner::new(name, store.clone())),
        }
    }
}

impl AttributeAware for InMemoryMap {
    fn attributes(&self) -> NitriteResult<Option<Attributes>> {
        self.inner.get_attributes()
    }

    fn set_attributes(&self, attributes: Attributes) -> NitriteResult<()> {
        self.inner.set_attributes(attributes)
    }
}

impl NitriteMapProvider for InMemoryMap {
    fn contains_key(&self, key: &Key) -> NitriteResult<bool> {
        self.inner.contains_key(key)
    }

    fn get(&self, key: &Key) -> NitriteResult<Option<Value>> {
        self.inner.get(key)
    }

    fn clear(&self) -> NitriteResult<()> {
        self.inner.clear()
    }

    fn is_closed(&self) -> NitriteResult<bool> {
        self.inner.is_closed()
    }

    fn close(&self) -> NitriteResult<()> {
        self.inner.close()
    }

    fn values(&self) -> NitriteResult<ValueIterator> {
        let provider = SingleMapValueProvider::new(NitriteMap::new(self.clone()));
        Ok(ValueIterator::new(provider))
    }

    fn keys(&self) -> NitriteResult<KeyIterator> {
        let provider = SingleMapKeyProvider::new(NitriteMap::new(self.clone()));
        Ok(KeyIterator::new(provider))
    }

    fn remove(&self, key: &Key) -> NitriteResult<Option<Value>> {
        self.inner.remove(key)
    }

    fn put(&self, key: Key, value: Value) -> NitriteResult<()> {
        self.inner.put(key, value)
    }

    fn size(&self) -> NitriteResult<u64> {
        self.inner.size()
    }

    fn put_if_absent(&self, key: Key, value: Value) -> NitriteResult<Option<Value>> {
        self.inner.put_if_absent(key, value)
    }

    fn first_key(&self) -> NitriteResult<Option<Key>> {
        self.inner.first_key()
    }

    fn last_key(&self) -> NitriteResult<Option<Key>> {
        self.inner.last_key()
    }

    fn higher_key(&self, key: &Key) -> NitriteResult<Option<Key>> {
        self.inner.higher_key(key)
    }

    fn ceiling_key(&self, key: &Key) -> NitriteResult<Option<Key>> {
        self.inner.ceiling_key(key)
    }

    fn lower_key(&self, key: &Key) -> NitriteResult<Option<Key>> {
        self.inner.lower_key(key)
    }

    fn floor_key(&self, key: &Key) -> NitriteResult<Option<Key>> {
        self.inner.floor_key(key)
    }

    fn is_empty(&self) -> NitriteResult<bool> {
        self.inner.is_empty()
    }

    fn get_store(&self) -> NitriteResult<NitriteStore> {
        self.inner.get_store()
    }

    fn get_name(&self) -> NitriteResult<String> {
        self.inner.get_name()
    }

    fn entries(&self) -> NitriteResult<EntryIterator> {
        let provider = SingleMapEntryProvider::new(NitriteMap::new(self.clone()));
        Ok(EntryIterator::new(provider))
    }

    fn reverse_entries(&self) -> NitriteResult<Rev<EntryIterator>> {
        let provider = SingleMapEntryProvider::new(NitriteMap::new(self.clone()));
        Ok(EntryIterator::new(provider).rev())
    }

    fn dispose(&self) -> NitriteResult<()> {
        self.inner.dispose()
    }

    fn is_dropped(&self) -> NitriteResult<bool> {
        self.inner.is_dropped()
    }
}

struct InMemoryMapInner {
    backing_map: SkipMap<Key, Value>,
    closed: AtomicBool,
    dropped: AtomicBool,
    name: String,
    store: NitriteStore,
}

impl InMemoryMapInner {
    pub(crate) fn new(name: &str, store: NitriteStore) -> InMemoryMapInner {
        InMemoryMapInner {
            backing_map: SkipMap::new(),
            closed: AtomicBool::from(false),
            dropped: AtomicBool::from(false),
            name: name.to_string(),
            store,
        }
    }

    pub(crate) fn check_opened(&self) -> NitriteResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            log::error!("Map {} is closed", self.name);
            return Err(NitriteError::new(
                &format!("Map {} is closed", self.name),
                ErrorKind::InvalidOperation,
            ));
        }

        if self.dropped.load(Ordering::Relaxed) {
            log::error!("Map {} is dropped", self.name);
            return Err(NitriteError::new(
                &format!("Map {} is dropped", self.name),
                ErrorKind::InvalidOperation,
            ));
        }

        Ok(())
    }

    pub(crate) fn get_attributes(&self) -> NitriteResult<Option<Attributes>> {
        if !self.is_dropped()? {
            let store = self.get_store()?;
            let meta_map = store.open_map(META_MAP_NAME)?;
            let name = self.get_name()?;

            if name.ne(META_MAP_NAME) {
                let attributes = meta_map.get(&Value::from(name))?;
                if let Some(attributes) = attributes {
                    // Safe type conversion with proper error handling
                    let doc = attributes.as_document()
                        .ok_or_else(|| NitriteError::new(
                            "Stored attributes value is not a document",
                            ErrorKind::InvalidOperation,
                        ))?;
                    return Ok(Some(Attributes::from_document(doc)));
                }
            }
        }
        Ok(None)
    }

    pub(crate) fn set_attributes(&self, attributes: Attributes) -> NitriteResult<()> {
        if !self.is_dropped()? {
            let store = self.get_store()?;
            let meta_map = store.open_map(META_MAP_NAME)?;
            let name = self.get_name()?;

            if name.ne(META_MAP_NAME) {
                meta_map.put(Value::from(name), Value::from(attributes.to_document()))?;
            }
        }
        Ok(())
    }

    pub(crate) fn contains_key(&self, key: &Key) -> NitriteResult<bool> {
        self.check_opened()?;
        Ok(self.backing_map.contains_key(key))
    }

    pub(crate) fn get(&self, key: &Key) -> NitriteResult<Option<Value>> {
        self.check_opened()?;

        if let Some(entry) = self.backing_map.get(key) {
            Ok(Some(entry.value().clone()))
        } else {
            Ok(None)
        }
    }

    pub(crate) fn clear(&self) -> NitriteResult<()> {
        self.check_opened()?;

        if !self.backing_map.is_empty() {
            self.backing_map.clear();
        }

        Ok(())
    }

    pub(crate) fn is_closed(&self) -> NitriteResult<bool> {
        Ok(self.closed.load(Ordering::Relaxed))
    }

    pub(crate) fn close(&self) -> NitriteResult<()> {
        self.backing_map.clear();
        self.closed.store(true, Ordering::Relaxed);
        let store = self.get_store()?;
        store.close_map(&self.name)?;
        Ok(())
    }

    pub(crate) fn remove(&self, key: &Key) -> NitriteResult<Option<Value>> {
        self.check_opened()?;

        if let Some(entry) = self.backing_map.remove(key) {
            Ok(Some(entry.value().clone()))
        } else {
            Ok(None)
        }
    }

    pub(crate) fn put(&self, key: Key, value: Value) -> NitriteResult<()> {
        self.check_opened()?;
        self.backing_map.insert(key, value);
        Ok(())
    }

    pub(crate) fn size(&self) -> NitriteResult<u64> {
        self.check_opened()?;
        Ok(self.backing_map.len() as u64)
    }

    pub(crate) fn put_if_absent(&self, key: Key, value: Value) -> NitriteResult<Option<Value>> {
        self.check_opened()?;

        if let Some(existing_value) = self.backing_map.get(&key) {
            return Ok(Some(existing_value.value().clone()));
        }

        // If the key does not exist, insert the new value
        self.backing_map.insert(key, value);
        // Return None to indicate that the key was absent
        Ok(None)
    }

    pub(crate) fn first_key(&self) -> NitriteResult<Option<Key>> {
        self.check_opened()?;
        Ok(self.backing_map.front().map(|entry| entry.key().clone()))
    }

    pub(crate) fn last_key(&self) -> NitriteResult<Option<Key>> {
        self.check_opened()?;
        Ok(self.backing_map.back().map(|entry| entry.key().clone()))
    }

    pub(crate) fn higher_key(&self, key: &Key) -> NitriteResult<Option<Key>> {
        self.check_opened()?;
        if let Some(e) = self.backing_map.range((Excluded(key), Unbounded)).next() {
            Ok(Some(e.key().clone()))
        } else {
            Ok(None)
        }
    }

    pub(crate) fn ceiling_key(&self, key: &Key) -> NitriteResult<Option<Key>> {
        self.check_opened()?;
        if let Some(e) = self.backing_map.range((Included(key), Unbounded)).next() {
            Ok(Some(e.key().clone()))
        } else {
            Ok(None)
        }
    }

    pub(crate) fn lower_key(&self, key: &Key) -> NitriteResult<Option<Key>> {
        self.check_opened()?;
        if let Some(e) = self.backing_map.range((Unbounded, Excluded(key))).next_back() {
            Ok(Some(e.key().clone()))
        } else {
            Ok(None)
        }
    }

    pub(crate) fn floor_key(&self, key: &Key) -> NitriteResult<Option<Key>> {
        self.check_opened()?;
        if let Some(e) = self.backing_map.range((Unbounded, Included(key))).next_back() {
            Ok(Some(e.key().clone()))
        } else {
            Ok(None)
        }
    }

    pub(crate) fn is_empty(&self) -> NitriteResult<bool> {
        self.check_opened()?;
        Ok(self.backing_map.is_empty())
    }

    pub(crate) fn get_store(&self) -> NitriteResult<NitriteStore> {
        Ok(self.store.clone())
    }

    pub(crate) fn get_name(&self) -> NitriteResult<String> {
        Ok(self.name.clone())
    }

    pub(crate) fn dispose(&self) -> NitriteResult<()> {
        self.backing_map.clear();
        self.dropped.store(true, Ordering::Relaxed);
        self.closed.store(true, Ordering::Relaxed);

        let store = self.get_store()?;
        store.remove_map(&self.name)?;

        Ok(())
    }

    pub(crate) fn is_dropped(&self) -> NitriteResult<bool> {
        Ok(self.dropped.load(Ordering::Relaxed))
    }
}
