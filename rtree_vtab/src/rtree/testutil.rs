//! Test-only helpers shared across the engine's unit tests.

#![cfg(test)]

use nitrite::store::memory::InMemoryStoreModule;
use nitrite::store::{NitriteStore, StoreModule};

pub fn in_memory_store() -> NitriteStore {
    let store = InMemoryStoreModule::new().get_store().unwrap();
    store.open_or_create().unwrap();
    store
}
