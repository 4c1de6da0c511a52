use super::{
    compound_index::CompoundIndex, nitrite_index::{NitriteIndex, NitriteIndexProvider}, simple_index::SimpleIndex, IndexDescriptor, NitriteIndexerProvider,
};
use crate::{
    collection::{FindPlan, NitriteId}, errors::{ErrorKind, NitriteError, NitriteResult}, nitrite_config::NitriteConfig, FieldValues, Fields, NitritePlugin, NitritePluginProvider, UNIQUE_INDEX,
};
use dashmap::DashMap;
use log::log;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct UniqueIndexer {
    inner: Arc<UniqueIndexerInner>,
}

impl UniqueIndexer {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(UniqueIndexerInner::new()),
        }
    }

    fn find_nitrite_index(
        &self,
        index_descriptor: &IndexDescriptor,
    ) -> NitriteResult<NitriteIndex> {
        let result = self.inner
            .find_nitrite_index(index_descriptor);

        match result {
            Some(nitrite_index) => Ok(nitrite_index),
            None => {
                log::error!("Index not found for descriptor: {:?}", index_descriptor);
                Err(NitriteError::new(
                    "Index not found",
                    ErrorKind::IndexingError,
                ))
            },
        }
    }
}

impl NitritePluginProvider for UniqueIndexer {
    fn initialize(&self, _config: NitriteConfig) -> NitriteResult<()> {
        Ok(())
    }

    fn close(&self) -> NitriteResult<()> {
        Ok(())
    }

    fn as_plugin(&self) -> NitritePlugin {
        NitritePlugin::new(self.clone())
    }
}

impl NitriteIndexerProvider for UniqueIndexer {
    fn index_type(&self) -> String {
        UNIQUE_INDEX.to_string()
    }

    fn is_unique(&self) -> bool {
        true
    }

    fn validate_index(&self, _fields: &Fields) -> NitriteResult<()> {
        Ok(())
    }

    fn drop_index(
        &self,
        index_descriptor: &IndexDescriptor,
        _nitrite_config: &NitriteConfig,
    ) -> NitriteResult<()> {
        self.inner.drop_index(index_descriptor)
    }

    fn write_index_entry(
        &self,
        field_values: &FieldValues,
        index_descriptor: &IndexDescriptor,
        nitrite_config: &NitriteConfig,
    ) -> NitriteResult<()> {
        self.inner
            .write_index_entry(field_values, index_descriptor, nitrite_config)
    }

    fn remove_index_entry(
        &self,
        field_values: &FieldValues,
        index_descriptor: &IndexDescriptor,
        nitrite_config: &NitriteConfig,
    ) -> NitriteResult<()> {
        self.inner
            .remove_index_entry(field_values, index_descriptor, nitrite_config)
    }

    fn find_by_filter(
        &self,
        find_plan: &FindPlan,
        nitrite_config: &NitriteConfig,
    ) -> NitriteResult<Vec<NitriteId>> {
        self.inner.find_by_filter(find_plan, nitrite_config)
    }
}

struct UniqueIndexerInner {
    index_registry: DashMap<IndexDescriptor, NitriteIndex>,
}

impl UniqueIndexerInner {
    fn new() -> Self {
        Self {
            index_registry: DashMap::new(),
        }
    }

    fn find_nitrite_index(
        &self,
        index_descriptor: &IndexDescriptor,
    ) -> Option<NitriteIndex> {
        self.index_registry.get(index_descriptor).map(|it| it.value().clone())
    }

    fn create_nitrite_index(
        &self,
        index_descriptor: &IndexDescriptor,
        nitrite_config: &NitriteConfig,
    ) -> NitriteResult<NitriteIndex> {
        let store = nitrite_config.nitrite_store()?;
        let nitrite_index: NitriteIndex = if index_descriptor.is_compound_index() {
            NitriteIndex::new(CompoundIndex::new(index_descriptor.clone(), store))
        } else {
            NitriteIndex::new(SimpleIndex::new(index_descriptor.clone(), store))
        };

        self.index_registry
            .insert(index_descriptor.clone(), nitrite_index.clone());

        Ok(nitrite_index)
    }

    fn drop_index(
        &self,
        index_descriptor: &IndexDescriptor,
    ) -> NitriteResult<()> {
        let nitrite_index = self.find_nitrite_index(index_descriptor);
        if let Some(nitrite_index) = nitrite_index {
            nitrite_index.drop_index()?;
            self.index_registry.remove(index_descriptor);
        }
        Ok(())
    }

    fn write_index_entry(
        &self,
        field_values: &FieldValues,
        index_descriptor: &IndexDescriptor,
        nitrite_config: &NitriteConfig,
    ) -> NitriteResult<()> {
        let mut nitrite_index = self.find_nitrite_index(index_descriptor);
        if nitrite_index.is_none() {
            nitrite_index = Some(self.create_nitrite_index(index_descriptor, nitrite_config)?);
        }

        if let Some(nitrite_index) = nitrite_index {
            nitrite_index.write(field_values)?;
        }
        Ok(())
    }

    fn remove_index_entry(
        &self,
        field_values: &FieldValues,
        index_descriptor: &IndexDescriptor,
        nitrite_config: &NitriteConfig,
    ) -> NitriteResult<()> {
        let mut nitrite_index = self.find_nitrite_index(index_descriptor);
        if nitrite_index.is_none() {
            nitrite_index = Some(self.create_nitrite_index(&index_descriptor, nitrite_config)?);
        }

        if let Some(nitrite_index) = nitrite_index {
            nitrite_index.remove(field_values)?;
        }
        Ok(())
    }

    fn find_by_filter(
        &self,
        find_plan: &FindPlan,
        nitrite_config: &NitriteConfig,
    ) -> NitriteResult<Vec<NitriteId>> {
        let index_descriptor = find_plan.index_descriptor();

        match index_descriptor {
            Some(index_descriptor) => {
                // Use idiomatic if-let pattern instead of is_none() + unwrap()
                let nitrite_index = if let Some(idx) = self.find_nitrite_index(&index_descriptor) {
                    idx
                } else {
                    self.create_nitrite_index(&index_descriptor, nitrite_config)?
                };

                let nitrite_ids = nitrite_index.find_nitrite_ids(find_plan)?;
                Ok(nitrite_ids)
            }
            None => {
                log::error!("Index descriptor not found in find plan");
                Err(NitriteError::new(
                    "Index descriptor not found",
                    ErrorKind::IndexingError,
                ))
            },
        }
    }
}
