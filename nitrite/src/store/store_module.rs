use crate::common::NitriteModule;
use crate::errors::NitriteResult;
use crate::store::NitriteStore;

pub trait StoreModule: NitriteModule {
    fn get_store(&self) -> NitriteResult<NitriteStore>;
}
