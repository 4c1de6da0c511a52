use crate::{
    collection::Document, errors::NitriteResult, store::{NitriteMap, NitriteMapProvider}, Key,
};

pub(crate) struct MapValues {
    entries: NitriteMap,
    current: Option<Key>,
}

impl MapValues {
    pub fn new(map: NitriteMap) -> Self {
        Self {
            entries: map,
            current: None,
        }
    }

    fn set_current(
        &mut self,
        next_key: NitriteResult<Option<Key>>,
    ) -> Option<NitriteResult<Document>> {
        match next_key {
            Ok(Some(key)) => {
                self.current = Some(key.clone());
                match self.entries.get(&key) {
                    Ok(Some(value)) => {
                        // Validate that value is a Document type
                        match value.as_document() {
                            Some(doc) => Some(Ok(doc.clone())),
                            None => {
                                log::warn!("Data corruption: Expected Document in map values, found {:?}", value);
                                None
                            }
                        }
                    }
                    Ok(None) => None,
                    Err(e) => Some(Err(e)),
                }
            }
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }

    fn higher_key(&self) -> NitriteResult<Option<Key>> {
        match &self.current {
            Some(current_key) => self.entries.higher_key(current_key),
            None => self.entries.first_key(),
        }
    }
}

impl Iterator for MapValues {
    type Item = NitriteResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        let next_key = self.higher_key();
        self.set_current(next_key)
    }
}
