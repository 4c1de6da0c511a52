use std::collections::BTreeMap;

use crate::{
    collection::Document,
    errors::NitriteResult,
    filter::{by_id, Filter},
    FieldValues, Fields, Value,
};

/// Creates an empty document.
pub fn empty_document() -> Document {
    Document::new()
}

/// Creates a document from a [BTreeMap].
pub fn document_from_map(map: &BTreeMap<String, Value>) -> NitriteResult<Document> {
    // recursively create document from map
    // and validate the key as well
    let mut doc = Document::new();
    for (key, value) in map.iter() {
        match value {
            Value::Document(obj) => {
                // recursively create document from nested map
                doc.put(key, Value::Document(obj.clone()))?;
            }
            Value::Array(arr) => {
                // Preallocate with exact capacity to avoid reallocation
                let mut nested_arr = Vec::with_capacity(arr.len());
                for v in arr.iter() {
                    // if array contains nested object, then recursively create document
                    match v {
                        Value::Document(obj) => {
                            nested_arr.push(Value::Document(obj.clone()));
                        }
                        _ => {
                            nested_arr.push(v.clone());
                        }
                    }
                }
                // put the array in the document
                doc.put(key, Value::Array(nested_arr))?;
            }
            _ => {
                // for all other types, just put the value in the document
                doc.put(key, value.clone())?;
            }
        }
    }
    Ok(doc)
}

/// Creates a document with a single key-value pair.
pub fn create_document(key: &str, value: Value) -> NitriteResult<Document> {
    let mut doc = Document::new();
    doc.put(key, value)?;
    Ok(doc)
}

pub(crate) fn get_document_values(
    document: &mut Document,
    fields: &Fields,
) -> NitriteResult<FieldValues> {
    let nitrite_id = document.id()?;
    // Preallocate with exact field count to avoid reallocation
    let mut values = Vec::with_capacity(fields.field_names().len());

    for field in fields.field_names() {
        let value = document.get(&field)?;
        values.push((field, value));
    }

    Ok(FieldValues::new(values, nitrite_id, fields.clone()))
}

pub(crate) fn is_affected_by_update(fields: &Fields, updated_fields: &Document) -> bool {
    for field in fields.field_names() {
        if updated_fields.contains_key(&field) {
            return true;
        }
    }
    false
}

pub(crate) fn create_unique_filter(document: &mut Document) -> NitriteResult<Filter> {
    Ok(by_id(document.id()?))
}
