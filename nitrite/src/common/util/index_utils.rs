use crate::{
    errors::{ErrorKind, NitriteError, NitriteResult},
    index::IndexDescriptor,
    Value, INDEX_META_PREFIX, INDEX_PREFIX, INTERNAL_NAME_SEPARATOR,
};

pub(crate) fn derive_index_map_name(descriptor: &IndexDescriptor) -> String {
    // Preallocate with reasonable capacity to avoid reallocations
    // Format: $nitrite_index|collection|fields|type (typical ~40-80 chars)
    let mut name = String::with_capacity(80);
    name.push_str(INDEX_PREFIX);
    name.push_str(INTERNAL_NAME_SEPARATOR);
    name.push_str(&descriptor.collection_name());
    name.push_str(INTERNAL_NAME_SEPARATOR);
    name.push_str(&descriptor.index_fields().encoded_names());
    name.push_str(INTERNAL_NAME_SEPARATOR);
    name.push_str(&descriptor.index_type());
    name
}

pub(crate) fn derive_index_meta_map_name(collection_name: &str) -> String {
    // Format: $nitrite_index_meta|collection (typical ~20-40 chars)
    let mut name = String::with_capacity(48);
    name.push_str(INDEX_META_PREFIX);
    name.push_str(INTERNAL_NAME_SEPARATOR);
    name.push_str(collection_name);
    name
}

pub(crate) fn validate_index_field(value: Option<&Value>, field_name: &str) -> NitriteResult<()> {
    match value {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Array(arr)) => validate_array_index_field(arr, field_name),
        Some(Value::Bytes(_)) => {
            log::error!("Byte field {} cannot be indexed", field_name);
            Err(NitriteError::new(
                &format!("Byte field {} cannot be indexed", field_name),
                ErrorKind::IndexingError,
            ))
        },
        Some(value) => {
            if !value.is_comparable() {
                log::error!("Field {} does not have comparable value {}", field_name, value);
                Err(NitriteError::new(
                    &format!("Field {} does not have comparable value {}", field_name, value),
                    ErrorKind::IndexingError,
                ))
            } else {
                Ok(())
            }
        }
    }
}

pub(crate) fn validate_string_array_index_field(
    array: &Vec<Value>,
    field_name: &str,
) -> NitriteResult<()> {
    // Quick path: if array is empty, it's valid
    if array.is_empty() {
        return Ok(());
    }
    
    for value in array {
        match *value {
            Value::Null => {
                continue;
            }
            Value::Array(_) => {
                log::error!("Nested array field {} is not supported", field_name);
                return Err(NitriteError::new(
                    "Nested array is not supported",
                    ErrorKind::IndexingError,
                ));
            }
            Value::String(_) => {
                continue;
            }
            _ => {
                log::error!(
                    "Each value in the array field {} should be string",
                    field_name
                );
                return Err(NitriteError::new(
                    &format!(
                        "Each value in the array field {} should be string",
                        field_name
                    ),
                    ErrorKind::IndexingError,
                ));
            }
        }
    }
    Ok(())
}

fn validate_array_index_field(array: &Vec<Value>, field_name: &str) -> NitriteResult<()> {
    // Quick path: if array is empty, it's valid
    if array.is_empty() {
        return Ok(());
    }
    
    for value in array {
        match value {
            &Value::Null => {
                continue;
            }
            &Value::Array(_) => {
                log::error!("Nested array field {} is not supported", field_name);
                return Err(NitriteError::new(
                    "Nested array is not supported",
                    ErrorKind::IndexingError,
                ));
            }
            v => {
                if !v.is_comparable() {
                    log::error!(
                        "Each value in the array field {} should be comparable",
                        field_name
                    );
                    return Err(NitriteError::new(
                        &format!(
                            "Each value in the array field {} should be comparable",
                            field_name
                        ),
                        ErrorKind::IndexingError,
                    ));
                }
            }
        }
    }
    Ok(())
}
