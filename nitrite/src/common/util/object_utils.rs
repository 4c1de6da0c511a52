use crate::common::{Convertible, KEY_OBJ_SEPARATOR};
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use crate::repository::NitriteEntity;

pub fn get_key_name(name: &str) -> NitriteResult<String> {
    if name.contains(KEY_OBJ_SEPARATOR) {
        // Use split_once to avoid allocating full Vec
        if let Some((_, key_part)) = name.split_once(KEY_OBJ_SEPARATOR) {
            Ok(key_part.to_string())
        } else {
            log::error!("Invalid keyed object format: {}", name);
            Err(NitriteError::new(
                &format!("Invalid keyed object format: {}", name),
                ErrorKind::ValidationError,
            ))
        }
    } else {
        log::error!("{} is not a valid keyed object repository", name);
        Err(NitriteError::new(
            &format!("{} is not a valid keyed object repository", name),
            ErrorKind::ValidationError,
        ))
    }
}

pub fn get_keyed_repo_type(name: &str) -> NitriteResult<String> {
    if name.contains(KEY_OBJ_SEPARATOR) {
        // Use split_once to avoid allocating full Vec
        if let Some((type_part, _)) = name.split_once(KEY_OBJ_SEPARATOR) {
            Ok(type_part.to_string())
        } else {
            log::error!("Invalid keyed object format: {}", name);
            Err(NitriteError::new(
                &format!("Invalid keyed object format: {}", name),
                ErrorKind::ValidationError,
            ))
        }
    } else {
        log::error!("{} is not a valid keyed object repository", name);
        Err(NitriteError::new(
            &format!("{} is not a valid keyed object repository", name),
            ErrorKind::ValidationError,
        ))
    }
}

pub fn repository_name_by_type<T>(key: Option<&str>) -> NitriteResult<String>
where
    T: NitriteEntity,
{
    let entity_name = T::default().entity_name();
    repository_name(&entity_name, key)
}

pub fn repository_name(entity_name: &str, key: Option<&str>) -> NitriteResult<String> {
    if entity_name.contains(KEY_OBJ_SEPARATOR) {
        log::error!("{} is not a valid entity name", entity_name);
        return Err(NitriteError::new(
            &format!("{} is not a valid entity name", entity_name),
            ErrorKind::ValidationError,
        ));
    }

    match key {
        // Preallocate capacity to avoid reallocation
        Some(k) => {
            let mut result = String::with_capacity(entity_name.len() + 1 + k.len());
            result.push_str(&entity_name);
            result.push_str(KEY_OBJ_SEPARATOR);
            result.push_str(k);
            Ok(result)
        }
        None => Ok(entity_name.to_string()),
    }
}
