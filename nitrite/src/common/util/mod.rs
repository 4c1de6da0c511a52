mod date_utils;
mod object_utils;
mod navigable_map;
mod index_utils;
mod tokenizer;
mod type_utils;
mod document_utils;
mod task_util;

pub use date_utils::*;
pub use document_utils::*;
pub(crate) use index_utils::*;
pub(crate) use navigable_map::*;
pub use object_utils::*;
pub use task_util::*;
pub use tokenizer::*;
pub use type_utils::*;
