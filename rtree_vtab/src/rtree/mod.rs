//! The R-tree engine: page codec, node cache, descriptor, split variants,
//! insertion/deletion/search engines, update dispatch and index selection,
//! and the host-facing filter/indexer façade.

pub mod cache;
pub mod codec;
pub mod cursor;
pub mod delete;
pub mod descriptor;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod insert;
pub mod inspect;
pub mod module;
pub mod split;
pub mod store;
pub mod types;
pub mod update;

#[cfg(test)]
pub mod testutil;

pub use cursor::{leaf_matches, Constraint, ConstraintOp, GeometryCallback, RTreeCursor};
pub use descriptor::{RTreeDescriptor, SplitPolicy};
pub use error::{RTreeError, RTreeResult};
pub use filter::{is_rtree_filter, RTreeFilter, RTREE_INDEX, RTREE_INT_INDEX};
pub use inspect::{rtreedepth, rtreenode};
pub use module::{RTreeIndexer, RTreeModule};
pub use types::CoordType;
