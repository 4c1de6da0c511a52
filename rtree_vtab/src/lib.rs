//! # rtree_vtab - R-tree spatial indexing for Nitrite
//!
//! A multi-dimensional R*-tree spatial index delivered as a `NitriteIndexer`/
//! `NitriteModule` plugin pair: page-structured rectangle storage, Guttman
//! and R*-tree split variants, and a host-facing filter/cursor façade.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use rtree_vtab::{rtree_index, RTreeFilter, RTreeModule};
//! use nitrite::nitrite_builder::NitriteBuilder;
//! use nitrite::store::memory::InMemoryStoreModule;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = NitriteBuilder::new()
//!     .load_module(InMemoryStoreModule::new())
//!     .load_module(RTreeModule)
//!     .open_or_create(None, None)?;
//!
//! let collection = db.collection("places")?;
//! collection.create_index(vec!["x0_min", "x0_max", "x1_min", "x1_max"], &rtree_index())?;
//!
//! let filter = RTreeFilter::intersects(
//!     vec!["x0_min".into(), "x0_max".into(), "x1_min".into(), "x1_max".into()],
//!     vec![0.0, 10.0, 0.0, 10.0],
//! );
//! # Ok(())
//! # }
//! ```

/// The R*-tree virtual-table-equivalent index: page-structured rectangle
/// storage, Guttman/R*-tree split, and the host indexer/filter façade.
pub mod rtree;

pub use rtree::{
    is_rtree_filter, rtreedepth, rtreenode, CoordType, GeometryCallback, RTreeDescriptor, RTreeError, RTreeFilter,
    RTreeIndexer, RTreeModule, RTreeResult, SplitPolicy, RTREE_INDEX, RTREE_INT_INDEX,
};

/// Creates index options for a float-coordinate R-tree index
/// (`(x0_min, x0_max, x1_min, x1_max, ...)`).
pub fn rtree_index() -> nitrite::index::IndexOptions {
    nitrite::index::IndexOptions::new(RTREE_INDEX)
}

/// Creates index options for an int32-coordinate R-tree index, the
/// `rtree_i32` alias.
pub fn rtree_i32_index() -> nitrite::index::IndexOptions {
    nitrite::index::IndexOptions::new(RTREE_INT_INDEX)
}
