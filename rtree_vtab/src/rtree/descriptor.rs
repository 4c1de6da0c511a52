//! Index descriptor: the per-index configuration and mutable state tying
//! together the cache, backing store, and in-progress condensation/reinsert
//! bookkeeping.

use std::cell::RefCell;

use nitrite::store::NitriteStore;

use super::cache::{NodeCache, NodeRef};
use super::error::RTreeResult;
use super::store::BackingStore;
use super::types::{bytes_per_cell, max_cells, min_cells, CoordType, MAX_DIMENSIONS};

/// Split/overflow policy, chosen once at index creation (§9: "model the
/// split choice as an opaque policy selected at index-creation time").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPolicy {
    GuttmanQuadratic,
    GuttmanLinear,
    RStar,
}

/// A node detached during condensation, awaiting reinsertion; its stored
/// sub-tree height travels with it since the node's own id slot is reused
/// to record that height while it sits in the deleted list.
pub struct DeletedNode {
    pub node: NodeRef,
    pub height: u16,
}

pub struct RTreeDescriptor {
    pub dims: usize,
    pub coord_type: CoordType,
    pub node_size: usize,
    pub split_policy: SplitPolicy,
    pub store: BackingStore,
    pub cache: RefCell<NodeCache>,
    /// Cached tree height; invalidated (`None`) whenever the root node is
    /// released, per §4.3.
    height: RefCell<Option<u16>>,
    /// `-1` when not reinserting; otherwise the height at which forced
    /// reinsertion is currently in progress for this update.
    pub reinsert_height: RefCell<i32>,
    pub deleted: RefCell<Vec<DeletedNode>>,
    pub busy: RefCell<u32>,
}

impl RTreeDescriptor {
    pub fn create(
        nitrite_store: &NitriteStore,
        index_name: &str,
        dims: usize,
        coord_type: CoordType,
        split_policy: SplitPolicy,
        page_size: usize,
    ) -> RTreeResult<Self> {
        assert!((1..=MAX_DIMENSIONS).contains(&dims));
        let node_size = node_size_for_creation(page_size, dims);
        let store = BackingStore::open(nitrite_store, index_name, node_size)?;
        Ok(RTreeDescriptor {
            dims,
            coord_type,
            node_size,
            split_policy,
            store,
            cache: RefCell::new(NodeCache::new(dims, coord_type, node_size)),
            height: RefCell::new(None),
            reinsert_height: RefCell::new(-1),
            deleted: RefCell::new(Vec::new()),
            busy: RefCell::new(0),
        })
    }

    /// Reopens an existing index, recovering `node_size` from the root
    /// blob's length (§6 "on reconnect: read from the root blob's length").
    pub fn open(
        nitrite_store: &NitriteStore,
        index_name: &str,
        dims: usize,
        coord_type: CoordType,
        split_policy: SplitPolicy,
        probe_node_size: usize,
    ) -> RTreeResult<Self> {
        let probe = BackingStore::open(nitrite_store, index_name, probe_node_size)?;
        let node_size = probe.read_node(super::types::ROOT_NODE_ID)?.len();
        if node_size == probe_node_size {
            return Ok(RTreeDescriptor {
                dims,
                coord_type,
                node_size,
                split_policy,
                store: probe,
                cache: RefCell::new(NodeCache::new(dims, coord_type, node_size)),
                height: RefCell::new(None),
                reinsert_height: RefCell::new(-1),
                deleted: RefCell::new(Vec::new()),
                busy: RefCell::new(0),
            });
        }
        let store = BackingStore::open(nitrite_store, index_name, node_size)?;
        Ok(RTreeDescriptor {
            dims,
            coord_type,
            node_size,
            split_policy,
            store,
            cache: RefCell::new(NodeCache::new(dims, coord_type, node_size)),
            height: RefCell::new(None),
            reinsert_height: RefCell::new(-1),
            deleted: RefCell::new(Vec::new()),
            busy: RefCell::new(0),
        })
    }

    pub fn bytes_per_cell(&self) -> usize {
        bytes_per_cell(self.dims)
    }

    pub fn max_cells(&self) -> usize {
        max_cells(self.node_size, self.dims)
    }

    pub fn min_cells(&self) -> usize {
        min_cells(self.node_size, self.dims)
    }

    /// Current tree height, acquiring and releasing the root to read it if
    /// the cached value was invalidated.
    pub fn height(&self) -> RTreeResult<u16> {
        if let Some(h) = *self.height.borrow() {
            return Ok(h);
        }
        let root = self.cache.borrow_mut().acquire(&self.store, super::types::ROOT_NODE_ID, None)?;
        let h = root.borrow().page.height;
        self.cache.borrow_mut().release(&self.store, root)?;
        *self.height.borrow_mut() = Some(h);
        Ok(h)
    }

    pub fn invalidate_height(&self) {
        *self.height.borrow_mut() = None;
    }

    pub fn set_height(&self, h: u16) {
        *self.height.borrow_mut() = Some(h);
    }

    pub fn reset_reinsert_height(&self) {
        *self.reinsert_height.borrow_mut() = -1;
    }

    /// Parks a detached node on the deleted list, bumping its refcount first
    /// so the caller's own still-pending `cache.release` on this same node
    /// (e.g. `rtree_delete_rowid`'s release of the leaf it started from)
    /// decrements it back down instead of flushing and re-hashing a node
    /// this call already told the backing store to delete.
    pub fn push_deleted(&self, node: NodeRef, height: u16) {
        node.borrow_mut().refcount += 1;
        self.deleted.borrow_mut().push(DeletedNode { node, height });
    }

    pub fn drain_deleted(&self) -> Vec<DeletedNode> {
        std::mem::take(&mut *self.deleted.borrow_mut())
    }
}

/// `node_size = min(page_size - 64, 4 + bytes_per_cell * 51)`.
fn node_size_for_creation(page_size: usize, dims: usize) -> usize {
    (page_size - 64).min(4 + bytes_per_cell(dims) * super::types::MAX_CELLS_PER_NODE)
}
