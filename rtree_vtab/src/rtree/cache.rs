//! Reference-counted node cache with parent back-links.
//!
//! Single-threaded within one index (the index descriptor serializes access
//! with its own lock); internals use `Rc<RefCell<_>>` rather than `Arc` to
//! keep mutation of a shared node cheap and unambiguous.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::codec;
use super::error::{RTreeError, RTreeResult};
use super::store::BackingStore;
use super::types::{max_cells, CoordType, NodeId, NodePage, ROOT_NODE_ID};

/// A loaded node record: the page itself plus cache bookkeeping.
pub struct NodeRecord {
    pub id: NodeId,
    pub page: NodePage,
    pub refcount: u32,
    pub dirty: bool,
    pub parent: Option<NodeRef>,
}

pub type NodeRef = Rc<RefCell<NodeRecord>>;

/// Folds the low 8 bits of an id, matching the spec's described bucketing
/// even though the backing `HashMap` does its own, opaque, hashing.
fn bucket_of(id: NodeId) -> u8 {
    let bytes = id.to_be_bytes();
    bytes.iter().fold(0u8, |acc, b| acc ^ b)
}

pub struct NodeCache {
    dims: usize,
    coord_type: CoordType,
    node_size: usize,
    by_id: HashMap<NodeId, NodeRef>,
    buckets: HashMap<u8, Vec<NodeId>>,
}

impl NodeCache {
    pub fn new(dims: usize, coord_type: CoordType, node_size: usize) -> Self {
        NodeCache {
            dims,
            coord_type,
            node_size,
            by_id: HashMap::new(),
            buckets: HashMap::new(),
        }
    }

    pub fn max_cells(&self) -> usize {
        max_cells(self.node_size, self.dims)
    }

    pub fn hash_lookup(&self, id: NodeId) -> Option<NodeRef> {
        self.by_id.get(&id).cloned()
    }

    fn hash_insert(&mut self, id: NodeId, node: NodeRef) {
        self.by_id.insert(id, node);
        self.buckets.entry(bucket_of(id)).or_default().push(id);
    }

    fn hash_delete(&mut self, id: NodeId) {
        self.by_id.remove(&id);
        if let Some(chain) = self.buckets.get_mut(&bucket_of(id)) {
            chain.retain(|&x| x != id);
        }
    }

    /// Loads (or re-references) node `id`. If `parent_hint` is given and the
    /// node's parent link is unset, it is attached (reference-counting the
    /// hint). Corruption is reported for mis-sized blobs, overflowing cell
    /// counts, or an out-of-range root height.
    pub fn acquire(
        &mut self,
        store: &BackingStore,
        id: NodeId,
        parent_hint: Option<NodeRef>,
    ) -> RTreeResult<NodeRef> {
        if let Some(existing) = self.hash_lookup(id) {
            existing.borrow_mut().refcount += 1;
            let needs_parent = existing.borrow().parent.is_none();
            if needs_parent {
                if let Some(hint) = parent_hint {
                    hint.borrow_mut().refcount += 1;
                    existing.borrow_mut().parent = Some(hint);
                }
            }
            return Ok(existing);
        }

        let buf = store.read_node(id)?;
        let is_root = id == ROOT_NODE_ID;
        let page = codec::decode_node(&buf, self.dims, self.coord_type, is_root)?;

        if page.cells.len() > self.max_cells() {
            return Err(RTreeError::corruption(format!(
                "node {id} has {} cells, exceeding M={}",
                page.cells.len(),
                self.max_cells()
            )));
        }
        if is_root && page.height > super::types::MAX_HEIGHT {
            return Err(RTreeError::corruption(format!(
                "root height {} exceeds maximum {}",
                page.height,
                super::types::MAX_HEIGHT
            )));
        }

        if let Some(hint) = &parent_hint {
            hint.borrow_mut().refcount += 1;
        }

        let record = Rc::new(RefCell::new(NodeRecord {
            id,
            page,
            refcount: 1,
            dirty: false,
            parent: parent_hint,
        }));
        self.hash_insert(id, record.clone());
        Ok(record)
    }

    /// Allocates a new, zeroed, dirty node with id 0, parented to `parent`.
    pub fn new_node(&mut self, parent: Option<NodeRef>) -> NodeRef {
        if let Some(p) = &parent {
            p.borrow_mut().refcount += 1;
        }
        Rc::new(RefCell::new(NodeRecord {
            id: 0,
            page: NodePage::empty(),
            refcount: 1,
            dirty: true,
            parent,
        }))
    }

    /// Writes the page back if dirty. If the node had no id yet, assigns one
    /// via the adapter and re-hashes it.
    pub fn flush(&mut self, store: &BackingStore, node: &NodeRef) -> RTreeResult<()> {
        let mut rec = node.borrow_mut();
        if rec.id == 0 {
            let new_id = store.allocate_node_id()?;
            rec.id = new_id;
            drop(rec);
            self.hash_insert(new_id, node.clone());
            rec = node.borrow_mut();
        }
        if rec.dirty {
            let is_root = rec.id == ROOT_NODE_ID;
            let buf = codec::encode_node(&rec.page, self.node_size, self.dims, self.coord_type, is_root);
            store.write_node(rec.id, &buf)?;
            rec.dirty = false;
        }
        Ok(())
    }

    /// Decrements the refcount; at zero, recursively releases the parent,
    /// flushes if dirty, and removes the node from the hash.
    pub fn release(&mut self, store: &BackingStore, node: NodeRef) -> RTreeResult<()> {
        let should_free = {
            let mut rec = node.borrow_mut();
            debug_assert!(rec.refcount > 0);
            rec.refcount -= 1;
            rec.refcount == 0
        };
        if !should_free {
            return Ok(());
        }

        let parent = node.borrow_mut().parent.take();
        let flush_result = self.flush(store, &node);

        let id = node.borrow().id;
        self.hash_delete(id);

        if let Some(parent) = parent {
            self.release(store, parent)?;
        }
        flush_result
    }

    pub fn mark_dirty(&self, node: &NodeRef) {
        node.borrow_mut().dirty = true;
    }

    /// Re-parents a cached child to `new_parent`, fixing up refcounts. A
    /// no-op if the child isn't currently loaded (its backing parent-table
    /// entry is updated separately by the caller).
    pub fn reparent(&self, child_id: NodeId, new_parent: &NodeRef) {
        let Some(child) = self.hash_lookup(child_id) else { return };
        let old_parent = child.borrow_mut().parent.take();
        match old_parent {
            Some(old) if Rc::ptr_eq(&old, new_parent) => {
                child.borrow_mut().parent = Some(old);
            }
            Some(old) => {
                old.borrow_mut().refcount -= 1;
                new_parent.borrow_mut().refcount += 1;
                child.borrow_mut().parent = Some(new_parent.clone());
            }
            None => {
                new_parent.borrow_mut().refcount += 1;
                child.borrow_mut().parent = Some(new_parent.clone());
            }
        }
    }
}
