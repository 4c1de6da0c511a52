//! Deletion engine: leaf lookup, cell removal with underfull detachment,
//! and root collapse with orphan reinsertion.

use std::rc::Rc;

use super::cache::NodeRef;
use super::descriptor::RTreeDescriptor;
use super::error::{RTreeError, RTreeResult};
use super::insert::{adjust_tree, choose_leaf, insert_cell};
use super::split::compute_bbox;
use super::types::{Cell, NodeId, ROOT_NODE_ID};

/// Looks up the leaf holding `rowid` via the rowid table; `None` if absent.
pub fn find_leaf(descriptor: &RTreeDescriptor, rowid: i64) -> RTreeResult<Option<NodeRef>> {
    let Some(node_id) = descriptor.store.read_rowid_node(rowid)? else {
        return Ok(None);
    };
    let mut cache = descriptor.cache.borrow_mut();
    let leaf = cache.acquire(&descriptor.store, node_id, None)?;
    drop(cache);
    fix_leaf_parent(descriptor, &leaf)?;
    Ok(Some(leaf))
}

/// Walks from `leaf` to the root, populating parent back-links from the
/// parent table. A node reappearing in its own ancestor chain is corruption.
pub fn fix_leaf_parent(descriptor: &RTreeDescriptor, leaf: &NodeRef) -> RTreeResult<()> {
    let mut seen = vec![leaf.borrow().id];
    let mut current = leaf.clone();

    loop {
        let current_id = current.borrow().id;
        if current_id == ROOT_NODE_ID {
            return Ok(());
        }
        if current.borrow().parent.is_some() {
            return Ok(());
        }
        let parent_id = descriptor
            .store
            .read_parent(current_id)?
            .ok_or_else(|| RTreeError::corruption(format!("node {current_id} has no parent entry")))?;
        if seen.contains(&parent_id) {
            return Err(RTreeError::corruption("parent chain cycle detected"));
        }
        seen.push(parent_id);

        let mut cache = descriptor.cache.borrow_mut();
        let parent = cache.acquire(&descriptor.store, parent_id, None)?;
        drop(cache);
        parent.borrow_mut().refcount += 1;
        current.borrow_mut().parent = Some(parent.clone());
        current = parent;
    }
}

/// Removes the cell at `cell_index` from `node`. If the node underflows
/// below `ceil(M/3)` and is not the root, detaches it into the deleted
/// list (recursively removing its own covering cell from its parent);
/// otherwise shrinks its covering cell in the parent and propagates the
/// shrink upward.
pub fn delete_cell(descriptor: &RTreeDescriptor, node: &NodeRef, cell_index: usize, height: u16) -> RTreeResult<()> {
    let removed = {
        let mut rec = node.borrow_mut();
        let removed = rec.page.cells.remove(cell_index);
        removed
    };
    descriptor.cache.borrow().mark_dirty(node);

    if height == 0 {
        descriptor.store.delete_rowid(removed.key)?;
    } else {
        descriptor.store.delete_parent(removed.key as NodeId)?;
    }

    let is_root = node.borrow().id == ROOT_NODE_ID;
    let underfull = !is_root && node.borrow().page.cells.len() < descriptor.min_cells();

    if underfull {
        let parent = node.borrow().parent.clone();
        if let Some(parent) = parent {
            let node_id = node.borrow().id;
            if let Some(idx) = parent.borrow().page.find_cell(node_id as i64) {
                delete_cell(descriptor, &parent, idx, height + 1)?;
            }
        }
        descriptor.store.delete_node(node.borrow().id)?;
        descriptor.push_deleted(node.clone(), height);
        return Ok(());
    }

    if node.borrow().page.is_empty() {
        return Ok(());
    }

    let new_bbox = compute_bbox(&node.borrow().page.cells, descriptor.dims);
    if let Some(parent) = node.borrow().parent.clone() {
        let node_id = node.borrow().id;
        if let Some(idx) = parent.borrow().page.find_cell(node_id as i64) {
            parent.borrow_mut().page.cells[idx].coords = new_bbox.clone();
            descriptor.cache.borrow().mark_dirty(&parent);
        }
        adjust_tree(descriptor, &parent, &new_bbox)?;
    }
    Ok(())
}

/// Deletes `rowid` from the tree: finds its leaf, removes the cell,
/// collapses the root if it degenerates to a single internal cell, and
/// reinserts every node left in the deleted list.
pub fn rtree_delete_rowid(descriptor: &RTreeDescriptor, rowid: i64) -> RTreeResult<()> {
    let Some(leaf) = find_leaf(descriptor, rowid)? else {
        return Ok(());
    };
    let cell_index = leaf
        .borrow()
        .page
        .find_cell(rowid)
        .ok_or_else(|| RTreeError::corruption(format!("rowid {rowid} missing from its indexed leaf")))?;

    delete_cell(descriptor, &leaf, cell_index, 0)?;

    {
        let mut cache = descriptor.cache.borrow_mut();
        cache.release(&descriptor.store, leaf)?;
    }

    collapse_root_if_needed(descriptor)?;
    drain_and_reinsert(descriptor)
}

fn collapse_root_if_needed(descriptor: &RTreeDescriptor) -> RTreeResult<()> {
    let height = descriptor.height()?;
    if height == 0 {
        return Ok(());
    }

    let mut cache = descriptor.cache.borrow_mut();
    let root = cache.acquire(&descriptor.store, ROOT_NODE_ID, None)?;
    let single_child = root.borrow().page.cells.len() == 1;
    if !single_child {
        cache.release(&descriptor.store, root)?;
        return Ok(());
    }

    let child_id = root.borrow().page.cells[0].key as NodeId;
    let child = cache.acquire(&descriptor.store, child_id, None)?;
    let child_cells = child.borrow().page.cells.clone();
    cache.release(&descriptor.store, child)?;

    descriptor.store.delete_node(child_id)?;
    descriptor.store.delete_parent(child_id)?;

    root.borrow_mut().page.cells = child_cells.clone();
    let new_height = height - 1;
    root.borrow_mut().page.height = new_height;
    cache.mark_dirty(&root);
    cache.flush(&descriptor.store, &root)?;
    cache.release(&descriptor.store, root)?;
    drop(cache);

    descriptor.set_height(new_height);

    // Children of the collapsed node now point at the root as their parent.
    for cell in &child_cells {
        if new_height > 0 {
            descriptor.store.write_parent(cell.key as NodeId, ROOT_NODE_ID)?;
        } else {
            descriptor.store.write_rowid_node(cell.key, ROOT_NODE_ID)?;
        }
    }
    Ok(())
}

fn drain_and_reinsert(descriptor: &RTreeDescriptor) -> RTreeResult<()> {
    for deleted in descriptor.drain_deleted() {
        let cells: Vec<Cell> = deleted.node.borrow().page.cells.clone();
        let height = deleted.height;
        debug_assert_eq!(Rc::strong_count(&deleted.node), 1, "detached node must have no remaining references");

        for cell in cells {
            let leaf = choose_leaf(descriptor, &cell.coords, height)?;
            insert_cell(descriptor, leaf, cell, height)?;
        }
    }
    Ok(())
}
