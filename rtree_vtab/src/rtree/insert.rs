//! Insertion engine: choose-leaf, insert-cell, adjust-tree, split, and
//! R*-tree forced reinsertion.

use super::cache::NodeRef;
use super::descriptor::{RTreeDescriptor, SplitPolicy};
use super::error::RTreeResult;
use super::geometry::{area, growth, overlap};
use super::split::{compute_bbox, guttman_linear_assign, guttman_quadratic_assign, rstar_assign};
use super::types::{Cell, NodeId, Rect, ROOT_NODE_ID};

/// Top-level entry point: inserts a leaf cell, resetting the per-update
/// reinsertion sentinel first (§4.8).
pub fn insert_rowid(descriptor: &RTreeDescriptor, cell: Cell) -> RTreeResult<()> {
    descriptor.reset_reinsert_height();
    let leaf = choose_leaf(descriptor, &cell.coords, 0)?;
    insert_cell(descriptor, leaf, cell, 0)
}

/// Descends from the root picking, at each level, the child requiring
/// least growth (then least area) to absorb `coords`; under the R*-tree
/// policy, the level just above the leaves instead minimizes
/// overlap-enlargement, then growth, then area. Stops when `target_height`
/// levels above the leaf frontier is reached.
pub fn choose_leaf(descriptor: &RTreeDescriptor, coords: &[f64], target_height: u16) -> RTreeResult<NodeRef> {
    let mut cache = descriptor.cache.borrow_mut();
    let mut node = cache.acquire(&descriptor.store, ROOT_NODE_ID, None)?;
    let mut height = descriptor.height()?;
    drop(cache);

    while height > target_height {
        let use_rstar_overlap = descriptor.split_policy == SplitPolicy::RStar && height == 1;
        let chosen = {
            let rec = node.borrow();
            pick_best_child(&rec.page.cells, coords, descriptor.dims, use_rstar_overlap)
        };
        let child_id = node.borrow().page.cells[chosen].key as NodeId;

        let mut cache = descriptor.cache.borrow_mut();
        let child = cache.acquire(&descriptor.store, child_id, Some(node.clone()))?;
        cache.release(&descriptor.store, node)?;
        drop(cache);

        node = child;
        height -= 1;
    }
    Ok(node)
}

fn pick_best_child(cells: &[Cell], coords: &[f64], dims: usize, use_rstar_overlap: bool) -> usize {
    let boxes: Vec<Rect> = cells.iter().map(|c| c.coords.clone()).collect();

    if use_rstar_overlap {
        let mut best = 0;
        let mut best_overlap = f64::MAX;
        let mut best_growth = f64::MAX;
        let mut best_area = f64::MAX;
        for (i, c) in cells.iter().enumerate() {
            let enlarged = super::geometry::union(&c.coords, coords, dims);
            let enlarged_overlap = overlap(&boxes, &enlarged, dims, Some(i));
            let g = growth(&c.coords, coords, dims);
            let a = area(&c.coords, dims);
            let better = enlarged_overlap < best_overlap
                || (enlarged_overlap == best_overlap && g < best_growth)
                || (enlarged_overlap == best_overlap && g == best_growth && a < best_area)
                || (enlarged_overlap == best_overlap && g == best_growth && a == best_area && cells[i].key < cells[best].key);
            if better {
                best = i;
                best_overlap = enlarged_overlap;
                best_growth = g;
                best_area = a;
            }
        }
        return best;
    }

    let mut best = 0;
    let mut best_growth = f64::MAX;
    let mut best_area = f64::MAX;
    for (i, c) in cells.iter().enumerate() {
        let g = growth(&c.coords, coords, dims);
        let a = area(&c.coords, dims);
        let better = g < best_growth
            || (g == best_growth && a < best_area)
            || (g == best_growth && a == best_area && cells[i].key < cells[best].key);
        if better {
            best = i;
            best_growth = g;
            best_area = a;
        }
    }
    best
}

/// Appends `cell` to `node` at `height`, splitting or forcing reinsertion
/// on overflow, then propagates bounding-box growth upward and records the
/// rowid/parent mapping.
pub fn insert_cell(descriptor: &RTreeDescriptor, node: NodeRef, cell: Cell, height: u16) -> RTreeResult<()> {
    if height > 0 {
        descriptor.cache.borrow().reparent(cell.key as NodeId, &node);
    }

    let overflowing = node.borrow().page.cells.len() >= descriptor.max_cells();
    if overflowing {
        let use_reinsert = descriptor.split_policy == SplitPolicy::RStar
            && node.borrow().id != ROOT_NODE_ID
            && (height as i32) > *descriptor.reinsert_height.borrow();
        if use_reinsert {
            return forced_reinsert(descriptor, node, cell, height);
        }
        return split_node(descriptor, node, cell, height);
    }

    node.borrow_mut().page.cells.push(cell.clone());
    descriptor.cache.borrow().mark_dirty(&node);
    adjust_tree(descriptor, &node, &cell.coords)?;
    record_mapping(descriptor, &cell, &node, height)?;

    let mut cache = descriptor.cache.borrow_mut();
    cache.release(&descriptor.store, node)
}

fn record_mapping(descriptor: &RTreeDescriptor, cell: &Cell, node: &NodeRef, height: u16) -> RTreeResult<()> {
    let node_id = node.borrow().id;
    if height == 0 {
        descriptor.store.write_rowid_node(cell.key, node_id)
    } else {
        descriptor.store.write_parent(cell.key as NodeId, node_id)
    }
}

/// Walks from `from_node` to the root widening each ancestor's covering
/// cell in place if it does not already contain `inserted_coords`.
pub fn adjust_tree(descriptor: &RTreeDescriptor, from_node: &NodeRef, inserted_coords: &[f64]) -> RTreeResult<()> {
    let mut child_id = from_node.borrow().id;
    let mut parent = from_node.borrow().parent.clone();
    let mut inserted = inserted_coords.to_vec();

    while let Some(p) = parent {
        let mut changed = false;
        {
            let mut rec = p.borrow_mut();
            if let Some(idx) = rec.page.find_cell(child_id as i64) {
                if !super::geometry::contains(&rec.page.cells[idx].coords, &inserted, descriptor.dims) {
                    super::geometry::union_in_place(&mut rec.page.cells[idx].coords, &inserted, descriptor.dims);
                    inserted = rec.page.cells[idx].coords.clone();
                    changed = true;
                }
            }
        }
        if changed {
            descriptor.cache.borrow().mark_dirty(&p);
        }
        child_id = p.borrow().id;
        parent = p.borrow().parent.clone();
    }
    Ok(())
}

/// Materializes the overflowing node's `M+1` cells, partitions them via
/// the configured policy, and either grows a new root (if `node` is the
/// root) or creates a right sibling under the same parent.
pub fn split_node(descriptor: &RTreeDescriptor, node: NodeRef, new_cell: Cell, height: u16) -> RTreeResult<()> {
    let mut all_cells = node.borrow().page.cells.clone();
    all_cells.push(new_cell);
    let dims = descriptor.dims;
    let min_group = descriptor.min_cells();

    let (left_idx, right_idx) = match descriptor.split_policy {
        SplitPolicy::GuttmanQuadratic => guttman_quadratic_assign(&all_cells, dims, min_group),
        SplitPolicy::GuttmanLinear => guttman_linear_assign(&all_cells, dims, min_group),
        SplitPolicy::RStar => rstar_assign(&all_cells, dims, min_group),
    };
    let left_cells: Vec<Cell> = left_idx.iter().map(|&i| all_cells[i].clone()).collect();
    let right_cells: Vec<Cell> = right_idx.iter().map(|&i| all_cells[i].clone()).collect();
    let left_bbox = compute_bbox(&left_cells, dims);
    let right_bbox = compute_bbox(&right_cells, dims);

    let is_root = node.borrow().id == ROOT_NODE_ID;

    if is_root {
        let mut cache = descriptor.cache.borrow_mut();
        let left = cache.new_node(Some(node.clone()));
        let right = cache.new_node(Some(node.clone()));
        left.borrow_mut().page.cells = left_cells.clone();
        right.borrow_mut().page.cells = right_cells.clone();
        cache.flush(&descriptor.store, &left)?;
        cache.flush(&descriptor.store, &right)?;
        drop(cache);

        reparent_moved_cells(descriptor, &left_cells, &left, height)?;
        reparent_moved_cells(descriptor, &right_cells, &right, height)?;

        let left_id = left.borrow().id;
        let right_id = right.borrow().id;
        let new_height = descriptor.height()? + 1;
        {
            let mut rec = node.borrow_mut();
            rec.page.cells = vec![Cell::new(left_id as i64, left_bbox), Cell::new(right_id as i64, right_bbox)];
            rec.page.height = new_height;
        }
        descriptor.set_height(new_height);
        descriptor.cache.borrow_mut().mark_dirty(&node);
        descriptor.cache.borrow_mut().flush(&descriptor.store, &node)?;

        let mut cache = descriptor.cache.borrow_mut();
        cache.release(&descriptor.store, left)?;
        cache.release(&descriptor.store, right)?;
        cache.release(&descriptor.store, node)?;
        return Ok(());
    }

    let parent = node.borrow().parent.clone();
    let right = {
        let mut cache = descriptor.cache.borrow_mut();
        let right = cache.new_node(parent.clone());
        right.borrow_mut().page.cells = right_cells.clone();
        node.borrow_mut().page.cells = left_cells.clone();
        cache.mark_dirty(&node);
        cache.flush(&descriptor.store, &right)?;
        cache.flush(&descriptor.store, &node)?;
        right
    };

    reparent_moved_cells(descriptor, &right_cells, &right, height)?;
    for cell in &left_cells {
        write_mapping(descriptor, cell, &node, height)?;
    }

    adjust_tree(descriptor, &node, &left_bbox)?;

    let right_id = right.borrow().id;
    insert_cell(descriptor, parent.clone().expect("non-root split has a parent"), Cell::new(right_id as i64, right_bbox), height + 1)?;

    let mut cache = descriptor.cache.borrow_mut();
    cache.release(&descriptor.store, right)?;
    cache.release(&descriptor.store, node)
}

fn reparent_moved_cells(descriptor: &RTreeDescriptor, cells: &[Cell], new_parent: &NodeRef, height: u16) -> RTreeResult<()> {
    for cell in cells {
        write_mapping(descriptor, cell, new_parent, height)?;
        if height > 0 {
            descriptor.cache.borrow().reparent(cell.key as NodeId, new_parent);
        }
    }
    Ok(())
}

fn write_mapping(descriptor: &RTreeDescriptor, cell: &Cell, node: &NodeRef, height: u16) -> RTreeResult<()> {
    let node_id = node.borrow().id;
    if height == 0 {
        descriptor.store.write_rowid_node(cell.key, node_id)
    } else {
        descriptor.store.write_parent(cell.key as NodeId, node_id)
    }
}

/// R*-tree forced reinsertion: removes the cells furthest from the node's
/// centroid and reinserts them from `choose_leaf` at the same height,
/// keeping the closest `ceil(2M/3)` in place.
fn forced_reinsert(descriptor: &RTreeDescriptor, node: NodeRef, new_cell: Cell, height: u16) -> RTreeResult<()> {
    *descriptor.reinsert_height.borrow_mut() = height as i32;

    let mut all_cells = node.borrow().page.cells.clone();
    all_cells.push(new_cell);
    let dims = descriptor.dims;

    let node_bbox = compute_bbox(&all_cells, dims);
    let center = super::geometry::centroid(&node_bbox, dims);

    let mut by_distance: Vec<(f64, Cell)> = all_cells
        .into_iter()
        .map(|c| {
            let cc = super::geometry::centroid(&c.coords, dims);
            (super::geometry::squared_distance(&cc, &center), c)
        })
        .collect();
    by_distance.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

    let m = descriptor.max_cells();
    let keep_count = (2 * m).div_ceil(3);
    let keep_count = keep_count.min(by_distance.len());

    let kept: Vec<Cell> = by_distance[..keep_count].iter().map(|(_, c)| c.clone()).collect();
    let to_reinsert: Vec<Cell> = by_distance[keep_count..].iter().map(|(_, c)| c.clone()).collect();

    node.borrow_mut().page.cells = kept.clone();
    descriptor.cache.borrow().mark_dirty(&node);
    let kept_bbox = compute_bbox(&kept, dims);
    adjust_tree(descriptor, &node, &kept_bbox)?;

    for cell in &kept {
        write_mapping(descriptor, cell, &node, height)?;
    }

    {
        let mut cache = descriptor.cache.borrow_mut();
        cache.release(&descriptor.store, node)?;
    }

    for cell in to_reinsert {
        let leaf = choose_leaf(descriptor, &cell.coords, height)?;
        insert_cell(descriptor, leaf, cell, height)?;
    }
    Ok(())
}
