//! Search engine: compiled constraints, geometry callbacks, and the two
//! scan strategies (direct rowid lookup, tree DFS with backtracking).

use std::sync::Arc;

use super::cache::NodeRef;
use super::descriptor::RTreeDescriptor;
use super::delete::fix_leaf_parent;
use super::error::{RTreeError, RTreeResult};
use super::types::NodeId;

/// A registered MATCH predicate: given the query-time context and a
/// rectangle, reports whether the rectangle overlaps the query geometry.
pub trait GeometryCallback: Send + Sync {
    fn overlaps(&self, ctx: &[u8], coords: &[f64]) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    Eq,
    Le,
    Lt,
    Ge,
    Gt,
    Match,
}

/// One compiled constraint from the planner's index-selection callback.
/// `column` is the coordinate index in `[0, 2*dims)`: even for an axis
/// minimum, odd for an axis maximum.
pub struct Constraint {
    pub column: usize,
    pub op: ConstraintOp,
    pub value: f64,
    pub geometry: Option<Arc<dyn GeometryCallback>>,
    pub geometry_ctx: Vec<u8>,
}

impl Constraint {
    pub fn relational(column: usize, op: ConstraintOp, value: f64) -> Self {
        Constraint { column, op, value, geometry: None, geometry_ctx: Vec::new() }
    }

    pub fn match_geometry(column: usize, geometry: Arc<dyn GeometryCallback>, ctx: Vec<u8>) -> Self {
        Constraint { column, op: ConstraintOp::Match, value: 0.0, geometry: Some(geometry), geometry_ctx: ctx }
    }

    /// True if this constraint excludes an internal cell's child subtree.
    fn excludes_internal(&self, coords: &[f64]) -> bool {
        let axis = self.column / 2;
        let min_i = coords[2 * axis];
        let max_i = coords[2 * axis + 1];
        match self.op {
            ConstraintOp::Le | ConstraintOp::Lt => self.value < min_i,
            ConstraintOp::Ge | ConstraintOp::Gt => self.value > max_i,
            ConstraintOp::Eq => self.value < min_i || self.value > max_i,
            ConstraintOp::Match => {
                let Some(geom) = &self.geometry else { return false };
                !geom.overlaps(&self.geometry_ctx, coords)
            }
        }
    }

    /// True if this constraint is satisfied by a leaf cell's coordinate.
    fn matches_leaf(&self, coords: &[f64]) -> bool {
        let v = coords[self.column];
        match self.op {
            ConstraintOp::Le => v <= self.value,
            ConstraintOp::Lt => v < self.value,
            ConstraintOp::Ge => v >= self.value,
            ConstraintOp::Gt => v > self.value,
            ConstraintOp::Eq => v == self.value,
            ConstraintOp::Match => {
                let Some(geom) = &self.geometry else { return true };
                geom.overlaps(&self.geometry_ctx, coords)
            }
        }
    }
}

pub(crate) fn internal_excluded(constraints: &[Constraint], coords: &[f64]) -> bool {
    constraints.iter().any(|c| c.excludes_internal(coords))
}

pub(crate) fn leaf_matches(constraints: &[Constraint], coords: &[f64]) -> bool {
    constraints.iter().all(|c| c.matches_leaf(coords))
}

enum Strategy {
    RowidLookup,
    TreeScan,
}

/// A positioned scan: the current node, its height, the cell index within
/// it, and the compiled constraint list. `row()` yields the current leaf
/// rowid.
pub struct RTreeCursor<'a> {
    descriptor: &'a RTreeDescriptor,
    strategy: Strategy,
    constraints: Vec<Constraint>,
    node: Option<NodeRef>,
    height: u16,
    cell_index: usize,
    done: bool,
}

impl<'a> RTreeCursor<'a> {
    /// Opens a strategy-1 cursor (direct rowid lookup), one-shot.
    pub fn open_rowid(descriptor: &'a RTreeDescriptor, rowid: i64) -> RTreeResult<Self> {
        let leaf = super::delete::find_leaf(descriptor, rowid)?;
        let (node, cell_index, done) = match &leaf {
            Some(n) => match n.borrow().page.find_cell(rowid) {
                Some(idx) => (leaf, idx, false),
                None => (None, 0, true),
            },
            None => (None, 0, true),
        };
        Ok(RTreeCursor {
            descriptor,
            strategy: Strategy::RowidLookup,
            constraints: Vec::new(),
            node,
            height: 0,
            cell_index,
            done,
        })
    }

    /// Opens a strategy-2 cursor (tree scan), positioning at the first
    /// leaf cell satisfying every constraint.
    pub fn open_scan(descriptor: &'a RTreeDescriptor, constraints: Vec<Constraint>) -> RTreeResult<Self> {
        let mut cache = descriptor.cache.borrow_mut();
        let root = cache.acquire(&descriptor.store, super::types::ROOT_NODE_ID, None)?;
        drop(cache);
        let height = descriptor.height()?;

        let mut cursor = RTreeCursor {
            descriptor,
            strategy: Strategy::TreeScan,
            constraints,
            node: Some(root),
            height,
            cell_index: 0,
            done: false,
        };
        if !cursor.descend_to_match() {
            cursor.done = true;
        }
        Ok(cursor)
    }

    pub fn eof(&self) -> bool {
        self.done
    }

    /// The rowid at the current cursor position.
    pub fn row(&self) -> Option<i64> {
        if self.done {
            return None;
        }
        self.node.as_ref().map(|n| n.borrow().page.cells[self.cell_index].key)
    }

    /// Advances to the next qualifying row.
    pub fn next(&mut self) -> RTreeResult<()> {
        if self.done {
            return Ok(());
        }
        match self.strategy {
            Strategy::RowidLookup => {
                self.done = true;
                Ok(())
            }
            Strategy::TreeScan => self.advance_scan(),
        }
    }

    /// Descend-to-cell recursion: from the current `(node, cell_index,
    /// height)`, finds the first terminal (leaf) cell at or after the
    /// current position satisfying every constraint, descending into
    /// non-excluded children and backtracking to the next sibling when a
    /// subtree yields nothing.
    fn descend_to_match(&mut self) -> bool {
        loop {
            let node = self.node.clone().expect("descend called with a positioned node");
            let cell_count = node.borrow().page.len();

            if self.cell_index >= cell_count {
                return false;
            }

            let coords = node.borrow().page.cells[self.cell_index].coords.clone();

            if self.height == 0 {
                if leaf_matches(&self.constraints, &coords) {
                    return true;
                }
                self.cell_index += 1;
                continue;
            }

            if internal_excluded(&self.constraints, &coords) {
                self.cell_index += 1;
                continue;
            }

            let child_id = node.borrow().page.cells[self.cell_index].key as NodeId;
            let child = {
                let mut cache = self.descriptor.cache.borrow_mut();
                match cache.acquire(&self.descriptor.store, child_id, Some(node.clone())) {
                    Ok(c) => c,
                    Err(_) => return false,
                }
            };

            let saved_index = self.cell_index;
            self.node = Some(child);
            self.height -= 1;
            self.cell_index = 0;

            if self.descend_to_match() {
                return true;
            }

            if let Some(child) = self.node.take() {
                let mut cache = self.descriptor.cache.borrow_mut();
                let _ = cache.release(&self.descriptor.store, child);
            }
            self.node = Some(node);
            self.height += 1;
            self.cell_index = saved_index + 1;
        }
    }

    /// Advances within the current leaf; on exhaustion walks up via the
    /// parent link, locating the parent cell index by a linear scan
    /// matching the child's id, and resumes descent from the next
    /// sibling at that level.
    fn advance_scan(&mut self) -> RTreeResult<()> {
        self.cell_index += 1;
        loop {
            if self.descend_to_match() {
                return Ok(());
            }

            let node = self.node.clone().expect("positioned node during advance");
            let parent = node.borrow().parent.clone();
            let Some(parent) = parent else {
                self.done = true;
                return Ok(());
            };
            let child_id = node.borrow().id;
            let idx = parent.borrow().page.find_cell(child_id as i64).ok_or_else(|| {
                RTreeError::corruption(format!("node {child_id} not found in its parent during advance"))
            })?;
            self.node = Some(parent);
            self.height += 1;
            self.cell_index = idx + 1;
        }
    }
}

impl<'a> Drop for RTreeCursor<'a> {
    fn drop(&mut self) {
        if let Some(node) = self.node.take() {
            let mut cache = self.descriptor.cache.borrow_mut();
            let _ = cache.release(&self.descriptor.store, node);
        }
    }
}

/// Populates parent back-links from `leaf` to the root, for callers that
/// acquire a leaf outside `find_leaf` (e.g. while repositioning a cursor).
pub fn fix_leaf_parent_public(descriptor: &RTreeDescriptor, leaf: &NodeRef) -> RTreeResult<()> {
    fix_leaf_parent(descriptor, leaf)
}
