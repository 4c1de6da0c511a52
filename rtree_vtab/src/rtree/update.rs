//! Update dispatch (§4.8), index selection (§4.9), and MATCH argument
//! decoding (§4.10).

use super::cursor::{Constraint, ConstraintOp};
use super::delete::rtree_delete_rowid;
use super::descriptor::RTreeDescriptor;
use super::error::{RTreeError, RTreeResult};
use super::insert::{choose_leaf, insert_cell};
use super::types::{Cell, CoordType};

/// How an update operand's new rowid collides with an existing one, as
/// signalled by the host's conflict-resolution policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    Replace,
    Abort,
}

/// `[old_rowid_or_null, new_rowid_or_null, coord0_min, coord0_max, ...]`.
pub struct UpdateOperand {
    pub old_rowid: Option<i64>,
    pub new_rowid: Option<i64>,
    pub coords: Vec<f64>,
}

/// Applies one update operand, returning the rowid the row now has (the
/// caller's supplied rowid, or the freshly allocated one).
pub fn dispatch_update(descriptor: &RTreeDescriptor, operand: UpdateOperand, conflict: ConflictPolicy) -> RTreeResult<Option<i64>> {
    if operand.coords.is_empty() {
        let Some(old) = operand.old_rowid else {
            return Err(RTreeError::argument("update operand with no coordinates must carry an old rowid"));
        };
        rtree_delete_rowid(descriptor, old)?;
        return Ok(None);
    }

    validate_bounds(&operand.coords, descriptor.dims)?;

    if let Some(new_rowid) = operand.new_rowid {
        if descriptor.store.read_rowid_node(new_rowid)?.is_some() {
            match conflict {
                ConflictPolicy::Replace => rtree_delete_rowid(descriptor, new_rowid)?,
                ConflictPolicy::Abort => {
                    return Err(RTreeError::constraint(format!("rowid {new_rowid} already present")))
                }
            }
        }
    }

    if let Some(old_rowid) = operand.old_rowid {
        rtree_delete_rowid(descriptor, old_rowid)?;
    }

    let rowid = match operand.new_rowid {
        Some(r) => r,
        None => descriptor.store.allocate_rowid()?,
    };

    let coords = round_coords(&operand.coords, descriptor.coord_type);

    descriptor.reset_reinsert_height();
    let leaf = choose_leaf(descriptor, &coords, 0)?;
    insert_cell(descriptor, leaf, Cell::new(rowid, coords), 0)?;
    Ok(Some(rowid))
}

fn validate_bounds(coords: &[f64], dims: usize) -> RTreeResult<()> {
    for axis in 0..dims {
        if coords[2 * axis] > coords[2 * axis + 1] {
            return Err(RTreeError::constraint(format!(
                "axis {axis} min {} exceeds max {}",
                coords[2 * axis],
                coords[2 * axis + 1]
            )));
        }
    }
    Ok(())
}

/// Rounds each endpoint through the stored coordinate type's precision so
/// the persisted rectangle never shrinks relative to the caller's `f64`
/// input: minimums round toward `-infinity`, maximums toward `+infinity`.
fn round_coords(coords: &[f64], coord_type: CoordType) -> Vec<f64> {
    if coord_type == CoordType::Int {
        return coords.to_vec();
    }
    coords
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let rounded = v as f32;
            let is_min = i % 2 == 0;
            let conservative = if is_min {
                if (rounded as f64) > v {
                    widen_down(rounded)
                } else {
                    rounded
                }
            } else if (rounded as f64) < v {
                widen_up(rounded)
            } else {
                rounded
            };
            conservative as f64
        })
        .collect()
}

fn widen_down(v: f32) -> f32 {
    if v == 0.0 {
        return -f32::MIN_POSITIVE;
    }
    (v as f64 * rnd_towards(v)) as f32
}

fn widen_up(v: f32) -> f32 {
    if v == 0.0 {
        return f32::MIN_POSITIVE;
    }
    (v as f64 * rnd_away(v)) as f32
}

fn rnd_towards(v: f32) -> f64 {
    if v > 0.0 {
        1.0 - 1.0 / 8388608.0
    } else {
        1.0 + 1.0 / 8388608.0
    }
}

fn rnd_away(v: f32) -> f64 {
    if v > 0.0 {
        1.0 + 1.0 / 8388608.0
    } else {
        1.0 - 1.0 / 8388608.0
    }
}

/// `idxNum` the planner encodes into its query plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    RowidLookup = 1,
    TreeScan = 2,
}

/// Result of index selection: which strategy, its encoded constraint
/// record (`idxStr`, empty for strategy 1), and its estimated cost.
pub struct IndexPlan {
    pub strategy: Strategy,
    pub idx_str: Vec<u8>,
    pub estimated_cost: f64,
    pub consumed: usize,
}

/// A raw planner-side constraint before compilation into `Constraint`:
/// `column` follows the virtual-table's declared column order (0 = rowid,
/// 1..=2*dims the coordinate pairs).
pub struct PlannerConstraint {
    pub column: usize,
    pub op: ConstraintOp,
    pub usable: bool,
}

fn op_code(op: ConstraintOp) -> u8 {
    match op {
        ConstraintOp::Eq => 0x41,
        ConstraintOp::Le => 0x42,
        ConstraintOp::Lt => 0x43,
        ConstraintOp::Ge => 0x44,
        ConstraintOp::Gt => 0x45,
        ConstraintOp::Match => 0x46,
    }
}

/// Chooses strategy 1 (rowid lookup) when a usable `EQ` constraint on the
/// rowid column (0) is present; otherwise strategy 2, encoding every
/// usable coordinate/MATCH constraint as a two-byte `(op, 'a' + column -
/// 1)` record.
pub fn choose_strategy(constraints: &[PlannerConstraint]) -> IndexPlan {
    if let Some(pos) = constraints.iter().position(|c| c.usable && c.column == 0 && c.op == ConstraintOp::Eq) {
        return IndexPlan { strategy: Strategy::RowidLookup, idx_str: Vec::new(), estimated_cost: 1.0, consumed: pos };
    }

    let mut idx_str = Vec::new();
    let mut count = 0usize;
    for c in constraints {
        if !c.usable || c.column == 0 {
            continue;
        }
        idx_str.push(op_code(c.op));
        idx_str.push(b'a' + (c.column as u8 - 1));
        count += 1;
    }
    let cost = 2_000_000.0 / (1.0 + count as f64);
    IndexPlan { strategy: Strategy::TreeScan, idx_str, estimated_cost: cost, consumed: count }
}

/// Decodes an encoded `idxStr` back into compiled `Constraint`s paired
/// with the coordinate column each targets, for callers that persist the
/// plan across calls rather than the `PlannerConstraint` list itself.
pub fn decode_idx_str(idx_str: &[u8], values: &[f64]) -> RTreeResult<Vec<Constraint>> {
    if idx_str.len() % 2 != 0 || idx_str.len() / 2 != values.len() {
        return Err(RTreeError::argument("idxStr length does not match bound value count"));
    }
    let mut out = Vec::with_capacity(values.len());
    for (i, pair) in idx_str.chunks(2).enumerate() {
        let op = match pair[0] {
            0x41 => ConstraintOp::Eq,
            0x42 => ConstraintOp::Le,
            0x43 => ConstraintOp::Lt,
            0x44 => ConstraintOp::Ge,
            0x45 => ConstraintOp::Gt,
            0x46 => ConstraintOp::Match,
            other => return Err(RTreeError::argument(format!("unrecognized op code {other:#x}"))),
        };
        let column = (pair[1] - b'a') as usize;
        out.push(Constraint::relational(column, op, values[i]));
    }
    Ok(out)
}

/// Fixed MATCH-blob header magic (§4.10).
const MATCH_MAGIC: u32 = 0x891245AB;

/// A decoded MATCH right-hand side: the registered geometry name
/// (resolved by the caller from `fn_ptr`), the opaque context word, and
/// the scalar parameters that followed the header.
pub struct MatchArgument {
    pub fn_ptr: u64,
    pub context: Vec<u8>,
    pub params: Vec<f64>,
}

/// Bytes preceding the scalar array: `magic: u32, fn_ptr: u64, context:
/// [u8; 8], n_param: u32`.
const MATCH_PREFIX_LEN: usize = 4 + 8 + 8 + 4;
const MATCH_CONTEXT_LEN: usize = 8;

/// The original `RtreeMatchArg` struct embeds the first of its `nParam`
/// scalars directly (`aParam[1]`), so its `sizeof` already counts one
/// scalar; a blob's total size is this constant plus `(n_param - 1)`
/// further scalars.
const MATCH_HEADER_LEN: usize = MATCH_PREFIX_LEN + 8;

/// Decodes a MATCH blob, validating the magic number and that its size
/// exactly matches `header + (n_param - 1) * sizeof(scalar)` (§4.10).
pub fn decode_match_blob(blob: &[u8]) -> RTreeResult<MatchArgument> {
    if blob.len() < MATCH_PREFIX_LEN {
        return Err(RTreeError::argument("MATCH blob shorter than its fixed header"));
    }
    let magic = u32::from_be_bytes(blob[0..4].try_into().unwrap());
    if magic != MATCH_MAGIC {
        return Err(RTreeError::argument(format!("MATCH blob magic {magic:#x} != {MATCH_MAGIC:#x}")));
    }
    let fn_ptr = u64::from_be_bytes(blob[4..12].try_into().unwrap());
    let context = blob[12..12 + MATCH_CONTEXT_LEN].to_vec();
    let n_param = u32::from_be_bytes(blob[20..24].try_into().unwrap()) as usize;

    if n_param == 0 {
        return Err(RTreeError::argument("MATCH blob must carry at least one parameter"));
    }

    let expected_len = MATCH_HEADER_LEN + (n_param - 1) * 8;
    if blob.len() != expected_len {
        return Err(RTreeError::argument(format!(
            "MATCH blob size {} does not match header-declared size {expected_len}",
            blob.len()
        )));
    }

    let mut params = Vec::with_capacity(n_param);
    for i in 0..n_param {
        let off = MATCH_PREFIX_LEN + i * 8;
        params.push(f64::from_be_bytes(blob[off..off + 8].try_into().unwrap()));
    }
    Ok(MatchArgument { fn_ptr, context, params })
}
