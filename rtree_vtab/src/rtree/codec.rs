//! Big-endian page codec. Moves fixed-width fields in and out of a node's
//! raw page buffer; entirely type-agnostic about what a coordinate "means" —
//! that interpretation lives with the index descriptor's `CoordType`.

use super::error::{RTreeError, RTreeResult};
use super::types::{bytes_per_cell, Cell, CoordType, NodePage};

const HEADER_SIZE: usize = 4;
const CELL_KEY_SIZE: usize = 8;

pub fn read_i16(buf: &[u8], offset: usize) -> i16 {
    i16::from_be_bytes([buf[offset], buf[offset + 1]])
}

pub fn write_i16(buf: &mut [u8], offset: usize, value: i16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}

pub fn read_i64(buf: &[u8], offset: usize) -> i64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[offset..offset + 8]);
    i64::from_be_bytes(b)
}

pub fn write_i64(buf: &mut [u8], offset: usize, value: i64) {
    buf[offset..offset + 8].copy_from_slice(&value.to_be_bytes());
}

/// Reads a raw 4-byte coordinate pattern and interprets it per `coord_type`,
/// widened to `f64`.
pub fn read_coord(buf: &[u8], offset: usize, coord_type: CoordType) -> f64 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&buf[offset..offset + 4]);
    match coord_type {
        CoordType::Float => f32::from_be_bytes(b) as f64,
        CoordType::Int => i32::from_be_bytes(b) as f64,
    }
}

/// Writes a coordinate, narrowing from `f64` per `coord_type`. Callers are
/// responsible for any conservative rounding before this call (see
/// `update::round_for_storage`); this function performs a plain narrowing
/// cast.
pub fn write_coord(buf: &mut [u8], offset: usize, value: f64, coord_type: CoordType) {
    let bytes = match coord_type {
        CoordType::Float => (value as f32).to_be_bytes(),
        CoordType::Int => (value as i32).to_be_bytes(),
    };
    buf[offset..offset + 4].copy_from_slice(&bytes);
}

/// `cell_count(node) = read_i16(buf[2..4])`.
pub fn cell_count(buf: &[u8]) -> i16 {
    read_i16(buf, 2)
}

pub fn cell_offset(cell_index: usize, dims: usize) -> usize {
    HEADER_SIZE + cell_index * bytes_per_cell(dims)
}

/// Decodes an entire page into a `NodePage`. `is_root` controls whether
/// bytes `[0..2)` are interpreted as the tree height.
pub fn decode_node(
    buf: &[u8],
    dims: usize,
    coord_type: CoordType,
    is_root: bool,
) -> RTreeResult<NodePage> {
    let height = if is_root { read_i16(buf, 0) as u16 } else { 0 };
    let count = cell_count(buf);
    if count < 0 {
        return Err(RTreeError::corruption("negative cell count"));
    }
    let count = count as usize;

    let mut cells = Vec::with_capacity(count);
    for i in 0..count {
        let base = cell_offset(i, dims);
        let key = read_i64(buf, base);
        let mut coords = Vec::with_capacity(2 * dims);
        for j in 0..2 * dims {
            coords.push(read_coord(buf, base + CELL_KEY_SIZE + j * 4, coord_type));
        }
        cells.push(Cell::new(key, coords));
    }
    Ok(NodePage { height, cells })
}

/// Encodes a `NodePage` into a fresh zero-filled page of `node_size` bytes.
pub fn encode_node(
    node: &NodePage,
    node_size: usize,
    dims: usize,
    coord_type: CoordType,
    is_root: bool,
) -> Vec<u8> {
    let mut buf = vec![0u8; node_size];
    if is_root {
        write_i16(&mut buf, 0, node.height as i16);
    }
    write_i16(&mut buf, 2, node.cells.len() as i16);
    for (i, cell) in node.cells.iter().enumerate() {
        let base = cell_offset(i, dims);
        write_i64(&mut buf, base, cell.key);
        for (j, coord) in cell.coords.iter().enumerate() {
            write_coord(&mut buf, base + CELL_KEY_SIZE + j * 4, *coord, coord_type);
        }
    }
    buf
}
