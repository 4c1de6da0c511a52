//! Introspection helpers. The original virtual-table exposes `rtreenode`
//! and `rtreedepth` as SQL scalar functions over a raw page blob; this host
//! has no scalar-function registration surface, so they're plain functions
//! here instead, callable directly against a node blob read from the
//! `<name>_node` table.

use super::codec::decode_node;
use super::error::RTreeResult;
use super::types::CoordType;

/// Decodes `blob` as a node of an `ndim`-dimension index and renders one
/// line per cell: `key coord0_min coord0_max coord1_min coord1_max ...`.
pub fn rtreenode(ndim: usize, blob: &[u8], coord_type: CoordType, is_root: bool) -> RTreeResult<String> {
    let page = decode_node(blob, ndim, coord_type, is_root)?;
    let mut out = String::new();
    for cell in &page.cells {
        out.push_str(&cell.key.to_string());
        for coord in &cell.coords {
            out.push(' ');
            out.push_str(&coord.to_string());
        }
        out.push('\n');
    }
    Ok(out)
}

/// Decodes the root page of an `ndim`-dimension index and returns its
/// recorded tree height (0 for a lone leaf root).
pub fn rtreedepth(ndim: usize, root_blob: &[u8], coord_type: CoordType) -> RTreeResult<u16> {
    let page = decode_node(root_blob, ndim, coord_type, true)?;
    Ok(page.height)
}
