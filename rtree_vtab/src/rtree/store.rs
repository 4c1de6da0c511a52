//! Backing-store adapter: the three key/value tables (`node`, `rowid`,
//! `parent`) an index is persisted through, each modeled as one host
//! `NitriteMap`.

use nitrite::common::Value;
use nitrite::store::{NitriteMap, NitriteStore};

use super::error::{RTreeError, RTreeResult};
use super::types::NodeId;

/// Nine prepared operations (read/write/delete across three tables),
/// exposed here as typed methods instead of raw statements.
pub struct BackingStore {
    node_map: NitriteMap,
    rowid_map: NitriteMap,
    parent_map: NitriteMap,
    node_size: usize,
}

impl BackingStore {
    /// Opens (creating if absent) the three tables for `index_name` and
    /// seeds node id 1 with a zero-filled page if the node table is empty.
    pub fn open(store: &NitriteStore, index_name: &str, node_size: usize) -> RTreeResult<Self> {
        let node_map = store.open_map(&format!("{index_name}_node"))?;
        let rowid_map = store.open_map(&format!("{index_name}_rowid"))?;
        let parent_map = store.open_map(&format!("{index_name}_parent"))?;

        let adapter = BackingStore { node_map, rowid_map, parent_map, node_size };
        if !adapter.node_map.contains_key(&node_key(super::types::ROOT_NODE_ID))? {
            adapter.write_node(super::types::ROOT_NODE_ID, &vec![0u8; node_size])?;
        }
        Ok(adapter)
    }

    pub fn node_size(&self) -> usize {
        self.node_size
    }

    pub fn read_node(&self, id: NodeId) -> RTreeResult<Vec<u8>> {
        let value = self
            .node_map
            .get(&node_key(id))?
            .ok_or_else(|| RTreeError::corruption(format!("node {id} missing from backing store")))?;
        let bytes = value
            .as_bytes()
            .ok_or_else(|| RTreeError::corruption(format!("node {id} blob has wrong type")))?;
        if bytes.len() != self.node_size {
            return Err(RTreeError::corruption(format!(
                "node {id} blob size {} != configured node size {}",
                bytes.len(),
                self.node_size
            )));
        }
        Ok(bytes.clone())
    }

    pub fn write_node(&self, id: NodeId, data: &[u8]) -> RTreeResult<()> {
        self.node_map.put(node_key(id), Value::Bytes(data.to_vec()))?;
        Ok(())
    }

    pub fn delete_node(&self, id: NodeId) -> RTreeResult<()> {
        self.node_map.remove(&node_key(id))?;
        Ok(())
    }

    /// Allocates a fresh node id. The adapter has no free list of its own;
    /// it hands out `max(existing ids) + 1`, which is stable under the
    /// engine's "flush assigns an id on first write" lifecycle.
    pub fn allocate_node_id(&self) -> RTreeResult<NodeId> {
        let highest = self
            .node_map
            .last_key()?
            .and_then(|k| k.as_u64().copied())
            .unwrap_or(0);
        Ok(highest + 1)
    }

    /// Hands out `max(existing rowids) + 1`, for update operands that omit
    /// a rowid entirely.
    pub fn allocate_rowid(&self) -> RTreeResult<i64> {
        let highest = self
            .rowid_map
            .last_key()?
            .and_then(|k| k.as_i64().copied())
            .unwrap_or(0);
        Ok(highest + 1)
    }

    pub fn read_rowid_node(&self, rowid: i64) -> RTreeResult<Option<NodeId>> {
        Ok(self
            .rowid_map
            .get(&Value::I64(rowid))?
            .and_then(|v| v.as_u64().copied()))
    }

    pub fn write_rowid_node(&self, rowid: i64, node_id: NodeId) -> RTreeResult<()> {
        self.rowid_map.put(Value::I64(rowid), Value::U64(node_id))?;
        Ok(())
    }

    pub fn delete_rowid(&self, rowid: i64) -> RTreeResult<()> {
        self.rowid_map.remove(&Value::I64(rowid))?;
        Ok(())
    }

    pub fn read_parent(&self, node_id: NodeId) -> RTreeResult<Option<NodeId>> {
        Ok(self
            .parent_map
            .get(&Value::U64(node_id))?
            .and_then(|v| v.as_u64().copied()))
    }

    pub fn write_parent(&self, node_id: NodeId, parent_id: NodeId) -> RTreeResult<()> {
        self.parent_map.put(Value::U64(node_id), Value::U64(parent_id))?;
        Ok(())
    }

    pub fn delete_parent(&self, node_id: NodeId) -> RTreeResult<()> {
        self.parent_map.remove(&Value::U64(node_id))?;
        Ok(())
    }
}

fn node_key(id: NodeId) -> Value {
    Value::U64(id)
}

/// Removes the three backing tables for `index_name`, for `drop_index`.
pub fn drop_tables(store: &NitriteStore, index_name: &str) -> RTreeResult<()> {
    store.remove_map(&format!("{index_name}_node"))?;
    store.remove_map(&format!("{index_name}_rowid"))?;
    store.remove_map(&format!("{index_name}_parent"))?;
    Ok(())
}
