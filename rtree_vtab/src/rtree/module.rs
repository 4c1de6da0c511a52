//! Host plugin surface: `RTreeIndexer` implements `NitriteIndexerProvider`
//! and `NitritePluginProvider`; `RTreeModule` registers it the way every
//! other Nitrite indexer plugin registers itself. This is the crate's
//! equivalent of `CREATE VIRTUAL TABLE ... USING rtree(...)`, since the
//! host has no generic virtual-table DDL of its own.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use parking_lot::Mutex;

use nitrite::collection::{FindPlan, NitriteId};
use nitrite::common::{FieldValues, Fields, NitriteModule, NitritePlugin, NitritePluginProvider, PluginRegistrar};
use nitrite::errors::{ErrorKind, NitriteError, NitriteResult};
use nitrite::index::{IndexDescriptor, NitriteIndexer, NitriteIndexerProvider};
use nitrite::nitrite_config::NitriteConfig;
use nitrite::store::NitriteStore;

use super::cursor::{Constraint, GeometryCallback, RTreeCursor};
use super::descriptor::{RTreeDescriptor, SplitPolicy};
use super::filter::{as_rtree_filter, is_rtree_filter, RTREE_INDEX, RTREE_INT_INDEX};
use super::store::drop_tables;
use super::types::CoordType;
use super::update::{dispatch_update, ConflictPolicy, UpdateOperand};

/// Default page size for a newly created index (§6 node-size formula takes
/// this as its `page_size` input).
const DEFAULT_PAGE_SIZE: usize = 4096;

struct RTreeIndexHandle {
    descriptor: Mutex<RTreeDescriptor>,
    fields: Vec<String>,
}

/// One registered R-tree index family: float (`RTree`) or int32
/// (`RTreeInt`), matching the `rtree`/`rtree_i32` virtual-table aliases.
#[derive(Clone)]
pub struct RTreeIndexer {
    inner: Arc<RTreeIndexerInner>,
}

struct RTreeIndexerInner {
    index_type_name: &'static str,
    coord_type: CoordType,
    registry: RwLock<HashMap<String, Arc<RTreeIndexHandle>>>,
    geometry_registry: RwLock<HashMap<String, Arc<dyn GeometryCallback>>>,
}

impl RTreeIndexer {
    pub fn new_float() -> Self {
        Self::with_coord_type(RTREE_INDEX, CoordType::Float)
    }

    pub fn new_int() -> Self {
        Self::with_coord_type(RTREE_INT_INDEX, CoordType::Int)
    }

    fn with_coord_type(index_type_name: &'static str, coord_type: CoordType) -> Self {
        RTreeIndexer {
            inner: Arc::new(RTreeIndexerInner {
                index_type_name,
                coord_type,
                registry: RwLock::new(HashMap::new()),
                geometry_registry: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Registers a MATCH geometry callback under `name`, for `RTreeFilter::match_geometry`
    /// queries and decoded `MatchArgument::fn_ptr` resolution (§4.10, §6 "geometry-callback
    /// registration").
    pub fn register_geometry(&self, name: impl Into<String>, callback: Arc<dyn GeometryCallback>) {
        self.inner.geometry_registry.write().unwrap().insert(name.into(), callback);
    }

    fn index_name(descriptor: &IndexDescriptor) -> String {
        let fields = descriptor.index_fields().field_names().join("_");
        format!("{}_{}_{}_idx", descriptor.collection_name(), fields, descriptor.index_type())
    }

    fn get_or_create(&self, descriptor: &IndexDescriptor, config: &NitriteConfig) -> NitriteResult<Arc<RTreeIndexHandle>> {
        let name = Self::index_name(descriptor);
        if let Some(handle) = self.inner.registry.read().unwrap().get(&name) {
            return Ok(handle.clone());
        }

        let fields = descriptor.index_fields().field_names();
        let dims = fields.len() / 2;
        let store: NitriteStore = config.nitrite_store()?;
        let engine = RTreeDescriptor::open(&store, &name, dims, self.inner.coord_type, SplitPolicy::RStar, DEFAULT_PAGE_SIZE)
            .map_err(NitriteError::from)?;
        let handle = Arc::new(RTreeIndexHandle { descriptor: Mutex::new(engine), fields });

        self.inner.registry.write().unwrap().insert(name, handle.clone());
        Ok(handle)
    }

    fn resolve_geometry(&self, name: &str) -> NitriteResult<Arc<dyn GeometryCallback>> {
        self.inner
            .geometry_registry
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| NitriteError::new(&format!("no geometry callback registered under '{name}'"), ErrorKind::FilterError))
    }

    /// Builds a MATCH filter against a callback previously registered with
    /// `register_geometry`, resolving it by name rather than requiring the
    /// caller to hold the `Arc<dyn GeometryCallback>` itself.
    pub fn match_by_name(&self, fields: Vec<String>, name: &str, ctx: Vec<u8>) -> NitriteResult<super::filter::RTreeFilter> {
        let geometry = self.resolve_geometry(name)?;
        Ok(super::filter::RTreeFilter::match_geometry(fields, geometry, ctx))
    }
}

impl NitriteIndexerProvider for RTreeIndexer {
    fn index_type(&self) -> String {
        self.inner.index_type_name.to_string()
    }

    fn is_unique(&self) -> bool {
        false
    }

    fn validate_index(&self, fields: &Fields) -> NitriteResult<()> {
        let n = fields.field_names().len();
        if n == 0 || n % 2 != 0 || n > 10 {
            return Err(NitriteError::new(
                "rtree index requires an even field count in [2, 10]: (x0_min, x0_max, x1_min, x1_max, ...)",
                ErrorKind::IndexingError,
            ));
        }
        Ok(())
    }

    fn drop_index(&self, index_descriptor: &IndexDescriptor, config: &NitriteConfig) -> NitriteResult<()> {
        let name = Self::index_name(index_descriptor);
        self.inner.registry.write().unwrap().remove(&name);
        let store = config.nitrite_store()?;
        drop_tables(&store, &name).map_err(NitriteError::from)
    }

    fn write_index_entry(&self, field_values: &FieldValues, index_descriptor: &IndexDescriptor, nitrite_config: &NitriteConfig) -> NitriteResult<()> {
        let handle = self.get_or_create(index_descriptor, nitrite_config)?;
        let coords = read_coords(field_values, &handle.fields)?;
        let rowid = field_values.nitrite_id().id_value() as i64;

        let operand = UpdateOperand { old_rowid: None, new_rowid: Some(rowid), coords };
        let descriptor = handle.descriptor.lock();
        dispatch_update(&descriptor, operand, ConflictPolicy::Replace)
            .map(|_| ())
            .map_err(NitriteError::from)
    }

    fn remove_index_entry(&self, field_values: &FieldValues, index_descriptor: &IndexDescriptor, nitrite_config: &NitriteConfig) -> NitriteResult<()> {
        let handle = self.get_or_create(index_descriptor, nitrite_config)?;
        let rowid = field_values.nitrite_id().id_value() as i64;

        let operand = UpdateOperand { old_rowid: Some(rowid), new_rowid: None, coords: Vec::new() };
        let descriptor = handle.descriptor.lock();
        dispatch_update(&descriptor, operand, ConflictPolicy::Abort)
            .map(|_| ())
            .map_err(NitriteError::from)
    }

    fn find_by_filter(&self, find_plan: &FindPlan, nitrite_config: &NitriteConfig) -> NitriteResult<Vec<NitriteId>> {
        let index_descriptor = find_plan
            .index_descriptor()
            .ok_or_else(|| NitriteError::new("No index descriptor in find plan", ErrorKind::FilterError))?;
        let handle = self.get_or_create(&index_descriptor, nitrite_config)?;

        let index_scan_filter = find_plan
            .index_scan_filter()
            .ok_or_else(|| NitriteError::new("No rtree filter found", ErrorKind::FilterError))?;
        let filters = index_scan_filter.filters();
        let filter = filters
            .first()
            .ok_or_else(|| NitriteError::new("No rtree filter found", ErrorKind::FilterError))?;
        if !is_rtree_filter(filter) {
            return Err(NitriteError::new("rtree index scan requires an RTreeFilter", ErrorKind::FilterError));
        }
        let rtree_filter = as_rtree_filter(filter)
            .ok_or_else(|| NitriteError::new("Failed to recover RTreeFilter", ErrorKind::FilterError))?;

        // `FindPlan::by_id_filter` is the host's own rowid-lookup path and never
        // reaches this indexer, so every RTreeFilter query here is a tree scan.
        let descriptor = handle.descriptor.lock();
        let engine_constraints = clone_constraints(rtree_filter);
        let mut cursor = RTreeCursor::open_scan(&descriptor, engine_constraints).map_err(NitriteError::from)?;

        let mut results = Vec::new();
        while !cursor.eof() {
            if let Some(row) = cursor.row() {
                results.push(NitriteId::create_id(row as u64)?);
            }
            cursor.next().map_err(NitriteError::from)?;
        }
        Ok(results)
    }
}

/// Clones a filter's compiled constraints for a fresh cursor, since
/// `RTreeCursor::open_scan` takes ownership of its constraint list.
fn clone_constraints(filter: &super::filter::RTreeFilter) -> Vec<Constraint> {
    filter
        .constraints()
        .iter()
        .map(|c| match &c.geometry {
            Some(geom) => Constraint::match_geometry(c.column, geom.clone(), c.geometry_ctx.clone()),
            None => Constraint::relational(c.column, c.op, c.value),
        })
        .collect()
}

fn read_coords(field_values: &FieldValues, fields: &[String]) -> NitriteResult<Vec<f64>> {
    let mut coords = Vec::with_capacity(fields.len());
    for field in fields {
        let value = field_values
            .get_value(field)
            .ok_or_else(|| NitriteError::new(&format!("rtree index entry missing field '{field}'"), ErrorKind::IndexingError))?;
        let coord = value
            .as_f64()
            .copied()
            .or_else(|| value.as_i64().map(|v| *v as f64))
            .ok_or_else(|| NitriteError::new(&format!("rtree field '{field}' is not numeric"), ErrorKind::IndexingError))?;
        coords.push(coord);
    }
    Ok(coords)
}

impl NitritePluginProvider for RTreeIndexer {
    fn initialize(&self, _config: NitriteConfig) -> NitriteResult<()> {
        Ok(())
    }

    fn close(&self) -> NitriteResult<()> {
        Ok(())
    }

    fn as_plugin(&self) -> NitritePlugin {
        NitritePlugin::new(RTreeIndexer { inner: self.inner.clone() })
    }
}

/// Registers the float and int32 R-tree indexers with the host, the
/// crate's equivalent of `CREATE VIRTUAL TABLE ... USING rtree(...)` /
/// `USING rtree_i32(...)`.
pub struct RTreeModule;

impl Default for RTreeModule {
    fn default() -> Self {
        Self
    }
}

impl NitriteModule for RTreeModule {
    fn plugins(&self) -> NitriteResult<Vec<NitritePlugin>> {
        Ok(vec![NitritePlugin::new(RTreeIndexer::new_float()), NitritePlugin::new(RTreeIndexer::new_int())])
    }

    fn load(&self, plugin_registrar: &PluginRegistrar) -> NitriteResult<()> {
        plugin_registrar.register_indexer_plugin(NitriteIndexer::new(RTreeIndexer::new_float()))?;
        plugin_registrar.register_indexer_plugin(NitriteIndexer::new(RTreeIndexer::new_int()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_index_accepts_even_field_count_in_range() {
        let indexer = RTreeIndexer::new_float();
        let fields = Fields::with_names(vec!["x0_min", "x0_max", "x1_min", "x1_max"]).unwrap();
        assert!(indexer.validate_index(&fields).is_ok());
    }

    #[test]
    fn validate_index_rejects_odd_field_count() {
        let indexer = RTreeIndexer::new_float();
        let fields = Fields::with_names(vec!["x0_min", "x0_max", "x1_min"]).unwrap();
        assert!(indexer.validate_index(&fields).is_err());
    }

    #[test]
    fn validate_index_rejects_too_many_dimensions() {
        let indexer = RTreeIndexer::new_float();
        let names: Vec<&str> = vec!["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l"];
        let fields = Fields::with_names(names).unwrap();
        assert!(indexer.validate_index(&fields).is_err());
    }

    #[test]
    fn index_type_matches_float_and_int_aliases() {
        assert_eq!(RTreeIndexer::new_float().index_type(), RTREE_INDEX);
        assert_eq!(RTreeIndexer::new_int().index_type(), RTREE_INT_INDEX);
    }

    #[test]
    fn module_registers_both_indexer_plugins() {
        let module = RTreeModule;
        let plugins = module.plugins().unwrap();
        assert_eq!(plugins.len(), 2);
    }
}
