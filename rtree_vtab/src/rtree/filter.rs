//! `RTreeFilter`: the host `FilterProvider` implementor through which a
//! query reaches this module's search engine. Carries the compiled §4.5
//! constraint list (built by the constructors below from a rectangle or a
//! registered MATCH geometry) plus the coordinate field names the filter's
//! columns are indexed against.

use std::any::Any;
use std::fmt::{self, Display};
use std::sync::{Arc, OnceLock};

use nitrite::collection::Document;
use nitrite::errors::{ErrorKind, NitriteError, NitriteResult};
use nitrite::filter::{Filter, FilterProvider};

use super::cursor::{leaf_matches, Constraint, ConstraintOp, GeometryCallback};
use super::geometry;

/// The index type name a collection index must declare to be usable with
/// `RTreeFilter` and `RTreeIndexer`.
pub const RTREE_INDEX: &str = "RTree";
pub const RTREE_INT_INDEX: &str = "RTreeInt";

/// A query against an R-tree index: the ordered coordinate field names
/// (`x0_min, x0_max, x1_min, x1_max, ...`) the index covers, and the
/// compiled constraints evaluated against them.
pub struct RTreeFilter {
    inner: Arc<RTreeFilterInner>,
}

struct RTreeFilterInner {
    anchor_field: OnceLock<String>,
    fields: Vec<String>,
    constraints: Vec<Constraint>,
    index_type: &'static str,
}

impl Clone for RTreeFilter {
    fn clone(&self) -> Self {
        RTreeFilter { inner: self.inner.clone() }
    }
}

impl RTreeFilter {
    fn new(fields: Vec<String>, constraints: Vec<Constraint>) -> Self {
        let anchor_field = OnceLock::new();
        if let Some(first) = fields.first() {
            let _ = anchor_field.set(first.clone());
        }
        RTreeFilter { inner: Arc::new(RTreeFilterInner { anchor_field, fields, constraints, index_type: RTREE_INDEX }) }
    }

    /// Retargets this filter at an `RTreeInt` (int32-coordinate) index
    /// instead of the default `RTree` (float-coordinate) index.
    pub fn for_int_index(self) -> Self {
        let inner = &*self.inner;
        let anchor_field = OnceLock::new();
        if let Some(v) = inner.anchor_field.get() {
            let _ = anchor_field.set(v.clone());
        }
        RTreeFilter {
            inner: Arc::new(RTreeFilterInner {
                anchor_field,
                fields: inner.fields.clone(),
                constraints: clone_constraints(&inner.constraints),
                index_type: RTREE_INT_INDEX,
            }),
        }
    }

    /// Rows whose rectangle overlaps `query` on every axis:
    /// `stored_min <= query_max AND stored_max >= query_min`.
    pub fn intersects(fields: Vec<String>, query: Vec<f64>) -> Self {
        let dims = fields.len() / 2;
        let mut constraints = Vec::with_capacity(2 * dims);
        for axis in 0..dims {
            constraints.push(Constraint::relational(2 * axis, ConstraintOp::Le, query[2 * axis + 1]));
            constraints.push(Constraint::relational(2 * axis + 1, ConstraintOp::Ge, query[2 * axis]));
        }
        RTreeFilter::new(fields, constraints)
    }

    /// Rows whose rectangle lies entirely within `query` on every axis:
    /// `stored_min >= query_min AND stored_max <= query_max`.
    pub fn within(fields: Vec<String>, query: Vec<f64>) -> Self {
        let dims = fields.len() / 2;
        let mut constraints = Vec::with_capacity(2 * dims);
        for axis in 0..dims {
            constraints.push(Constraint::relational(2 * axis, ConstraintOp::Ge, query[2 * axis]));
            constraints.push(Constraint::relational(2 * axis + 1, ConstraintOp::Le, query[2 * axis + 1]));
        }
        RTreeFilter::new(fields, constraints)
    }

    /// One relational constraint per argument, for callers that want the
    /// planner-level per-axis comparisons directly (§4.5/§4.9's `{EQ, LE,
    /// LT, GE, GT}` on a single coordinate column).
    pub fn relational(fields: Vec<String>, constraints: Vec<Constraint>) -> Self {
        RTreeFilter::new(fields, constraints)
    }

    /// A MATCH constraint (§4.10): every candidate rectangle is passed to
    /// `geometry` with `ctx` for a final accept/reject decision, both at
    /// internal-cell pruning and leaf-match time.
    pub fn match_geometry(fields: Vec<String>, geometry: Arc<dyn GeometryCallback>, ctx: Vec<u8>) -> Self {
        RTreeFilter::new(fields, vec![Constraint::match_geometry(0, geometry, ctx)])
    }

    pub(crate) fn fields(&self) -> &[String] {
        &self.inner.fields
    }

    pub(crate) fn constraints(&self) -> &[Constraint] {
        &self.inner.constraints
    }

    pub(crate) fn index_type(&self) -> &'static str {
        self.inner.index_type
    }

    fn coords_from(&self, entry: &Document) -> Option<Vec<f64>> {
        let mut coords = Vec::with_capacity(self.inner.fields.len());
        for field in &self.inner.fields {
            let value = entry.get(field).ok()?;
            coords.push(value.as_f64().copied().or_else(|| value.as_i64().map(|v| *v as f64))?);
        }
        Some(coords)
    }
}

impl FilterProvider for RTreeFilter {
    fn apply(&self, entry: &Document) -> NitriteResult<bool> {
        match self.coords_from(entry) {
            Some(coords) => Ok(leaf_matches(&self.inner.constraints, &coords)),
            None => Ok(false),
        }
    }

    fn has_field(&self) -> bool {
        true
    }

    fn get_field_name(&self) -> NitriteResult<String> {
        self.inner
            .anchor_field
            .get()
            .cloned()
            .ok_or_else(|| NitriteError::new("Field name not set", ErrorKind::InvalidOperation))
    }

    fn set_field_name(&self, field_name: String) -> NitriteResult<()> {
        self.inner.anchor_field.get_or_init(|| field_name);
        Ok(())
    }

    fn is_index_only_filter(&self) -> bool {
        // Stored rectangles are exact, not a bounding-box approximation of a
        // richer geometry, so the R-tree scan result needs no refinement pass.
        true
    }

    fn supported_index_type(&self) -> NitriteResult<String> {
        Ok(self.inner.index_type.to_string())
    }

    fn can_be_grouped(&self, other: Filter) -> NitriteResult<bool> {
        match other.as_any().downcast_ref::<RTreeFilter>() {
            Some(o) => Ok(self.inner.fields == o.inner.fields && self.inner.index_type == o.inner.index_type),
            None => Ok(false),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Display for RTreeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(rtree scan over {:?}, {} constraint(s))", self.inner.fields, self.inner.constraints.len())
    }
}

/// `true` if `filter` is an `RTreeFilter`, for dispatch in `find_by_filter`.
pub fn is_rtree_filter(filter: &Filter) -> bool {
    filter.as_any().is::<RTreeFilter>()
}

pub fn as_rtree_filter(filter: &Filter) -> Option<&RTreeFilter> {
    filter.as_any().downcast_ref::<RTreeFilter>()
}

/// Reports whether `r2` overlaps `r1` (used by callers assembling
/// `match_geometry` callbacks that just want a rectangle test).
pub fn overlaps_rect(r1: &[f64], r2: &[f64], dims: usize) -> bool {
    geometry::intersects(r1, r2, dims)
}

fn clone_constraints(constraints: &[Constraint]) -> Vec<Constraint> {
    constraints
        .iter()
        .map(|c| match &c.geometry {
            Some(geom) => Constraint::match_geometry(c.column, geom.clone(), c.geometry_ctx.clone()),
            None => Constraint::relational(c.column, c.op, c.value),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nitrite::collection::Document;

    fn coord_fields() -> Vec<String> {
        vec!["x0_min".into(), "x0_max".into(), "x1_min".into(), "x1_max".into()]
    }

    fn doc(x0: f64, x1: f64, y0: f64, y1: f64) -> Document {
        let mut d = Document::new();
        d.put("x0_min", x0).unwrap();
        d.put("x0_max", x1).unwrap();
        d.put("x1_min", y0).unwrap();
        d.put("x1_max", y1).unwrap();
        d
    }

    #[test]
    fn intersects_matches_overlapping_rectangle() {
        let filter = RTreeFilter::intersects(coord_fields(), vec![4.0, 12.0, 4.0, 12.0]);
        assert!(filter.apply(&doc(5.0, 6.0, 5.0, 6.0)).unwrap());
        assert!(!filter.apply(&doc(20.0, 21.0, 20.0, 21.0)).unwrap());
    }

    #[test]
    fn within_requires_full_containment() {
        let filter = RTreeFilter::within(coord_fields(), vec![0.0, 10.0, 0.0, 10.0]);
        assert!(filter.apply(&doc(1.0, 2.0, 1.0, 2.0)).unwrap());
        assert!(!filter.apply(&doc(1.0, 11.0, 1.0, 2.0)).unwrap());
    }

    #[test]
    fn can_be_grouped_with_matching_field_set() {
        let a = RTreeFilter::intersects(coord_fields(), vec![0.0, 1.0, 0.0, 1.0]);
        let b = RTreeFilter::within(coord_fields(), vec![0.0, 1.0, 0.0, 1.0]);
        assert!(a.can_be_grouped(Filter::new(b)).unwrap());
    }

    #[test]
    fn for_int_index_changes_supported_index_type() {
        let float_filter = RTreeFilter::intersects(coord_fields(), vec![0.0, 1.0, 0.0, 1.0]);
        assert_eq!(float_filter.supported_index_type().unwrap(), RTREE_INDEX);

        let int_filter = float_filter.for_int_index();
        assert_eq!(int_filter.supported_index_type().unwrap(), RTREE_INT_INDEX);
        assert!(int_filter.apply(&doc(5.0, 6.0, 5.0, 6.0)).is_ok());
    }
}
