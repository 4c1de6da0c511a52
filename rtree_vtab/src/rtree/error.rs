//! Error taxonomy for the R-tree engine, matching the kinds the host expects
//! to see from any of its index modules.

use nitrite::errors::{ErrorKind, NitriteError};
use thiserror::Error;

/// Result alias used throughout the engine.
pub type RTreeResult<T> = Result<T, RTreeError>;

/// Errors produced by the R-tree engine.
///
/// The five variants mirror the error kinds a structural spatial index needs
/// to distinguish: a corrupted on-disk structure is not the same failure as
/// a bad query argument, and the host benefits from telling them apart.
#[derive(Debug, Error)]
pub enum RTreeError {
    /// A structural invariant was violated on load: an oversize cell count,
    /// an out-of-range tree height, a missing or mis-sized page blob, a
    /// dangling parent/child reference, or a parent-chain cycle.
    #[error("rtree corruption: {0}")]
    Corruption(String),

    /// An allocation failed while building a cache entry or split buffer.
    #[error("rtree out of memory")]
    OutOfMemory,

    /// `min > max` on some axis, or a duplicate rowid under a non-REPLACE
    /// conflict policy.
    #[error("rtree constraint violation: {0}")]
    Constraint(String),

    /// A MATCH argument blob had the wrong magic number or size.
    #[error("rtree argument error: {0}")]
    Argument(String),

    /// Propagated verbatim from the backing-store adapter.
    #[error("rtree store error: {0}")]
    Host(#[from] NitriteError),
}

impl RTreeError {
    pub fn corruption(msg: impl Into<String>) -> Self {
        RTreeError::Corruption(msg.into())
    }

    pub fn constraint(msg: impl Into<String>) -> Self {
        RTreeError::Constraint(msg.into())
    }

    pub fn argument(msg: impl Into<String>) -> Self {
        RTreeError::Argument(msg.into())
    }
}

impl From<RTreeError> for NitriteError {
    fn from(err: RTreeError) -> Self {
        match err {
            RTreeError::Corruption(msg) => {
                NitriteError::new(&format!("rtree corruption: {msg}"), ErrorKind::IndexCorrupted)
            }
            RTreeError::OutOfMemory => {
                NitriteError::new("rtree out of memory", ErrorKind::InternalError)
            }
            RTreeError::Constraint(msg) => NitriteError::new(&msg, ErrorKind::ValidationError),
            RTreeError::Argument(msg) => NitriteError::new(&msg, ErrorKind::FilterError),
            RTreeError::Host(e) => e,
        }
    }
}
