//! Numeric tolerances and tuning constants shared by the whole pipeline.
//!
//! The geometry here is in actual world units, where 1.0 is roughly one
//! meter. The tolerances are therefore much coarser than machine epsilon;
//! tightening them destabilises the clipping stage on realistic
//! architectural layouts, loosening them merges features that should stay
//! distinct.

/// General geometric tolerance. Distances, areas and barycentric
/// coordinates are compared against this.
pub const CORE_EPSILON: f64 = 0.00001;

/// Tighter tolerance for quantities that are known to be normalised
/// (ray parameters on unit-ish edges, 2D sign tests).
pub const CORE_SMALL_EPSILON: f64 = 0.0000001;

/// Maximum number of entries in a BVH leaf before it is split.
pub const BVH_LEAF_THRESHOLD: usize = 8;

/// Default flood-fill cell edge length in world units.
pub const DEFAULT_CELL_SIZE: f64 = 10.0;
