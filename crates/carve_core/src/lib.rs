//! carve_core - anchor-owned volume extraction inside a delimited world.
//!
//! Given a finite box (the world), a set of anchor points and a set of
//! delimiters (rotated boxes whose faces act as cutting planes), this crate
//! computes for each anchor a closed triangulated surface around the region
//! of space the anchor owns: the connected region around it that cannot be
//! left without crossing a cutting surface.
//!
//! # Pipeline
//!
//! ```text
//! World::new ── add_anchor / add_delimiter / add_delimiter_plane
//!     │
//!     ├── clip_delimiters()     resolve face crossings, trim to the world
//!     ├── create_bvh()          index the surviving cut triangles
//!     └── calculate_volumes()   per anchor: flood fill + assemble + march
//! ```
//!
//! # Example
//!
//! ```
//! use carve_core::{AxisIndex, VirtualExtension, World};
//! use glam::DVec3;
//!
//! let mut world = World::new(DVec3::new(50.0, 10.0, 50.0));
//! let anchor = world.add_anchor(DVec3::new(0.0, 0.0, -10.0)).unwrap();
//!
//! let block = world
//!   .add_delimiter(DVec3::ZERO, DVec3::new(5.0, 5.0, 5.0), DVec3::ZERO, 0)
//!   .unwrap();
//! world
//!   .add_delimiter_plane(block, AxisIndex::Z, false, VirtualExtension::ALL)
//!   .unwrap();
//!
//! world.clip_delimiters().unwrap();
//! world.create_bvh().unwrap();
//! world.calculate_volumes(5.0).unwrap();
//!
//! assert!(!world.anchors[anchor.index()].volume.is_empty());
//! ```

pub mod constants;
pub mod geom;
pub mod plane;

// Re-export commonly used items
pub use constants::{CORE_EPSILON, CORE_SMALL_EPSILON, DEFAULT_CELL_SIZE};
pub use geom::{Aabb, Triangle};
pub use plane::TriangulatedPlane;

// Triangle tessellation against a clip triangle or plane
pub mod tessel;
pub use tessel::tessellate;

// Anchors, delimiters and their handles
pub mod objects;
pub use objects::{Anchor, AnchorId, AxisIndex, Delimiter, DelimiterId, VirtualExtension};

// Delimiter-vs-delimiter clip resolution
mod clip;

// Bounding-volume hierarchy over the cut triangles
pub mod bvh;
pub use bvh::{Bvh, BvhEntry, BvhNode, BvhStats, TriangleRef};

// Voxel flood fill around an anchor
pub mod flood_fill;
pub use flood_fill::{Cell, CellState, FloodFill};

// Volume assembly from flooded cells
mod assembler;
mod march;

// Optional mesh post-pass
pub mod optimizer;
pub use optimizer::optimize_mesh;

// World orchestration
pub mod world;
pub use world::{World, WorldError, WorldStage};

// Debug draw data extraction
pub mod dbgdraw;
pub use dbgdraw::{debug_draw_world, DebugDrawData, DebugDrawOptions};

// Cross-world parallel solving
pub mod jobs;
pub use jobs::solve_worlds;

// Solve statistics (feature-gated)
#[cfg(feature = "metrics")]
pub mod metrics;
#[cfg(feature = "metrics")]
pub use metrics::WorldMetrics;
