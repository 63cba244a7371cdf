//! The objects a world is populated with: anchors and delimiters.

use glam::{DQuat, DVec3};
use smallvec::SmallVec;

use crate::geom::{Aabb, Triangle};
use crate::plane::TriangulatedPlane;

/// One of the three local axes of a delimiter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisIndex {
  X = 0,
  Y = 1,
  Z = 2,
}

impl AxisIndex {
  /// The next axis in cyclic order; used to derive the in-plane (u, v)
  /// axes from a face normal axis.
  pub fn next(self) -> AxisIndex {
    match self {
      AxisIndex::X => AxisIndex::Y,
      AxisIndex::Y => AxisIndex::Z,
      AxisIndex::Z => AxisIndex::X,
    }
  }
}

bitflags::bitflags! {
  /// Per-face mask selecting which of the four in-plane directions get
  /// extended to world scale when the face is built. An extended direction
  /// replaces the box extent by the world diameter; the clipping stage
  /// then trims the overshoot.
  #[derive(Clone, Copy, PartialEq, Eq, Debug)]
  pub struct VirtualExtension: u8 {
    const NEG_U = 0x1;
    const POS_U = 0x2;
    const NEG_V = 0x4;
    const POS_V = 0x8;
    const ALL = 0xF;
  }
}

/// Stable handle to an anchor inside its world.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct AnchorId(pub(crate) u32);

impl AnchorId {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// Stable handle to a delimiter inside its world.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DelimiterId(pub(crate) u32);

impl DelimiterId {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// A seed point whose owned volume is computed. The volume starts empty and
/// is filled by `World::calculate_volumes`.
#[derive(Clone, Debug)]
pub struct Anchor {
  pub id: AnchorId,
  pub position: DVec3,
  /// Output triangle soup enclosing the region this anchor owns.
  pub volume: Vec<Triangle>,
  pub label: Option<String>,
}

/// A rotated box contributing up to six cutting faces.
#[derive(Clone, Debug)]
pub struct Delimiter {
  pub id: DelimiterId,
  /// Precedence: a face is trimmed by faces of delimiters with a greater
  /// or equal level.
  pub level: u8,
  pub position: DVec3,
  /// Rotated half-extent vectors along the box's local axes.
  pub local_scaled_axes: [DVec3; 3],
  /// Rotated unit vectors along the box's local axes.
  pub local_unit_axes: [DVec3; 3],
  /// The cutting faces. At most six (two per axis).
  pub planes: SmallVec<[TriangulatedPlane; 6]>,
  pub label: Option<String>,

  // Kept for debug drawing.
  pub half_size: DVec3,
  pub rotation: DQuat,
}

impl Delimiter {
  pub(crate) fn new(
    id: DelimiterId,
    position: DVec3,
    half_size: DVec3,
    rotation: DQuat,
    level: u8,
  ) -> Self {
    Self {
      id,
      level,
      position,
      local_scaled_axes: [
        rotation * DVec3::new(half_size.x, 0.0, 0.0),
        rotation * DVec3::new(0.0, half_size.y, 0.0),
        rotation * DVec3::new(0.0, 0.0, half_size.z),
      ],
      local_unit_axes: [rotation * DVec3::X, rotation * DVec3::Y, rotation * DVec3::Z],
      planes: SmallVec::new(),
      label: None,
      half_size,
      rotation,
    }
  }

  /// World-space bounding box over the eight rotated corners.
  pub fn aabb(&self) -> Aabb {
    let mut aabb = Aabb::empty();
    for sx in [-1.0, 1.0] {
      for sy in [-1.0, 1.0] {
        for sz in [-1.0, 1.0] {
          aabb.encapsulate(
            self.position
              + self.local_scaled_axes[0] * sx
              + self.local_scaled_axes[1] * sy
              + self.local_scaled_axes[2] * sz,
          );
        }
      }
    }
    aabb
  }

  /// Total number of triangles across all faces.
  pub fn triangle_count(&self) -> usize {
    self.planes.iter().map(|p| p.triangles.len()).sum()
  }
}
