//! World container and the fixed build pipeline.
//!
//! A world owns everything belonging to one problem instance: the anchors,
//! the delimiters, the six inward-facing root clipping triangles, the BVH
//! and the flood-fill scratch state. Objects are registered once up front;
//! ids stay valid for the life of the world.
//!
//! The pipeline is `new → add_* → clip_delimiters → create_bvh →
//! calculate_volumes`, tracked by [`WorldStage`]. Mixing the order up is a
//! caller bug and surfaces as a typed error rather than corrupt output.

use glam::{DQuat, DVec3, EulerRot};

use crate::bvh::{Bvh, BvhEntry, TriangleRef};
use crate::constants::CORE_EPSILON;
use crate::flood_fill::FloodFill;
use crate::geom::{ray_double_sided_triangle_intersection, Triangle};
use crate::objects::{Anchor, AnchorId, AxisIndex, Delimiter, DelimiterId, VirtualExtension};
use crate::plane::TriangulatedPlane;

/// Build-pipeline progress of a world.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum WorldStage {
  Empty,
  Populated,
  Clipped,
  BvhReady,
  Solved,
}

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
  #[error("anchor position {0} lies outside the world bounds")]
  AnchorOutOfBounds(DVec3),
  #[error("delimiter bounds reach outside the world")]
  DelimiterOutOfBounds(DelimiterId),
  #[error("delimiter has no room for {requested} more plane(s); {existing} of 6 slots used")]
  PlaneCountExceeded { existing: usize, requested: usize },
  #[error("objects cannot be added after clip_delimiters ran")]
  WorldAlreadyClipped,
  #[error("{operation} requires stage {required:?}, but the world is at {actual:?}")]
  StageMismatch {
    operation: &'static str,
    required: WorldStage,
    actual: WorldStage,
  },
  #[error("cell size must be positive, got {0}")]
  InvalidCellSize(f64),
}

pub struct World {
  pub half_size: DVec3,

  /// Append-only registries; an id is an index and stays stable.
  pub anchors: Vec<Anchor>,
  pub delimiters: Vec<Delimiter>,

  /// The six faces of the world box as twelve inward-facing triangles.
  /// Kept out of the BVH and cast against linearly: they cover the whole
  /// volume and would neutralise any pruning.
  pub root_clipping_triangles: Vec<Triangle>,

  pub bvh: Bvh,

  /// Scratch state of the most recent flood fill; reused across anchors
  /// and kept for debug drawing.
  pub flood_fill: Option<FloodFill>,

  stage: WorldStage,

  #[cfg(feature = "metrics")]
  pub metrics: crate::metrics::WorldMetrics,
}

impl World {
  /// Create a world spanning `[-half_size, half_size]` and install its root
  /// clipping triangles.
  pub fn new(half_size: DVec3) -> Self {
    let h = half_size;
    let mut root = Vec::with_capacity(12);

    // X axis.
    root.push(Triangle::with_normal(
      DVec3::new(-h.x, h.y, h.z),
      DVec3::new(-h.x, -h.y, h.z),
      DVec3::new(-h.x, -h.y, -h.z),
      DVec3::X,
    ));
    root.push(Triangle::with_normal(
      DVec3::new(-h.x, h.y, -h.z),
      DVec3::new(-h.x, h.y, h.z),
      DVec3::new(-h.x, -h.y, -h.z),
      DVec3::X,
    ));
    root.push(Triangle::with_normal(
      DVec3::new(h.x, -h.y, h.z),
      DVec3::new(h.x, h.y, h.z),
      DVec3::new(h.x, -h.y, -h.z),
      DVec3::NEG_X,
    ));
    root.push(Triangle::with_normal(
      DVec3::new(h.x, h.y, h.z),
      DVec3::new(h.x, h.y, -h.z),
      DVec3::new(h.x, -h.y, -h.z),
      DVec3::NEG_X,
    ));

    // Y axis.
    root.push(Triangle::with_normal(
      DVec3::new(-h.x, -h.y, -h.z),
      DVec3::new(-h.x, -h.y, h.z),
      DVec3::new(h.x, -h.y, h.z),
      DVec3::Y,
    ));
    root.push(Triangle::with_normal(
      DVec3::new(h.x, -h.y, h.z),
      DVec3::new(h.x, -h.y, -h.z),
      DVec3::new(-h.x, -h.y, -h.z),
      DVec3::Y,
    ));
    root.push(Triangle::with_normal(
      DVec3::new(h.x, h.y, h.z),
      DVec3::new(-h.x, h.y, h.z),
      DVec3::new(-h.x, h.y, -h.z),
      DVec3::NEG_Y,
    ));
    root.push(Triangle::with_normal(
      DVec3::new(h.x, h.y, -h.z),
      DVec3::new(h.x, h.y, h.z),
      DVec3::new(-h.x, h.y, -h.z),
      DVec3::NEG_Y,
    ));

    // Z axis.
    root.push(Triangle::with_normal(
      DVec3::new(h.x, h.y, -h.z),
      DVec3::new(-h.x, h.y, -h.z),
      DVec3::new(-h.x, -h.y, -h.z),
      DVec3::Z,
    ));
    root.push(Triangle::with_normal(
      DVec3::new(h.x, -h.y, -h.z),
      DVec3::new(h.x, h.y, -h.z),
      DVec3::new(-h.x, -h.y, -h.z),
      DVec3::Z,
    ));
    root.push(Triangle::with_normal(
      DVec3::new(-h.x, h.y, h.z),
      DVec3::new(h.x, h.y, h.z),
      DVec3::new(-h.x, -h.y, h.z),
      DVec3::NEG_Z,
    ));
    root.push(Triangle::with_normal(
      DVec3::new(h.x, h.y, h.z),
      DVec3::new(h.x, -h.y, h.z),
      DVec3::new(-h.x, -h.y, h.z),
      DVec3::NEG_Z,
    ));

    Self {
      half_size,
      anchors: Vec::new(),
      delimiters: Vec::new(),
      root_clipping_triangles: root,
      bvh: Bvh::default(),
      flood_fill: None,
      stage: WorldStage::Empty,
      #[cfg(feature = "metrics")]
      metrics: crate::metrics::WorldMetrics::default(),
    }
  }

  pub fn stage(&self) -> WorldStage {
    self.stage
  }

  /// Pre-size both registries.
  pub fn reserve_objects(&mut self, anchors: usize, delimiters: usize) {
    self.anchors.reserve(anchors);
    self.delimiters.reserve(delimiters);
  }

  pub fn point_inside_bounds(&self, point: DVec3) -> bool {
    point.x >= -self.half_size.x
      && point.x <= self.half_size.x
      && point.y >= -self.half_size.y
      && point.y <= self.half_size.y
      && point.z >= -self.half_size.z
      && point.z <= self.half_size.z
  }

  pub fn add_anchor(&mut self, position: DVec3) -> Result<AnchorId, WorldError> {
    if self.stage >= WorldStage::Clipped {
      return Err(WorldError::WorldAlreadyClipped);
    }
    if !self.point_inside_bounds(position) {
      return Err(WorldError::AnchorOutOfBounds(position));
    }

    let id = AnchorId(self.anchors.len() as u32);
    self.anchors.push(Anchor {
      id,
      position,
      volume: Vec::new(),
      label: None,
    });
    self.stage = self.stage.max(WorldStage::Populated);
    Ok(id)
  }

  pub fn add_labeled_anchor(
    &mut self,
    label: impl Into<String>,
    position: DVec3,
  ) -> Result<AnchorId, WorldError> {
    let id = self.add_anchor(position)?;
    self.anchors[id.index()].label = Some(label.into());
    Ok(id)
  }

  /// Register a delimiter box. `euler_turns` is the rotation around each
  /// axis in turns (1 turn = 2π).
  pub fn add_delimiter(
    &mut self,
    position: DVec3,
    half_size: DVec3,
    euler_turns: DVec3,
    level: u8,
  ) -> Result<DelimiterId, WorldError> {
    let rotation = DQuat::from_euler(
      EulerRot::XYZ,
      euler_turns.x * std::f64::consts::TAU,
      euler_turns.y * std::f64::consts::TAU,
      euler_turns.z * std::f64::consts::TAU,
    );
    self.add_delimiter_with_rotation(position, half_size, rotation, level)
  }

  pub fn add_delimiter_with_rotation(
    &mut self,
    position: DVec3,
    half_size: DVec3,
    rotation: DQuat,
    level: u8,
  ) -> Result<DelimiterId, WorldError> {
    if self.stage >= WorldStage::Clipped {
      return Err(WorldError::WorldAlreadyClipped);
    }

    let id = DelimiterId(self.delimiters.len() as u32);
    let delimiter = Delimiter::new(id, position, half_size, rotation, level);

    let aabb = delimiter.aabb();
    if !self.point_inside_bounds(aabb.min) || !self.point_inside_bounds(aabb.max) {
      return Err(WorldError::DelimiterOutOfBounds(id));
    }

    self.delimiters.push(delimiter);
    self.stage = self.stage.max(WorldStage::Populated);
    Ok(id)
  }

  pub fn add_labeled_delimiter(
    &mut self,
    label: impl Into<String>,
    position: DVec3,
    half_size: DVec3,
    euler_turns: DVec3,
    level: u8,
  ) -> Result<DelimiterId, WorldError> {
    let id = self.add_delimiter(position, half_size, euler_turns, level)?;
    self.delimiters[id.index()].label = Some(label.into());
    Ok(id)
  }

  /// Attach cutting faces to a delimiter on one of its local axes.
  ///
  /// Non-centered: a pair of faces at `position ± scaled_axis`, normals
  /// pointing away from the box on either side. Centered: a single face
  /// through the box centre. Each in-plane direction either uses the box
  /// extent or, when its [`VirtualExtension`] bit is set, the world
  /// diameter; the overshoot is trimmed during clipping.
  pub fn add_delimiter_plane(
    &mut self,
    delimiter: DelimiterId,
    axis: AxisIndex,
    centered: bool,
    virtual_extension: VirtualExtension,
  ) -> Result<(), WorldError> {
    if self.stage >= WorldStage::Clipped {
      return Err(WorldError::WorldAlreadyClipped);
    }

    let world_diameter = self.half_size.x.max(self.half_size.y).max(self.half_size.z) * 2.0;
    let delimiter = &mut self.delimiters[delimiter.index()];

    let requested = if centered { 1 } else { 2 };
    if delimiter.planes.len() + requested > 6 {
      return Err(WorldError::PlaneCountExceeded {
        existing: delimiter.planes.len(),
        requested,
      });
    }

    let axis = axis as usize;
    let u_axis = (axis + 1) % 3;
    let v_axis = (axis + 2) % 3;

    let a = delimiter.local_scaled_axes[axis];
    let n = delimiter.local_unit_axes[axis];
    let u = delimiter.local_unit_axes[u_axis];
    let v = delimiter.local_unit_axes[v_axis];

    let extent = |bit: VirtualExtension, own: f64| -> f64 {
      if virtual_extension.contains(bit) {
        world_diameter
      } else {
        own
      }
    };
    let u_extent = delimiter.local_scaled_axes[u_axis].length();
    let v_extent = delimiter.local_scaled_axes[v_axis].length();
    let left = -u * extent(VirtualExtension::NEG_U, u_extent);
    let right = u * extent(VirtualExtension::POS_U, u_extent);
    let top = -v * extent(VirtualExtension::NEG_V, v_extent);
    let bottom = v * extent(VirtualExtension::POS_V, v_extent);

    if centered {
      delimiter.planes.push(TriangulatedPlane::new(
        delimiter.position,
        n,
        left,
        right,
        top,
        bottom,
      ));
    } else {
      // The box occupies actual volume, so the cutting faces align with
      // its sides rather than its centre: one on each side of the axis.
      delimiter.planes.push(TriangulatedPlane::new(
        delimiter.position + a,
        n,
        left,
        right,
        top,
        bottom,
      ));
      delimiter.planes.push(TriangulatedPlane::new(
        delimiter.position - a,
        -n,
        left,
        right,
        top,
        bottom,
      ));
    }

    Ok(())
  }

  /// Resolve all delimiter-vs-delimiter conflicts and trim every face to
  /// the world bounds. Safe to re-run; without new mutations the face
  /// triangles come out unchanged.
  pub fn clip_delimiters(&mut self) -> Result<(), WorldError> {
    if self.stage > WorldStage::Clipped {
      return Err(WorldError::StageMismatch {
        operation: "clip_delimiters",
        required: WorldStage::Populated,
        actual: self.stage,
      });
    }

    let resolved = crate::clip::clip_delimiters(&mut self.delimiters, &self.root_clipping_triangles);

    let surviving: usize = self.delimiters.iter().map(Delimiter::triangle_count).sum();
    tracing::debug!(resolved, surviving, "clipped delimiters");

    #[cfg(feature = "metrics")]
    {
      self.metrics.intersections_resolved = resolved as u64;
      self.metrics.surviving_triangles = surviving as u64;
    }

    self.stage = WorldStage::Clipped;
    Ok(())
  }

  /// Build the BVH over all surviving delimiter triangles. Must be re-run
  /// after any further delimiter mutation.
  pub fn create_bvh(&mut self) -> Result<(), WorldError> {
    if self.stage < WorldStage::Clipped {
      return Err(WorldError::StageMismatch {
        operation: "create_bvh",
        required: WorldStage::Clipped,
        actual: self.stage,
      });
    }

    let mut entries = Vec::new();
    for (delimiter_index, delimiter) in self.delimiters.iter().enumerate() {
      for (plane_index, plane) in delimiter.planes.iter().enumerate() {
        for (triangle_index, triangle) in plane.triangles.iter().enumerate() {
          entries.push(BvhEntry::new(
            *triangle,
            TriangleRef {
              delimiter: delimiter_index as u32,
              plane: plane_index as u8,
              triangle: triangle_index as u32,
            },
          ));
        }
      }
    }

    self.bvh = Bvh::build(entries);

    let stats = self.bvh.stats();
    tracing::debug!(
      nodes = stats.total_node_count,
      entries = stats.total_entry_count,
      max_leaf_depth = stats.max_leaf_depth,
      "built bvh"
    );

    #[cfg(feature = "metrics")]
    {
      self.metrics.bvh_nodes = stats.total_node_count as u64;
    }

    self.stage = WorldStage::BvhReady;
    Ok(())
  }

  /// Solve every anchor: flood fill, assemble the bordering cut surfaces,
  /// close the occupancy boundary with marching cubes.
  pub fn calculate_volumes(&mut self, cell_size: f64) -> Result<(), WorldError> {
    if self.stage < WorldStage::BvhReady {
      return Err(WorldError::StageMismatch {
        operation: "calculate_volumes",
        required: WorldStage::BvhReady,
        actual: self.stage,
      });
    }
    if !(cell_size > 0.0) {
      return Err(WorldError::InvalidCellSize(cell_size));
    }

    let mut ff = match self.flood_fill.take() {
      Some(existing) if existing.cell_size == cell_size => existing,
      _ => FloodFill::new(self.half_size, cell_size),
    };

    for anchor_index in 0..self.anchors.len() {
      let position = self.anchors[anchor_index].position;
      let mut volume = std::mem::take(&mut self.anchors[anchor_index].volume);
      volume.clear();

      ff.run(position, |src, dst| {
        !self.cast_ray_against_delimiters_and_root_planes(src, dst - src, 1.0)
      });

      crate::assembler::assemble(&mut volume, &ff, &self.bvh, |origin, direction| {
        self.cast_ray_filtered(origin, direction, 1.0, CORE_EPSILON)
      });
      crate::march::marching_cubes(&mut volume, &ff);

      tracing::debug!(
        anchor = anchor_index,
        flooded = ff.flooded_cells.len(),
        triangles = volume.len(),
        "calculated anchor volume"
      );

      #[cfg(feature = "metrics")]
      {
        self.metrics.flooded_cells += ff.flooded_cells.len() as u64;
        self.metrics.volume_triangles += volume.len() as u64;
      }

      self.anchors[anchor_index].volume = volume;
    }

    self.flood_fill = Some(ff);
    self.stage = WorldStage::Solved;
    Ok(())
  }

  /// True when the segment `origin → origin + direction * max_t` hits any
  /// delimiter triangle or root clipping triangle.
  pub fn cast_ray_against_delimiters_and_root_planes(
    &self,
    origin: DVec3,
    direction: DVec3,
    max_t: f64,
  ) -> bool {
    self.cast_ray_filtered(origin, direction, max_t, 0.0)
  }

  /// Same cast with a lower parameter bound; the assembler uses it to step
  /// over the surface its rays start on.
  fn cast_ray_filtered(&self, origin: DVec3, direction: DVec3, max_t: f64, min_t: f64) -> bool {
    // Root triangles never go into the BVH; scan them directly.
    for triangle in &self.root_clipping_triangles {
      if let Some(t) = ray_double_sided_triangle_intersection(
        origin,
        direction,
        triangle.p0,
        triangle.p1,
        triangle.p2,
      ) {
        if t >= min_t && t <= max_t {
          return true;
        }
      }
    }

    self.bvh.cast_ray_in_range(origin, direction, min_t, max_t)
  }
}

#[cfg(test)]
#[path = "world_test.rs"]
mod world_test;
