//! Bounding-volume hierarchy over the surviving cutting triangles.
//!
//! Built once after clipping, then queried many times by the flood fill
//! (segment casts) and the assembler (point-to-leaf lookup). The six root
//! clipping triangles are deliberately *not* part of the hierarchy: they
//! span the whole world, so any node containing them would never shrink and
//! the tree would prune nothing. The world casts against them linearly.

use glam::DVec3;
use smallvec::SmallVec;

use crate::constants::BVH_LEAF_THRESHOLD;
use crate::geom::{ray_double_sided_triangle_intersection, Aabb, Triangle};

/// Where a BVH entry's triangle came from: delimiter, face slot and
/// triangle slot at build time. Entries copy the triangle value, so the
/// source is informational, plus the deterministic build tiebreak.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct TriangleRef {
  pub delimiter: u32,
  pub plane: u8,
  pub triangle: u32,
}

/// One triangle in the hierarchy, with its centroid precomputed for
/// partitioning.
#[derive(Clone, Copy, Debug)]
pub struct BvhEntry {
  pub triangle: Triangle,
  pub center: DVec3,
  pub source: TriangleRef,
}

impl BvhEntry {
  pub fn new(triangle: Triangle, source: TriangleRef) -> Self {
    Self {
      triangle,
      center: triangle.center(),
      source,
    }
  }
}

/// A node covering the entry range `[first_entry, first_entry + entry_count)`.
#[derive(Clone, Copy, Debug)]
pub struct BvhNode {
  pub aabb: Aabb,
  pub first_entry: usize,
  pub entry_count: usize,
  /// Indices of the two children into the node array; meaningless on
  /// leaves.
  pub children: [usize; 2],
  pub leaf: bool,
}

/// Aggregate shape statistics, mostly for logging after a build.
#[derive(Clone, Copy, Debug, Default)]
pub struct BvhStats {
  pub min_leaf_depth: usize,
  pub max_leaf_depth: usize,
  pub min_entries_in_leaf: usize,
  pub max_entries_in_leaf: usize,
  pub total_node_count: usize,
  pub total_entry_count: usize,
}

#[derive(Clone, Debug, Default)]
pub struct Bvh {
  /// Flat node array; index 0 is the root when any entries exist.
  pub nodes: Vec<BvhNode>,
  pub entries: Vec<BvhEntry>,
}

impl Bvh {
  /// Top-down median-split build. Entries are reordered in place so that
  /// every node owns a contiguous range; the split axis is the node's
  /// longest and the ordering key includes the source id, keeping the
  /// whole build deterministic.
  pub fn build(entries: Vec<BvhEntry>) -> Self {
    let mut bvh = Self {
      nodes: Vec::new(),
      entries,
    };

    if bvh.entries.is_empty() {
      return bvh;
    }

    let count = bvh.entries.len();
    bvh.nodes.push(BvhNode {
      aabb: Aabb::empty(),
      first_entry: 0,
      entry_count: count,
      children: [0, 0],
      leaf: true,
    });
    bvh.subdivide(0);
    bvh
  }

  fn subdivide(&mut self, node_index: usize) {
    let (first, count) = {
      let node = &self.nodes[node_index];
      (node.first_entry, node.entry_count)
    };

    let mut aabb = Aabb::empty();
    for entry in &self.entries[first..first + count] {
      aabb.encapsulate_triangle(&entry.triangle);
    }
    self.nodes[node_index].aabb = aabb;

    if count <= BVH_LEAF_THRESHOLD {
      return;
    }

    let axis = aabb.longest_axis();
    let range = &mut self.entries[first..first + count];
    range.sort_unstable_by(|lhs, rhs| {
      lhs.center[axis]
        .total_cmp(&rhs.center[axis])
        .then_with(|| lhs.source.cmp(&rhs.source))
    });

    let half = count / 2;
    let left = self.nodes.len();
    self.nodes.push(BvhNode {
      aabb: Aabb::empty(),
      first_entry: first,
      entry_count: half,
      children: [0, 0],
      leaf: true,
    });
    let right = self.nodes.len();
    self.nodes.push(BvhNode {
      aabb: Aabb::empty(),
      first_entry: first + half,
      entry_count: count - half,
      children: [0, 0],
      leaf: true,
    });

    {
      let node = &mut self.nodes[node_index];
      node.leaf = false;
      node.children = [left, right];
    }

    self.subdivide(left);
    self.subdivide(right);
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// All leaves whose box contains `position`. Nearby same-sized nodes
  /// overlap, so a point can sit in several.
  pub fn find_leafs_at_position(&self, position: DVec3) -> SmallVec<[usize; 8]> {
    let mut leafs = SmallVec::new();
    if self.nodes.is_empty() {
      return leafs;
    }

    let mut stack: SmallVec<[usize; 32]> = SmallVec::new();
    stack.push(0);
    while let Some(index) = stack.pop() {
      let node = &self.nodes[index];
      if !node.aabb.contains_point(position) {
        continue;
      }
      if node.leaf {
        leafs.push(index);
      } else {
        stack.push(node.children[0]);
        stack.push(node.children[1]);
      }
    }

    leafs
  }

  /// True when the segment `origin → origin + direction * max_t` hits any
  /// entry triangle. `direction` is unnormalised; `max_t` is in units of
  /// its length.
  pub fn cast_ray(&self, origin: DVec3, direction: DVec3, max_t: f64) -> bool {
    self.cast_ray_in_range(origin, direction, 0.0, max_t)
  }

  /// Ray cast accepting only hits with `t` in `[min_t, max_t]`. A positive
  /// `min_t` lets a ray step off the surface it starts on.
  pub fn cast_ray_in_range(
    &self,
    origin: DVec3,
    direction: DVec3,
    min_t: f64,
    max_t: f64,
  ) -> bool {
    if self.nodes.is_empty() {
      return false;
    }

    let mut stack: SmallVec<[usize; 32]> = SmallVec::new();
    stack.push(0);
    while let Some(index) = stack.pop() {
      let node = &self.nodes[index];
      if !node.aabb.intersects_ray(origin, direction, max_t) {
        continue;
      }

      if !node.leaf {
        stack.push(node.children[0]);
        stack.push(node.children[1]);
        continue;
      }

      for entry in &self.entries[node.first_entry..node.first_entry + node.entry_count] {
        let triangle = &entry.triangle;
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
    }

    false
  }

  pub fn stats(&self) -> BvhStats {
    let mut stats = BvhStats {
      min_leaf_depth: usize::MAX,
      min_entries_in_leaf: usize::MAX,
      total_entry_count: self.entries.len(),
      ..Default::default()
    };

    if self.nodes.is_empty() {
      stats.min_leaf_depth = 0;
      stats.min_entries_in_leaf = 0;
      return stats;
    }

    let mut stack: Vec<(usize, usize)> = vec![(0, 0)];
    while let Some((index, depth)) = stack.pop() {
      stats.total_node_count += 1;
      let node = &self.nodes[index];
      if node.leaf {
        stats.min_leaf_depth = stats.min_leaf_depth.min(depth);
        stats.max_leaf_depth = stats.max_leaf_depth.max(depth);
        stats.min_entries_in_leaf = stats.min_entries_in_leaf.min(node.entry_count);
        stats.max_entries_in_leaf = stats.max_entries_in_leaf.max(node.entry_count);
      } else {
        stack.push((node.children[0], depth + 1));
        stack.push((node.children[1], depth + 1));
      }
    }

    stats
  }
}

#[cfg(test)]
#[path = "bvh_test.rs"]
mod bvh_test;
