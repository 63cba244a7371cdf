//! Collects the cutting triangles that border a flooded region into the
//! anchor's output volume.
//!
//! For every flooded cell, the BVH leaves containing the cell centre are
//! looked up; an entry in such a leaf belongs to the volume boundary when
//! the segment from its centroid to the cell centre reaches the cell
//! unobstructed. Entries are added at most once, keyed by their BVH entry
//! index, in first-seen order.

use std::collections::HashSet;

use glam::DVec3;

use crate::bvh::Bvh;
use crate::flood_fill::FloodFill;
use crate::geom::Triangle;

/// Append the bordering cut-surface triangles to `volume`. `blocked` is the
/// world's occlusion cast: true when the segment `origin → origin +
/// direction` hits any delimiter or root triangle.
pub(crate) fn assemble(
  volume: &mut Vec<Triangle>,
  ff: &FloodFill,
  bvh: &Bvh,
  blocked: impl Fn(DVec3, DVec3) -> bool,
) {
  let mut added: HashSet<usize> = HashSet::new();

  for &cell_index in &ff.flooded_cells {
    let cell_center = ff.cell_world_space_center(ff.cells[cell_index].position);

    for leaf in bvh.find_leafs_at_position(cell_center) {
      let node = &bvh.nodes[leaf];
      for entry_index in node.first_entry..node.first_entry + node.entry_count {
        if added.contains(&entry_index) {
          continue;
        }

        let entry = &bvh.entries[entry_index];
        if !blocked(entry.center, cell_center - entry.center) {
          added.insert(entry_index);
          volume.push(entry.triangle);
        }
      }
    }
  }
}
