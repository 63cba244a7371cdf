//! Cross-world parallelism.
//!
//! A world is strictly single-threaded inside: every entry point runs to
//! completion and mutates world-owned state. Independent worlds share
//! nothing, so solving a batch of them is embarrassingly parallel.

use rayon::prelude::*;

use crate::world::{World, WorldError};

/// Run `calculate_volumes` for every world in parallel. Each world must
/// already be at `BvhReady`. Results come back in input order.
pub fn solve_worlds(worlds: &mut [World], cell_size: f64) -> Vec<Result<(), WorldError>> {
  worlds
    .par_iter_mut()
    .map(|world| world.calculate_volumes(cell_size))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::objects::{AxisIndex, VirtualExtension};
  use glam::DVec3;

  fn prepared_world() -> World {
    let mut world = World::new(DVec3::new(20.0, 5.0, 20.0));
    world.add_anchor(DVec3::new(0.0, 0.0, -10.0)).unwrap();
    let wall = world
      .add_delimiter(DVec3::ZERO, DVec3::new(5.0, 2.0, 0.5), DVec3::ZERO, 0)
      .unwrap();
    world
      .add_delimiter_plane(wall, AxisIndex::Z, false, VirtualExtension::empty())
      .unwrap();
    world.clip_delimiters().unwrap();
    world.create_bvh().unwrap();
    world
  }

  #[test]
  fn solves_a_batch_and_matches_the_serial_result() {
    let mut serial = prepared_world();
    serial.calculate_volumes(5.0).unwrap();

    let mut batch = vec![prepared_world(), prepared_world(), prepared_world()];
    let results = solve_worlds(&mut batch, 5.0);
    assert!(results.iter().all(Result::is_ok));

    for world in &batch {
      assert_eq!(world.anchors[0].volume.len(), serial.anchors[0].volume.len());
    }
  }

  #[test]
  fn stage_errors_surface_per_world() {
    let mut unprepared = World::new(DVec3::splat(10.0));
    unprepared.add_anchor(DVec3::ZERO).unwrap();

    let mut batch = vec![unprepared];
    let results = solve_worlds(&mut batch, 5.0);
    assert!(matches!(results[0], Err(WorldError::StageMismatch { .. })));
  }
}
