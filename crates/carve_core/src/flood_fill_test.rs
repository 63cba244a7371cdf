use glam::DVec3;

use super::*;

#[test]
fn grid_dimensions_are_odd() {
  let ff = FloodFill::new(DVec3::new(50.0, 10.0, 50.0), 5.0);
  assert_eq!((ff.hx, ff.hy, ff.hz), (21, 5, 21));

  let ff = FloodFill::new(DVec3::new(50.0, 10.0, 50.0), 4.0);
  assert_eq!((ff.hx, ff.hy, ff.hz), (25, 5, 25));

  let ff = FloodFill::new(DVec3::new(1.0, 1.0, 1.0), 10.0);
  assert_eq!((ff.hx, ff.hy, ff.hz), (1, 1, 1));
}

#[test]
fn anchor_sits_at_its_cell_center() {
  let mut ff = FloodFill::new(DVec3::new(50.0, 10.0, 50.0), 5.0);
  let anchor = DVec3::new(-12.5, 1.0, 7.0);
  ff.run(anchor, |_, _| true);

  let center = ff.cell_world_space_center(ff.origin);
  assert!((center - anchor).length() < 1e-9, "{center} vs {anchor}");
}

#[test]
fn unobstructed_world_floods_every_cell() {
  let mut ff = FloodFill::new(DVec3::new(10.0, 10.0, 10.0), 5.0);
  ff.run(DVec3::ZERO, |_, _| true);

  assert_eq!(ff.flooded_cells.len(), (ff.hx * ff.hy * ff.hz) as usize);
  assert!(ff
    .cells
    .iter()
    .all(|cell| cell.state == CellState::Flooded));
}

#[test]
fn wall_splits_the_grid() {
  let mut ff = FloodFill::new(DVec3::new(10.0, 10.0, 10.0), 5.0);

  // Block every step crossing the plane z = 0.
  ff.run(DVec3::new(0.0, 0.0, -5.0), |src, dst| {
    (src.z < 0.0) == (dst.z < 0.0)
  });

  assert!(!ff.flooded_cells.is_empty());
  for &index in &ff.flooded_cells {
    let center = ff.cell_world_space_center(ff.cells[index].position);
    assert!(center.z < 0.0, "cell at {center} leaked across the wall");
  }

  // Exactly the z < 0 half: 5 x 5 x 2 cells.
  assert_eq!(ff.flooded_cells.len(), 50);
}

#[test]
fn flooded_region_is_connected_to_the_origin() {
  let mut ff = FloodFill::new(DVec3::new(10.0, 5.0, 10.0), 5.0);
  ff.run(DVec3::new(2.0, 0.0, 2.0), |src, dst| {
    // Arbitrary obstacle: no crossing of x = 0.
    (src.x < 0.0) == (dst.x < 0.0)
  });

  // Walk back from every flooded cell through flooded neighbours to the
  // origin cell: BFS order guarantees each cell has a flooded predecessor.
  let origin_index = ff.cell_index(ff.origin);
  for (order, &index) in ff.flooded_cells.iter().enumerate() {
    if index == origin_index {
      assert_eq!(order, 0, "origin must be flooded first");
      continue;
    }

    let position = ff.cells[index].position;
    let mut has_earlier_neighbor = false;
    for offset in [
      glam::IVec3::new(1, 0, 0),
      glam::IVec3::new(-1, 0, 0),
      glam::IVec3::new(0, 1, 0),
      glam::IVec3::new(0, -1, 0),
      glam::IVec3::new(0, 0, 1),
      glam::IVec3::new(0, 0, -1),
    ] {
      let neighbor = position + offset;
      if !ff.in_bounds(neighbor) {
        continue;
      }
      let neighbor_index = ff.cell_index(neighbor);
      if ff.cells[neighbor_index].state == CellState::Flooded
        && ff.flooded_cells[..order].contains(&neighbor_index)
      {
        has_earlier_neighbor = true;
        break;
      }
    }
    assert!(has_earlier_neighbor, "cell {position} is disconnected");
  }
}

#[test]
fn isolated_origin_floods_a_single_cell() {
  let mut ff = FloodFill::new(DVec3::new(10.0, 10.0, 10.0), 5.0);
  ff.run(DVec3::ZERO, |_, _| false);

  assert_eq!(ff.flooded_cells.len(), 1);
  assert_eq!(ff.cells[ff.flooded_cells[0]].position, ff.origin);
}

#[test]
fn rerun_resets_previous_state() {
  let mut ff = FloodFill::new(DVec3::new(10.0, 10.0, 10.0), 5.0);
  ff.run(DVec3::ZERO, |_, _| true);
  let full = ff.flooded_cells.len();

  ff.run(DVec3::ZERO, |_, _| false);
  assert_eq!(ff.flooded_cells.len(), 1);

  ff.run(DVec3::ZERO, |_, _| true);
  assert_eq!(ff.flooded_cells.len(), full);
}
