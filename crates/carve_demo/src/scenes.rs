//! Reference scenes for demonstrating and benchmarking the solver.

use carve_core::{AxisIndex, VirtualExtension, World, WorldError};
use glam::DVec3;

/// One delimiter pair in the middle of the world, one anchor outside it.
pub fn center_block() -> Result<World, WorldError> {
  let mut world = World::new(DVec3::new(50.0, 10.0, 50.0));
  world.add_labeled_anchor("Outside", DVec3::new(0.0, 0.0, -10.0))?;

  let block = world.add_labeled_delimiter(
    "Center Block",
    DVec3::ZERO,
    DVec3::new(5.0, 5.0, 5.0),
    DVec3::ZERO,
    0,
  )?;
  world.add_delimiter_plane(block, AxisIndex::Z, false, VirtualExtension::ALL)?;

  Ok(world)
}

/// Three walls forming a U with one anchor inside and one outside.
pub fn u_shape() -> Result<World, WorldError> {
  let mut world = World::new(DVec3::new(50.0, 10.0, 50.0));
  world.add_labeled_anchor("Inside", DVec3::ZERO)?;
  world.add_labeled_anchor("Outside", DVec3::new(0.0, 0.0, -20.0))?;

  let back = world.add_labeled_delimiter(
    "Back Wall",
    DVec3::new(0.0, 0.0, -10.0),
    DVec3::new(10.0, 0.5, 0.5),
    DVec3::ZERO,
    0,
  )?;
  world.add_delimiter_plane(back, AxisIndex::Z, false, VirtualExtension::ALL)?;

  let east = world.add_labeled_delimiter(
    "East Wall",
    DVec3::new(10.0, 0.0, 0.0),
    DVec3::new(0.5, 0.5, 10.0),
    DVec3::ZERO,
    0,
  )?;
  world.add_delimiter_plane(east, AxisIndex::X, false, VirtualExtension::ALL)?;

  let west = world.add_labeled_delimiter(
    "West Wall",
    DVec3::new(-10.0, 0.0, 0.0),
    DVec3::new(0.5, 0.5, 10.0),
    DVec3::ZERO,
    0,
  )?;
  world.add_delimiter_plane(west, AxisIndex::X, false, VirtualExtension::ALL)?;

  Ok(world)
}

/// Four walls enclosing the centre of the world.
pub fn cutout() -> Result<World, WorldError> {
  let mut world = World::new(DVec3::new(50.0, 10.0, 50.0));
  world.add_labeled_anchor("Inside", DVec3::ZERO)?;
  world.add_labeled_anchor("Outside", DVec3::new(0.0, 0.0, -10.0))?;

  for (label, position, half_size, axis) in [
    ("North", DVec3::new(0.0, 0.0, -5.0), DVec3::new(5.0, 0.5, 0.5), AxisIndex::Z),
    ("South", DVec3::new(0.0, 0.0, 5.0), DVec3::new(5.0, 0.5, 0.5), AxisIndex::Z),
    ("West", DVec3::new(-5.0, 0.0, 0.0), DVec3::new(0.5, 0.5, 5.0), AxisIndex::X),
    ("East", DVec3::new(5.0, 0.0, 0.0), DVec3::new(0.5, 0.5, 5.0), AxisIndex::X),
  ] {
    let wall = world.add_labeled_delimiter(label, position, half_size, DVec3::ZERO, 0)?;
    world.add_delimiter_plane(wall, axis, false, VirtualExtension::ALL)?;
  }

  Ok(world)
}

/// A small house floor plan: outer walls, a kitchen corner and a hallway,
/// with anchors in each room and one in the garden.
pub fn house() -> Result<World, WorldError> {
  let mut world = World::new(DVec3::new(100.0, 10.0, 100.0));
  world.reserve_objects(4, 7);

  world.add_labeled_anchor("Kitchen", DVec3::new(-5.0, -3.0, -5.0))?;
  world.add_labeled_anchor("Living Room", DVec3::new(5.0, -3.0, -5.0))?;
  world.add_labeled_anchor("Hallway", DVec3::new(-5.0, -3.0, 8.5))?;
  world.add_labeled_anchor("Garden", DVec3::new(0.0, -3.0, -30.0))?;

  for (label, position, half_size, axis) in [
    (
      "HallwayWall",
      DVec3::new(-2.0, -3.0, 6.0),
      DVec3::new(8.0, 0.25, 0.5),
      AxisIndex::Z,
    ),
    (
      "KitchenWall0",
      DVec3::new(0.0, -3.0, -7.0),
      DVec3::new(0.5, 0.25, 3.0),
      AxisIndex::X,
    ),
    (
      "KitchenWall1",
      DVec3::new(-7.0, -3.0, 0.0),
      DVec3::new(3.0, 0.25, 0.5),
      AxisIndex::Z,
    ),
    (
      "OuterWallNorth",
      DVec3::new(0.0, -3.0, -10.0),
      DVec3::new(10.0, 0.25, 0.5),
      AxisIndex::Z,
    ),
    (
      "OuterWallSouth",
      DVec3::new(0.0, -3.0, 10.0),
      DVec3::new(10.0, 0.25, 0.5),
      AxisIndex::Z,
    ),
    (
      "OuterWallEast",
      DVec3::new(10.0, -3.0, 0.0),
      DVec3::new(0.5, 0.25, 10.0),
      AxisIndex::X,
    ),
    (
      "OuterWallWest",
      DVec3::new(-10.0, -3.0, 0.0),
      DVec3::new(0.5, 0.25, 10.0),
      AxisIndex::X,
    ),
  ] {
    let wall = world.add_labeled_delimiter(label, position, half_size, DVec3::ZERO, 0)?;
    world.add_delimiter_plane(wall, axis, false, VirtualExtension::ALL)?;
  }

  Ok(world)
}
