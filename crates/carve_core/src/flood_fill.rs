//! Voxel flood fill around an anchor.
//!
//! The grid covers the whole world with an odd number of cells per axis, so
//! a cell centre (not a cell edge) coincides with the grid centre. On top
//! of that, the grid is phase-shifted by `anchor mod cell_size` per axis so
//! the anchor sits exactly at its cell's centre; admissibility rays then
//! start from well-defined cell centres instead of arbitrary offsets.
//!
//! Six-neighbour BFS: a neighbour is admissible when the segment between
//! the two cell centres hits neither a delimiter triangle nor a root
//! clipping triangle. The caller supplies that test as a closure.

use glam::{DVec3, IVec3};

/// Lifecycle of a cell during one fill: `Untouched → InFrontier → Flooded`,
/// no reverse edges.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellState {
  #[default]
  Untouched,
  InFrontier,
  Flooded,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Cell {
  /// Grid coordinates; filled in when the cell first enters the frontier.
  pub position: IVec3,
  pub state: CellState,
}

/// Scratch state for one flood fill. The grid shape only depends on the
/// world size and cell size, so a world reuses one of these across all of
/// its anchors.
#[derive(Clone, Debug)]
pub struct FloodFill {
  pub hx: i32,
  pub hy: i32,
  pub hz: i32,
  pub cell_size: f64,

  /// Offset from cell space to world space; absorbs the half grid size and
  /// the anchor phase.
  cell_to_world: DVec3,
  /// The anchor phase, `anchor mod cell_size` per axis.
  world_to_cell: DVec3,

  /// The cell the anchor landed in.
  pub origin: IVec3,

  frontier: std::collections::VecDeque<usize>,
  /// Flooded cell indices in pop order.
  pub flooded_cells: Vec<usize>,
  pub cells: Vec<Cell>,
}

fn ceil_to_odd(value: f64) -> i32 {
  let result = value.ceil() as i32;
  if result % 2 == 0 {
    result + 1
  } else {
    result
  }
}

impl FloodFill {
  pub fn new(world_half_size: DVec3, cell_size: f64) -> Self {
    let hx = ceil_to_odd(world_half_size.x / cell_size * 2.0);
    let hy = ceil_to_odd(world_half_size.y / cell_size * 2.0);
    let hz = ceil_to_odd(world_half_size.z / cell_size * 2.0);

    Self {
      hx,
      hy,
      hz,
      cell_size,
      cell_to_world: DVec3::ZERO,
      world_to_cell: DVec3::ZERO,
      origin: IVec3::ZERO,
      frontier: std::collections::VecDeque::new(),
      flooded_cells: Vec::new(),
      cells: vec![Cell::default(); (hx * hy * hz) as usize],
    }
  }

  #[inline]
  pub fn in_bounds(&self, position: IVec3) -> bool {
    position.x >= 0
      && position.x < self.hx
      && position.y >= 0
      && position.y < self.hy
      && position.z >= 0
      && position.z < self.hz
  }

  #[inline]
  pub fn cell_index(&self, position: IVec3) -> usize {
    (position.x * self.hy * self.hz + position.y * self.hz + position.z) as usize
  }

  pub fn cell_world_space_center(&self, position: IVec3) -> DVec3 {
    DVec3::new(
      position.x as f64 * self.cell_size - self.cell_to_world.x,
      position.y as f64 * self.cell_size - self.cell_to_world.y,
      position.z as f64 * self.cell_size - self.cell_to_world.z,
    )
  }

  pub fn world_space_to_cell_space(&self, world_space: DVec3) -> IVec3 {
    let scaled = (world_space - self.world_to_cell) / self.cell_size;
    IVec3::new(
      ((scaled.x + self.hx as f64 / 2.0 - 1.0).round() as i32).clamp(0, self.hx - 1),
      ((scaled.y + self.hy as f64 / 2.0 - 1.0).round() as i32).clamp(0, self.hy - 1),
      ((scaled.z + self.hz as f64 / 2.0 - 1.0).round() as i32).clamp(0, self.hz - 1),
    )
  }

  /// Flood outward from `origin`, using `admissible(src, dst)` (world-space
  /// cell centres) to decide which neighbour steps are open.
  pub fn run(&mut self, origin: DVec3, admissible: impl Fn(DVec3, DVec3) -> bool) {
    self.frontier.clear();
    self.flooded_cells.clear();
    self.cells.fill(Cell::default());

    self.world_to_cell = DVec3::new(
      origin.x % self.cell_size,
      origin.y % self.cell_size,
      origin.z % self.cell_size,
    );
    self.cell_to_world = DVec3::new(
      (self.hx / 2) as f64,
      (self.hy / 2) as f64,
      (self.hz / 2) as f64,
    ) * self.cell_size
      - self.world_to_cell;

    self.origin = self.world_space_to_cell_space(origin);

    // Seed the frontier with the anchor's cell, unconditionally.
    let origin_index = self.cell_index(self.origin);
    self.cells[origin_index].position = self.origin;
    self.cells[origin_index].state = CellState::InFrontier;
    self.frontier.push_back(origin_index);

    while let Some(index) = self.frontier.pop_front() {
      self.fill_cell(index, &admissible);
    }
  }

  fn fill_cell(&mut self, index: usize, admissible: &impl Fn(DVec3, DVec3) -> bool) {
    self.cells[index].state = CellState::Flooded;
    self.flooded_cells.push(index);

    let position = self.cells[index].position;
    for offset in [
      IVec3::new(1, 0, 0),
      IVec3::new(-1, 0, 0),
      IVec3::new(0, 1, 0),
      IVec3::new(0, -1, 0),
      IVec3::new(0, 0, 1),
      IVec3::new(0, 0, -1),
    ] {
      self.maybe_add_to_frontier(position, position + offset, admissible);
    }
  }

  fn maybe_add_to_frontier(
    &mut self,
    src: IVec3,
    dst: IVec3,
    admissible: &impl Fn(DVec3, DVec3) -> bool,
  ) {
    if !self.in_bounds(dst) {
      return;
    }

    let index = self.cell_index(dst);
    if self.cells[index].state != CellState::Untouched {
      return;
    }
    self.cells[index].position = dst;

    if !admissible(
      self.cell_world_space_center(src),
      self.cell_world_space_center(dst),
    ) {
      return;
    }

    self.cells[index].state = CellState::InFrontier;
    self.frontier.push_back(index);
  }
}

#[cfg(test)]
#[path = "flood_fill_test.rs"]
mod flood_fill_test;
