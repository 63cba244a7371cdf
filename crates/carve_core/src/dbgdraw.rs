//! Flat debug-draw data for visualising a world's state.
//!
//! Everything is collected into plain arrays of primitives so any renderer
//! or editor bridge can consume it without knowing the core types. Each
//! object class is selected independently through [`DebugDrawOptions`].

use glam::{DQuat, DVec3};

use crate::flood_fill::CellState;
use crate::geom::Triangle;
use crate::world::World;

bitflags::bitflags! {
  #[derive(Clone, Copy, PartialEq, Eq, Debug)]
  pub struct DebugDrawOptions: u32 {
    const ANCHORS              = 0x1;
    const DELIMITERS           = 0x2;
    const DELIMITER_FACES      = 0x4;
    const DELIMITER_WIREFRAMES = 0x8;
    const VOLUME_FACES         = 0x10;
    const VOLUME_WIREFRAMES    = 0x20;
    const ROOT_PLANES          = 0x40;
    const FLOOD_FILL_CELLS     = 0x80;
    const BVH_NODES            = 0x100;
    const LABELS               = 0x1000;
    const NORMALS              = 0x2000;
    const EVERYTHING           = 0xffff_ffff;
  }
}

#[derive(Clone, Copy, Debug)]
pub struct DebugDrawLine {
  pub p0: DVec3,
  pub p1: DVec3,
  pub color: [u8; 3],
}

#[derive(Clone, Copy, Debug)]
pub struct DebugDrawTriangle {
  pub p0: DVec3,
  pub p1: DVec3,
  pub p2: DVec3,
  pub color: [u8; 3],
}

#[derive(Clone, Copy, Debug)]
pub struct DebugDrawCuboid {
  pub position: DVec3,
  pub half_size: DVec3,
  pub rotation: DQuat,
  pub color: [u8; 3],
}

#[derive(Clone, Copy, Debug)]
pub struct DebugDrawSphere {
  pub position: DVec3,
  pub radius: f64,
  pub color: [u8; 3],
}

#[derive(Clone, Debug)]
pub struct DebugDrawText {
  pub position: DVec3,
  pub text: String,
  pub color: [u8; 3],
}

#[derive(Clone, Debug, Default)]
pub struct DebugDrawData {
  pub lines: Vec<DebugDrawLine>,
  pub triangles: Vec<DebugDrawTriangle>,
  pub cuboids: Vec<DebugDrawCuboid>,
  pub spheres: Vec<DebugDrawSphere>,
  pub texts: Vec<DebugDrawText>,
}

const ANCHOR_COLOR: [u8; 3] = [255, 140, 0];
const DELIMITER_COLOR: [u8; 3] = [120, 120, 130];
const FACE_COLOR: [u8; 3] = [200, 60, 60];
const WIREFRAME_COLOR: [u8; 3] = [240, 240, 240];
const VOLUME_COLOR: [u8; 3] = [60, 160, 220];
const ROOT_COLOR: [u8; 3] = [60, 60, 60];
const CELL_COLOR: [u8; 3] = [90, 200, 90];
const BVH_COLOR: [u8; 3] = [180, 60, 180];
const NORMAL_COLOR: [u8; 3] = [255, 255, 0];
const TEXT_COLOR: [u8; 3] = [255, 255, 255];

fn draw_triangle_list(
  data: &mut DebugDrawData,
  triangles: &[Triangle],
  faces: bool,
  wireframes: bool,
  normals: bool,
  color: [u8; 3],
) {
  for t in triangles {
    if faces {
      data.triangles.push(DebugDrawTriangle {
        p0: t.p0,
        p1: t.p1,
        p2: t.p2,
        color,
      });
    }
    if wireframes {
      for (a, b) in [(t.p0, t.p1), (t.p1, t.p2), (t.p2, t.p0)] {
        data.lines.push(DebugDrawLine {
          p0: a,
          p1: b,
          color: WIREFRAME_COLOR,
        });
      }
    }
    if normals {
      let center = t.center();
      data.lines.push(DebugDrawLine {
        p0: center,
        p1: center + t.n,
        color: NORMAL_COLOR,
      });
    }
  }
}

/// Collect the selected parts of the world into flat draw data.
pub fn debug_draw_world(world: &World, options: DebugDrawOptions) -> DebugDrawData {
  let mut data = DebugDrawData::default();
  let labels = options.contains(DebugDrawOptions::LABELS);
  let normals = options.contains(DebugDrawOptions::NORMALS);

  if options.contains(DebugDrawOptions::ANCHORS) {
    for anchor in &world.anchors {
      data.spheres.push(DebugDrawSphere {
        position: anchor.position,
        radius: 0.5,
        color: ANCHOR_COLOR,
      });
      if labels {
        if let Some(label) = &anchor.label {
          data.texts.push(DebugDrawText {
            position: anchor.position,
            text: label.clone(),
            color: TEXT_COLOR,
          });
        }
      }
    }
  }

  if options.contains(DebugDrawOptions::DELIMITERS) {
    for delimiter in &world.delimiters {
      data.cuboids.push(DebugDrawCuboid {
        position: delimiter.position,
        half_size: delimiter.half_size,
        rotation: delimiter.rotation,
        color: DELIMITER_COLOR,
      });
      if labels {
        if let Some(label) = &delimiter.label {
          data.texts.push(DebugDrawText {
            position: delimiter.position,
            text: label.clone(),
            color: TEXT_COLOR,
          });
        }
      }
    }
  }

  let faces = options.contains(DebugDrawOptions::DELIMITER_FACES);
  let wires = options.contains(DebugDrawOptions::DELIMITER_WIREFRAMES);
  if faces || wires || normals {
    for delimiter in &world.delimiters {
      for plane in &delimiter.planes {
        draw_triangle_list(&mut data, &plane.triangles, faces, wires, normals, FACE_COLOR);
      }
    }
  }

  let faces = options.contains(DebugDrawOptions::VOLUME_FACES);
  let wires = options.contains(DebugDrawOptions::VOLUME_WIREFRAMES);
  if faces || wires {
    for anchor in &world.anchors {
      draw_triangle_list(&mut data, &anchor.volume, faces, wires, false, VOLUME_COLOR);
    }
  }

  if options.contains(DebugDrawOptions::ROOT_PLANES) {
    draw_triangle_list(
      &mut data,
      &world.root_clipping_triangles,
      true,
      false,
      normals,
      ROOT_COLOR,
    );
  }

  if options.contains(DebugDrawOptions::FLOOD_FILL_CELLS) {
    if let Some(ff) = &world.flood_fill {
      for cell in &ff.cells {
        if cell.state != CellState::Flooded {
          continue;
        }
        data.cuboids.push(DebugDrawCuboid {
          position: ff.cell_world_space_center(cell.position),
          half_size: DVec3::splat(ff.cell_size / 2.0),
          rotation: DQuat::IDENTITY,
          color: CELL_COLOR,
        });
      }
    }
  }

  if options.contains(DebugDrawOptions::BVH_NODES) {
    for node in &world.bvh.nodes {
      data.cuboids.push(DebugDrawCuboid {
        position: node.aabb.center(),
        half_size: node.aabb.size() / 2.0,
        rotation: DQuat::IDENTITY,
        color: BVH_COLOR,
      });
    }
  }

  data
}
