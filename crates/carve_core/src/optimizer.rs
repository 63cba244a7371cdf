//! Optional mesh post-pass merging triangle pairs that together form one
//! bigger triangle. Not part of the solve pipeline; callers run it on an
//! anchor volume when triangle count matters more than build time.

use glam::DVec3;

use crate::constants::CORE_EPSILON;
use crate::geom::{points_almost_identical, Triangle};

/// Distance-to-line test: is `point` on the infinite edge through `origin`
/// along `direction`?
fn point_on_edge(point: DVec3, origin: DVec3, direction: DVec3) -> bool {
  let t = direction.dot(point - origin) / direction.length_squared();
  let distance = (point - (origin + direction * t)).length();
  distance <= CORE_EPSILON
}

fn shared_with(point: DVec3, other: &Triangle) -> bool {
  points_almost_identical(point, other.p0)
    || points_almost_identical(point, other.p1)
    || points_almost_identical(point, other.p2)
}

/// Two triangles combine into one when they share two vertices and the edge
/// between the two unshared vertices runs through one of the shared ones:
///
/// ```text
///      /|  <- unshared in t0
///     / |
///    /__|  <- shared, on the unshared-unshared edge
///    \  |
///     \ |
///      \|  <- unshared in t1
/// ```
fn maybe_combine_triangles(t0: &Triangle, t1: &Triangle) -> Option<Triangle> {
  let corners0 = [t0.p0, t0.p1, t0.p2];
  let corners1 = [t1.p0, t1.p1, t1.p2];

  let unshared0 = *corners0.iter().find(|p| !shared_with(**p, t1))?;
  let unshared1 = *corners1.iter().find(|p| !shared_with(**p, t0))?;

  let shared: Vec<DVec3> = corners0
    .iter()
    .copied()
    .filter(|p| shared_with(*p, t1))
    .collect();
  if shared.len() != 2 {
    return None;
  }

  let edge = unshared1 - unshared0;
  let inlined = shared
    .iter()
    .copied()
    .find(|p| point_on_edge(*p, unshared0, edge))?;
  let extruded = shared
    .iter()
    .copied()
    .find(|p| !points_almost_identical(*p, inlined) && !point_on_edge(*p, unshared0, edge))?;

  Some(Triangle::new(unshared0, unshared1, extruded))
}

/// Repeatedly merge combinable pairs until no pair is left. The scan
/// restarts after every merge since the indices shift.
pub fn optimize_mesh(mesh: &mut Vec<Triangle>) {
  loop {
    let mut combined: Option<(usize, usize, Triangle)> = None;

    'scan: for i in 0..mesh.len() {
      for j in (i + 1)..mesh.len() {
        if let Some(output) = maybe_combine_triangles(&mesh[i], &mesh[j]) {
          combined = Some((i, j, output));
          break 'scan;
        }
      }
    }

    match combined {
      Some((i, j, output)) => {
        // j is the bigger index; remove it first so i stays valid.
        mesh.remove(j);
        mesh.remove(i);
        mesh.push(output);
      }
      None => break,
    }
  }
}
