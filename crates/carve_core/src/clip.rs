//! Delimiter clip resolution: detect every pair of crossing faces, order
//! the conflicts, and trim the faces against each other so that no two
//! delimiters' surfaces cross afterwards.
//!
//! Conflicts are resolved nearest-first: the distance metric projects the
//! vectors from both delimiter centres to the intersection onto the plane
//! orthogonal to the "horizon" `normalize(n0 × n1)`, so that an
//! intersection close to both walls in the floor plan wins over one far
//! away, independent of where along the crossing line it was detected.

use glam::DVec3;

use crate::constants::CORE_SMALL_EPSILON;
use crate::geom::{ray_double_sided_triangle_intersection, Triangle};
use crate::objects::Delimiter;
use crate::tessel::tessellate;

/// One crossing (plane, plane) pair between two delimiters.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DelimiterIntersection {
  /// Sum of both squared horizon-projected distances; smaller resolves
  /// first.
  pub total_distance: f64,
  /// Delimiter indices into the world registry, `d0 < d1`.
  pub d0: usize,
  pub d1: usize,
  /// Plane indices within the respective delimiter.
  pub p0: usize,
  pub p1: usize,
}

/// Test one edge against a triangle of the other face and, on a hit, fold
/// the hit's priority distance into `nearest_distance`.
fn check_edge_against_triangle(
  e0: DVec3,
  e1: DVec3,
  edge_normal: DVec3,
  triangle: &Triangle,
  o0: DVec3,
  o1: DVec3,
  nearest_distance: &mut f64,
) -> bool {
  let direction = e1 - e0;

  let Some(t) =
    ray_double_sided_triangle_intersection(e0, direction, triangle.p0, triangle.p1, triangle.p2)
  else {
    return false;
  };

  if !(0.0..=1.0).contains(&t) {
    return false;
  }

  let intersection = e0 + direction * t;

  // Project the centre-to-intersection deltas onto the floor plane of the
  // two walls. Without this, an intersection detected at the near end of a
  // long wall would rank ahead of a geometrically closer crossing.
  let horizon = edge_normal.cross(triangle.n);
  let (delta0, delta1) = if horizon.length_squared() > CORE_SMALL_EPSILON {
    let horizon = horizon.normalize();
    let delta0 = o0 - intersection;
    let delta1 = o1 - intersection;
    (
      delta0 - horizon * delta0.dot(horizon),
      delta1 - horizon * delta1.dot(horizon),
    )
  } else {
    (o0 - intersection, o1 - intersection)
  };

  let distance = delta0.length_squared() + delta1.length_squared();
  if distance < *nearest_distance {
    *nearest_distance = distance;
  }

  true
}

/// Record every crossing face pair between delimiters `i` and `j`.
pub(crate) fn find_intersections(
  delimiters: &[Delimiter],
  i: usize,
  j: usize,
  intersections: &mut Vec<DelimiterIntersection>,
) {
  let d0 = &delimiters[i];
  let d1 = &delimiters[j];

  for (pi, p0) in d0.planes.iter().enumerate() {
    for (pj, p1) in d1.planes.iter().enumerate() {
      let mut intersection = false;
      let mut distance = f64::MAX;

      for t0 in &p0.triangles {
        for t1 in &p1.triangles {
          for (e0, e1) in [(t0.p0, t0.p1), (t0.p1, t0.p2), (t0.p2, t0.p0)] {
            intersection |= check_edge_against_triangle(
              e0,
              e1,
              t0.n,
              t1,
              d0.position,
              d1.position,
              &mut distance,
            );
          }
          for (e0, e1) in [(t1.p0, t1.p1), (t1.p1, t1.p2), (t1.p2, t1.p0)] {
            intersection |= check_edge_against_triangle(
              e0,
              e1,
              t1.n,
              t0,
              d1.position,
              d0.position,
              &mut distance,
            );
          }
        }
      }

      if intersection {
        intersections.push(DelimiterIntersection {
          total_distance: distance,
          d0: i,
          d1: j,
          p0: pi,
          p1: pj,
        });
      }
    }
  }
}

/// Drop a generated sub-triangle when it lies entirely on the far side of
/// the clip plane, seen from the owning delimiter's centre. The clip
/// triangle's stored normal orientation is arbitrary for this purpose, so
/// it is flipped towards the owner first.
fn delimiter_triangle_should_be_clipped(
  candidate: &Triangle,
  clip: &Triangle,
  owner_position: DVec3,
) -> bool {
  let mut adjusted = *clip;
  if adjusted.n.dot(owner_position - adjusted.p0) < 0.0 {
    adjusted.n = -adjusted.n;
  }

  candidate.all_points_in_front_of_plane(&adjusted)
}

/// Tessellate every triangle of `to_clip` against every clipping triangle,
/// dropping the sub-triangles on the far side from the owner. Triangles
/// that never cross a clipping triangle are left alone, so face parts
/// beyond a wall that does not actually reach them survive.
fn clip_all_delimiter_triangles(
  to_clip: &mut Vec<Triangle>,
  clipping: &[Triangle],
  owner_position: DVec3,
) {
  let predicate =
    move |candidate: &Triangle, clip: &Triangle| {
      delimiter_triangle_should_be_clipped(candidate, clip, owner_position)
    };

  // The list grows while we walk it; appended sub-triangles get their own
  // pass against the full clip list.
  let mut i = 0;
  while i < to_clip.len() {
    for j in 0..clipping.len() {
      let clip = clipping[j];
      tessellate(to_clip, i, &clip, false, Some(&predicate));
    }
    i += 1;
  }
}

/// Resolve one crossing: trim each face by the other according to level
/// precedence. A face is trimmed by faces of greater or equal level, so
/// equal levels trim each other and a higher-level wall passes through a
/// lower-level one untouched.
///
/// The second arm clips against a snapshot of the first face's triangles:
/// clipping the first face mutates it, and the parts that were just removed
/// must still count as clip geometry for the other side.
fn solve_delimiter_intersection(
  delimiters: &mut [Delimiter],
  intersection: &DelimiterIntersection,
) {
  let (head, tail) = delimiters.split_at_mut(intersection.d1);
  let a = &mut head[intersection.d0];
  let b = &mut tail[0];

  let original_a_triangles = a.planes[intersection.p0].triangles.clone();

  if b.level >= a.level {
    clip_all_delimiter_triangles(
      &mut a.planes[intersection.p0].triangles,
      &b.planes[intersection.p1].triangles,
      a.position,
    );
  }

  if a.level >= b.level {
    clip_all_delimiter_triangles(
      &mut b.planes[intersection.p1].triangles,
      &original_a_triangles,
      b.position,
    );
  }
}

/// Run the full clip resolution over all delimiters, then trim everything
/// to the world's root clipping triangles. Returns the number of crossing
/// face pairs that were resolved.
pub(crate) fn clip_delimiters(delimiters: &mut [Delimiter], root_triangles: &[Triangle]) -> usize {
  let mut intersections = Vec::new();
  for i in 0..delimiters.len() {
    for j in (i + 1)..delimiters.len() {
      find_intersections(delimiters, i, j, &mut intersections);
    }
  }

  // Stable sort: ties resolve in detection order, keeping the whole phase
  // deterministic.
  intersections.sort_by(|lhs, rhs| lhs.total_distance.total_cmp(&rhs.total_distance));

  for intersection in &intersections {
    solve_delimiter_intersection(delimiters, intersection);
  }

  //
  // Trim every face to the world bounds. The root triangles face inward, so
  // a triangle that ends up entirely behind one of them is outside the
  // world and gets removed; crossing triangles are split first so only the
  // outside part goes.
  //
  for delimiter in delimiters.iter_mut() {
    for plane in delimiter.planes.iter_mut() {
      let mut i = 0;
      while i < plane.triangles.len() {
        let mut out_of_bounds = false;
        for root in root_triangles {
          tessellate(&mut plane.triangles, i, root, true, None);
          out_of_bounds |= plane.triangles[i].all_points_in_front_of_plane(root);
        }

        if out_of_bounds {
          plane.triangles.remove(i);
        } else {
          i += 1;
        }
      }
    }
  }

  intersections.len()
}

#[cfg(test)]
#[path = "clip_test.rs"]
mod clip_test;
