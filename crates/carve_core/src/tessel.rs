//! Triangle tessellation against a clip triangle or a clip plane.
//!
//! `tessellate` rewrites the triangle at `index` in place and appends any
//! extra sub-triangles to the same list, so that afterwards no output
//! triangle crosses the clip surface and the new edge between the two
//! intersection points exists in the triangulation. All outputs keep the
//! input triangle's normal.
//!
//! The split fans over at most five sub-triangles around the two
//! intersection points; degenerate outputs (duplicate corners, sub-epsilon
//! area) are filtered out, and an optional caller predicate can drop
//! sub-triangles that land on the unwanted side of the clip.

use glam::{DVec2, DVec3};

use crate::constants::{CORE_EPSILON, CORE_SMALL_EPSILON};
use crate::geom::{
  calculate_barycentric_coefficients, point_inside_triangle_2d, points_almost_identical,
  ray_double_sided_plane_intersection, ray_double_sided_triangle_intersection, Triangle,
};

/// Caller predicate: true means the candidate sub-triangle must be dropped.
/// Receives the candidate and the clip triangle.
pub type ShouldBeClipped<'a> = &'a dyn Fn(&Triangle, &Triangle) -> bool;

struct Tessellator {
  // Corners and normal of the input triangle, copied up front because the
  // triangle is rewritten in place as sub-triangles are generated.
  input_corner: [DVec3; 3],
  input_normal: DVec3,

  intersection_point: [DVec3; 2],
  intersection_count: usize,
  // Set when a third distinct intersection point shows up; that only
  // happens on (numerically) coplanar input and means no tessellation.
  overflowed: bool,

  barycentric: [[f64; 3]; 2],

  generated_count: usize,
}

impl Tessellator {
  fn new(input: &Triangle) -> Self {
    Self {
      input_corner: [input.p0, input.p1, input.p2],
      input_normal: input.n,
      intersection_point: [DVec3::ZERO; 2],
      intersection_count: 0,
      overflowed: false,
      barycentric: [[0.0; 3]; 2],
      generated_count: 0,
    }
  }

  /// Record an intersection point unless it duplicates one we already have.
  /// A corner lying on the clip surface yields the same point from both of
  /// its edges; relying on open/half-open ranges of the ray parameter
  /// instead turned out to be numerically fragile.
  fn maybe_add_intersection_point(&mut self, point: DVec3) {
    if self.intersection_count >= 1 && points_almost_identical(point, self.intersection_point[0]) {
      return;
    }
    if self.intersection_count >= 2 && points_almost_identical(point, self.intersection_point[1]) {
      return;
    }
    if self.intersection_count >= 2 {
      self.overflowed = true;
      return;
    }
    self.intersection_point[self.intersection_count] = point;
    self.intersection_count += 1;
  }

  fn check_edge_against_triangle(&mut self, e0: DVec3, e1: DVec3, triangle: &Triangle) {
    let direction = e1 - e0;

    let Some(t) = ray_double_sided_triangle_intersection(
      e0,
      direction,
      triangle.p0,
      triangle.p1,
      triangle.p2,
    ) else {
      return;
    };

    // Outside (-eps, 1+eps): the infinite line hits, the edge does not.
    if t <= -CORE_SMALL_EPSILON || t >= 1.0 + CORE_SMALL_EPSILON {
      return;
    }

    self.maybe_add_intersection_point(e0 + direction * t);
  }

  fn check_edge_against_plane(&mut self, e0: DVec3, e1: DVec3, plane: &Triangle) {
    let direction = e1 - e0;
    // Edge running inside the clip plane: no usable intersection point.
    if direction.dot(plane.n).abs() < CORE_EPSILON {
      return;
    }

    let Some(t) = ray_double_sided_plane_intersection(e0, direction, plane.p0, plane.n) else {
      return;
    };

    if t <= -CORE_SMALL_EPSILON || t >= 1.0 + CORE_SMALL_EPSILON {
      return;
    }

    self.maybe_add_intersection_point(e0 + direction * t);
  }

  /// Which of the two intersection points sits closer to `corner` in
  /// barycentric space.
  fn closest_intersection_point_to_corner(&self, corner: usize) -> usize {
    if self.barycentric[0][corner] >= self.barycentric[1][corner] {
      0
    } else {
      1
    }
  }

  /// 2D point-in-triangle in the barycentric coordinate system spanned by
  /// corners `c0` and `c1`: tests whether the far intersection point lies
  /// inside the sub-triangle (near, c0, c1).
  fn far_point_inside_outer_triangle(&self, near: usize, far: usize, c0: usize, c1: usize) -> bool {
    let f = DVec2::new(self.barycentric[far][c0], self.barycentric[far][c1]);
    let n = DVec2::new(self.barycentric[near][c0], self.barycentric[near][c1]);
    point_inside_triangle_2d(f, n, DVec2::new(1.0, 0.0), DVec2::new(0.0, 1.0))
  }

  /// Filter a candidate sub-triangle and either overwrite the input slot
  /// (first survivor) or append to the list.
  fn generate_new_triangle(
    &mut self,
    triangles: &mut Vec<Triangle>,
    index: usize,
    clip: &Triangle,
    should_be_clipped: Option<ShouldBeClipped>,
    p0: DVec3,
    p1: DVec3,
    p2: DVec3,
  ) {
    if points_almost_identical(p0, p1)
      || points_almost_identical(p0, p2)
      || points_almost_identical(p1, p2)
    {
      return;
    }

    let area = (p1 - p0).cross(p2 - p0).length() / 2.0;
    if area < CORE_EPSILON {
      return;
    }

    let candidate = Triangle::with_normal(p0, p1, p2, self.input_normal);
    if let Some(predicate) = should_be_clipped {
      if predicate(&candidate, clip) {
        return;
      }
    }

    if self.generated_count == 0 {
      // Re-use the input slot to keep the list compact.
      triangles[index] = candidate;
    } else {
      triangles.push(candidate);
    }
    self.generated_count += 1;
  }
}

/// Split `triangles[index]` along its intersection with `clip`.
///
/// With `against_plane` set, the clip triangle only provides a plane (its
/// first corner and normal); otherwise the finite clip triangle is used and
/// both triangles' edges are tested against the other face.
///
/// Returns the number of sub-triangles that survived the filters: 0 means
/// the triangle was left untouched (no crossing, or a degenerate
/// configuration), otherwise the first survivor replaced the input and
/// `count - 1` triangles were appended.
pub fn tessellate(
  triangles: &mut Vec<Triangle>,
  index: usize,
  clip: &Triangle,
  against_plane: bool,
  should_be_clipped: Option<ShouldBeClipped>,
) -> usize {
  let input = triangles[index];
  let mut tessellator = Tessellator::new(&input);

  if !against_plane {
    // Two triangles intersect with two edge-to-face crossings in total
    // (either two edges of one through the other, or one edge of each).
    // Either way, exactly two intersection points.
    tessellator.check_edge_against_triangle(input.p0, input.p1, clip);
    tessellator.check_edge_against_triangle(input.p1, input.p2, clip);
    tessellator.check_edge_against_triangle(input.p2, input.p0, clip);
    tessellator.check_edge_against_triangle(clip.p0, clip.p1, &input);
    tessellator.check_edge_against_triangle(clip.p1, clip.p2, &input);
    tessellator.check_edge_against_triangle(clip.p2, clip.p0, &input);
  } else {
    // An infinite plane cannot be missed sideways, so only the input's
    // edges need testing.
    tessellator.check_edge_against_plane(input.p0, input.p1, clip);
    tessellator.check_edge_against_plane(input.p1, input.p2, clip);
    tessellator.check_edge_against_plane(input.p2, input.p0, clip);
  }

  // 0 or 2 points is the well-posed outcome. 1 or 3 distinct points can
  // only appear when an edge or the whole triangle lies (numerically) on
  // the clip plane, in which case no tessellation is required.
  if tessellator.intersection_count != 2 || tessellator.overflowed {
    return 0;
  }

  for i in 0..2 {
    let (u, v, w) = calculate_barycentric_coefficients(
      tessellator.input_corner[0],
      tessellator.input_corner[1],
      tessellator.input_corner[2],
      tessellator.intersection_point[i],
    );
    tessellator.barycentric[i] = [u, v, w];
  }

  let point_is_corner = [0, 1].map(|i| {
    tessellator.barycentric[i]
      .iter()
      .any(|&coefficient| coefficient >= 1.0 - CORE_EPSILON)
  });

  // Both points on corners: the split edge already exists in the input
  // triangle, typically because this triangle came out of a previous
  // tessellation against the same surface.
  if point_is_corner[0] && point_is_corner[1] {
    return 0;
  }

  //
  // Pick the "extension" corner: the corner whose connection to its nearest
  // intersection point best lines up with the intersection edge. The fan is
  // built by extending the intersection edge towards that corner.
  //
  let intersection_edge = tessellator.intersection_point[0] - tessellator.intersection_point[1];

  let closest: [usize; 3] = [
    tessellator.closest_intersection_point_to_corner(0),
    tessellator.closest_intersection_point_to_corner(1),
    tessellator.closest_intersection_point_to_corner(2),
  ];

  let mut factor = [0.0f64; 3];
  for corner in 0..3 {
    let to_intersection =
      tessellator.input_corner[corner] - tessellator.intersection_point[closest[corner]];
    let length_squared = to_intersection.length_squared();
    if length_squared < CORE_SMALL_EPSILON {
      continue;
    }
    factor[corner] = to_intersection.dot(intersection_edge).abs() / length_squared;
  }

  let extension = if factor[0] > factor[1] {
    if factor[0] > factor[2] {
      0
    } else {
      2
    }
  } else if factor[1] > factor[2] {
    1
  } else {
    2
  };
  let first_corner = (extension + 1) % 3;
  let second_corner = (extension + 2) % 3;
  let near_index = closest[extension];
  let far_index = (near_index + 1) % 2;

  let ext = tessellator.input_corner[extension];
  let first = tessellator.input_corner[first_corner];
  let second = tessellator.input_corner[second_corner];
  let near = tessellator.intersection_point[near_index];
  let far = tessellator.intersection_point[far_index];

  //
  // The near point splits the input into three sub-triangles; the far point
  // lands in one of them, and that sub-triangle is fanned around it. Dead
  // and predicate-rejected candidates are filtered in generate_new_triangle.
  //
  macro_rules! generate {
    ($a:expr, $b:expr, $c:expr) => {
      tessellator.generate_new_triangle(triangles, index, clip, should_be_clipped, $a, $b, $c)
    };
  }

  if tessellator.far_point_inside_outer_triangle(near_index, far_index, first_corner, second_corner)
  {
    // Far point inside (near, first, second).
    generate!(ext, first, near);
    generate!(ext, near, second);
    generate!(far, first, second);
    generate!(near, first, far);
    generate!(near, far, second);
  } else if tessellator.far_point_inside_outer_triangle(near_index, far_index, extension, first_corner)
  {
    // Far point inside (near, ext, first).
    generate!(ext, second, near);
    generate!(near, first, second);
    generate!(far, first, ext);
    generate!(near, far, first);
    generate!(near, ext, far);
  } else {
    // Far point inside (near, second, ext).
    generate!(ext, first, near);
    generate!(near, first, second);
    generate!(far, second, ext);
    generate!(near, far, second);
    generate!(near, ext, far);
  }

  tessellator.generated_count
}

#[cfg(test)]
#[path = "tessel_test.rs"]
mod tessel_test;
