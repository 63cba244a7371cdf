//! Geometry primitives: triangles, bounding boxes and the ray tests the
//! rest of the pipeline is built on.
//!
//! All ray queries are double-sided and return an *unnormalised* parameter:
//! the hit point is `origin + direction * t`, so `t` lies in `[0, 1]` exactly
//! when the segment `origin → origin + direction` reaches the surface.

use glam::{DVec2, DVec3};

use crate::constants::{CORE_EPSILON, CORE_SMALL_EPSILON};

// =============================================================================
// Triangle
// =============================================================================

/// A triangle with a cached unit normal.
///
/// The normal is kept alongside the corners so that clipping can generate
/// many sub-triangles without re-normalising; it must always equal
/// `normalize((p0 - p1) × (p0 - p2))` for the corner order stored here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
  pub p0: DVec3,
  pub p1: DVec3,
  pub p2: DVec3,
  pub n: DVec3,
}

impl Triangle {
  /// Build a triangle and derive its normal from the winding order.
  pub fn new(p0: DVec3, p1: DVec3, p2: DVec3) -> Self {
    let n = (p0 - p1).cross(p0 - p2).normalize();
    Self { p0, p1, p2, n }
  }

  /// Build a triangle with an externally supplied normal.
  pub fn with_normal(p0: DVec3, p1: DVec3, p2: DVec3, n: DVec3) -> Self {
    Self { p0, p1, p2, n }
  }

  /// Recompute the cached normal after the corners were mutated.
  pub fn recompute_normal(&mut self) {
    self.n = (self.p0 - self.p1).cross(self.p0 - self.p2).normalize();
  }

  /// Centroid of the three corners.
  #[inline]
  pub fn center(&self) -> DVec3 {
    (self.p0 + self.p1 + self.p2) / 3.0
  }

  /// Surface area, half the length of the edge cross product.
  pub fn area(&self) -> f64 {
    (self.p1 - self.p0).cross(self.p2 - self.p0).length() / 2.0
  }

  /// A triangle is dead when its area is below the pipeline tolerance.
  /// Dead triangles are dropped everywhere; they slow the clipping stage
  /// down without contributing surface.
  pub fn is_dead(&self) -> bool {
    self.area() <= CORE_EPSILON
  }

  /// True when this triangle lies entirely on the backface side of `plane`
  /// (opposite the plane normal), with at least one corner strictly off the
  /// plane. Triangles lying exactly on the plane are not considered behind
  /// it.
  pub fn all_points_in_front_of_plane(&self, plane: &Triangle) -> bool {
    let d0 = (self.p0 - plane.p0).dot(plane.n);
    let d1 = (self.p1 - plane.p0).dot(plane.n);
    let d2 = (self.p2 - plane.p0).dot(plane.n);

    d0 <= CORE_EPSILON
      && d1 <= CORE_EPSILON
      && d2 <= CORE_EPSILON
      && (d0 < -CORE_EPSILON || d1 < -CORE_EPSILON || d2 < -CORE_EPSILON)
  }

  /// True when no corner lies behind `plane` (all on the normal side, within
  /// tolerance).
  pub fn no_point_behind_plane(&self, plane: &Triangle) -> bool {
    let d0 = (self.p0 - plane.p0).dot(plane.n);
    let d1 = (self.p1 - plane.p0).dot(plane.n);
    let d2 = (self.p2 - plane.p0).dot(plane.n);

    d0 >= -CORE_EPSILON && d1 >= -CORE_EPSILON && d2 >= -CORE_EPSILON
  }
}

/// Componentwise near-equality with the pipeline tolerance.
#[inline]
pub fn points_almost_identical(p0: DVec3, p1: DVec3) -> bool {
  (p0.x - p1.x).abs() < CORE_EPSILON
    && (p0.y - p1.y).abs() < CORE_EPSILON
    && (p0.z - p1.z).abs() < CORE_EPSILON
}

// =============================================================================
// Aabb
// =============================================================================

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
  pub min: DVec3,
  pub max: DVec3,
}

impl Aabb {
  /// An inverted box, ready to be grown around points.
  pub fn empty() -> Self {
    Self {
      min: DVec3::splat(f64::INFINITY),
      max: DVec3::splat(f64::NEG_INFINITY),
    }
  }

  pub fn from_center_half_extents(center: DVec3, half_extents: DVec3) -> Self {
    Self {
      min: center - half_extents,
      max: center + half_extents,
    }
  }

  /// Grow to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: DVec3) {
    self.min = self.min.min(point);
    self.max = self.max.max(point);
  }

  /// Grow to include all three corners of a triangle.
  pub fn encapsulate_triangle(&mut self, triangle: &Triangle) {
    self.encapsulate(triangle.p0);
    self.encapsulate(triangle.p1);
    self.encapsulate(triangle.p2);
  }

  #[inline]
  pub fn contains_point(&self, point: DVec3) -> bool {
    point.x >= self.min.x
      && point.x <= self.max.x
      && point.y >= self.min.y
      && point.y <= self.max.y
      && point.z >= self.min.z
      && point.z <= self.max.z
  }

  pub fn contains_aabb(&self, other: &Aabb) -> bool {
    self.contains_point(other.min) && self.contains_point(other.max)
  }

  #[inline]
  pub fn center(&self) -> DVec3 {
    (self.min + self.max) * 0.5
  }

  #[inline]
  pub fn size(&self) -> DVec3 {
    self.max - self.min
  }

  /// Index of the widest axis (0 = x, 1 = y, 2 = z).
  pub fn longest_axis(&self) -> usize {
    let size = self.size();
    if size.x >= size.y && size.x >= size.z {
      0
    } else if size.y >= size.z {
      1
    } else {
      2
    }
  }

  /// Segment-vs-box slab test with the same unnormalised parameterisation as
  /// the ray queries: intersection is reported when some `t` in
  /// `[0, max_t]` lies inside the box.
  pub fn intersects_ray(&self, origin: DVec3, direction: DVec3, max_t: f64) -> bool {
    let mut t_min: f64 = 0.0;
    let mut t_max: f64 = max_t;

    for axis in 0..3 {
      let o = origin[axis];
      let d = direction[axis];

      if d.abs() < CORE_SMALL_EPSILON {
        // Ray parallel to the slab: either always inside or never.
        if o < self.min[axis] || o > self.max[axis] {
          return false;
        }
      } else {
        let inv = 1.0 / d;
        let mut t0 = (self.min[axis] - o) * inv;
        let mut t1 = (self.max[axis] - o) * inv;
        if t0 > t1 {
          std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
          return false;
        }
      }
    }

    true
  }
}

impl Default for Aabb {
  fn default() -> Self {
    Self::empty()
  }
}

// =============================================================================
// Ray queries
// =============================================================================

/// Double-sided Möller-Trumbore ray/triangle intersection.
///
/// No backface rejection. Returns the unnormalised parameter `t` (which may
/// be negative); the caller decides which range is acceptable.
pub fn ray_double_sided_triangle_intersection(
  origin: DVec3,
  direction: DVec3,
  a: DVec3,
  b: DVec3,
  c: DVec3,
) -> Option<f64> {
  let e0 = b - a;
  let e1 = c - a;

  let p = direction.cross(e1);
  let determinant = e0.dot(p);
  if determinant.abs() < CORE_SMALL_EPSILON {
    return None;
  }

  let inv_determinant = 1.0 / determinant;
  let s = origin - a;
  let u = s.dot(p) * inv_determinant;
  if u < -CORE_SMALL_EPSILON || u > 1.0 + CORE_SMALL_EPSILON {
    return None;
  }

  let q = s.cross(e0);
  let v = direction.dot(q) * inv_determinant;
  if v < -CORE_SMALL_EPSILON || u + v > 1.0 + CORE_SMALL_EPSILON {
    return None;
  }

  Some(e1.dot(q) * inv_determinant)
}

/// Double-sided ray/plane intersection against the plane through `p` with
/// normal `n`. Reports no hit when the ray runs parallel to the plane.
pub fn ray_double_sided_plane_intersection(
  origin: DVec3,
  direction: DVec3,
  p: DVec3,
  n: DVec3,
) -> Option<f64> {
  let denominator = direction.dot(n);
  if denominator.abs() < CORE_EPSILON {
    return None;
  }

  Some((p - origin).dot(n) / denominator)
}

/// Barycentric coefficients of `point` with respect to the triangle
/// `(a, b, c)`. Returns `(u, v, w)` such that `point ≈ u*a + v*b + w*c`.
pub fn calculate_barycentric_coefficients(
  a: DVec3,
  b: DVec3,
  c: DVec3,
  point: DVec3,
) -> (f64, f64, f64) {
  let v0 = b - a;
  let v1 = c - a;
  let v2 = point - a;

  let d00 = v0.dot(v0);
  let d01 = v0.dot(v1);
  let d11 = v1.dot(v1);
  let d20 = v2.dot(v0);
  let d21 = v2.dot(v1);

  let denominator = d00 * d11 - d01 * d01;
  if denominator.abs() < CORE_SMALL_EPSILON {
    return (1.0, 0.0, 0.0);
  }

  let v = (d11 * d20 - d01 * d21) / denominator;
  let w = (d00 * d21 - d01 * d20) / denominator;
  (1.0 - v - w, v, w)
}

/// 2D point-in-triangle via barycentric sign comparison. A point sitting on
/// an edge (within tolerance) counts as inside.
pub fn point_inside_triangle_2d(point: DVec2, p0: DVec2, p1: DVec2, p2: DVec2) -> bool {
  #[inline]
  fn sign(p0: DVec2, p1: DVec2, p2: DVec2) -> f64 {
    (p0.x - p2.x) * (p1.y - p2.y) - (p1.x - p2.x) * (p0.y - p2.y)
  }

  let d0 = sign(point, p0, p1);
  let d1 = sign(point, p1, p2);
  let d2 = sign(point, p2, p0);

  let negative = d0 < -CORE_SMALL_EPSILON || d1 < -CORE_SMALL_EPSILON || d2 < -CORE_SMALL_EPSILON;
  let positive = d0 > CORE_SMALL_EPSILON || d1 > CORE_SMALL_EPSILON || d2 > CORE_SMALL_EPSILON;

  !(negative && positive)
}

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;
