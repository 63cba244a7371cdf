//! A triangulated plane: a finite rectangle of coplanar triangles sharing
//! one normal. Delimiter faces and the world's root clipping surfaces are
//! built from these; the clipping stage then tessellates and drops triangles
//! freely while the shared normal stays fixed.

use glam::DVec3;

use crate::geom::Triangle;

#[derive(Clone, Debug, Default)]
pub struct TriangulatedPlane {
  /// Unit normal shared by every triangle of this plane.
  pub n: DVec3,
  pub triangles: Vec<Triangle>,
}

impl TriangulatedPlane {
  /// Build the rectangle spanned by four signed extent vectors around
  /// `center`. Consumers rely on this exact winding of the two triangles.
  pub fn new(
    center: DVec3,
    n: DVec3,
    left: DVec3,
    right: DVec3,
    top: DVec3,
    bottom: DVec3,
  ) -> Self {
    let p0 = center + left + top;
    let p1 = center + left + bottom;
    let p2 = center + right + top;
    let p3 = center + right + bottom;

    Self {
      n,
      triangles: vec![
        Triangle::with_normal(p0, p3, p1, n),
        Triangle::with_normal(p0, p2, p3, n),
      ],
    }
  }

  /// Sum of the areas of all triangles currently on the plane.
  pub fn total_area(&self) -> f64 {
    self.triangles.iter().map(Triangle::area).sum()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rectangle_has_two_triangles_with_shared_normal() {
    let plane = TriangulatedPlane::new(
      DVec3::ZERO,
      DVec3::Z,
      DVec3::new(-2.0, 0.0, 0.0),
      DVec3::new(2.0, 0.0, 0.0),
      DVec3::new(0.0, 1.0, 0.0),
      DVec3::new(0.0, -1.0, 0.0),
    );

    assert_eq!(plane.triangles.len(), 2);
    for t in &plane.triangles {
      assert_eq!(t.n, DVec3::Z);
    }
    // 4 x 2 rectangle.
    assert!((plane.total_area() - 8.0).abs() < 1e-12);

    // Exact corner placement of the first triangle: left+top, right+bottom,
    // left+bottom.
    let t = &plane.triangles[0];
    assert_eq!(t.p0, DVec3::new(-2.0, 1.0, 0.0));
    assert_eq!(t.p1, DVec3::new(2.0, -1.0, 0.0));
    assert_eq!(t.p2, DVec3::new(-2.0, -1.0, 0.0));

    let t = &plane.triangles[1];
    assert_eq!(t.p0, DVec3::new(-2.0, 1.0, 0.0));
    assert_eq!(t.p1, DVec3::new(2.0, 1.0, 0.0));
    assert_eq!(t.p2, DVec3::new(2.0, -1.0, 0.0));
  }
}
