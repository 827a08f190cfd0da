use nalgebra::{Point3, Vector3};

/// Midpoint of a segment
#[inline]
pub fn middle_of_two(a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
    (a + b) / 2.0
}

/// Barycenter of a triangle
#[inline]
pub fn middle_of_three(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> Vector3<f64> {
    (a + b + c) / 3.0
}

/// Triangle area from three points
#[inline]
pub fn triangle_area(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    (b - a).cross(&(c - a)).norm() / 2.0
}

/// Unit normal of triangle `v0 v1 v2`, flipped so that `reference` lies on its positive side.
pub fn oriented_unit_normal(
    v0: &Vector3<f64>,
    v1: &Vector3<f64>,
    v2: &Vector3<f64>,
    reference: &Vector3<f64>,
) -> Vector3<f64> {
    let n = (v1 - v0).cross(&(v2 - v0));
    let length = n.norm();
    if n.dot(&(reference - v0)) < 0.0 {
        n / -length
    } else {
        n / length
    }
}

/// Radially project `p` onto the sphere if it lies strictly inside it.
///
/// Returns `None` when `p` is on or outside the sphere, or sits exactly at its center.
pub fn push_out_of_sphere(p: &Point3<f64>, center: &Point3<f64>, radius: f64) -> Option<Point3<f64>> {
    let offset = p - center;
    let dist_squared = offset.norm_squared();
    if dist_squared < radius * radius && dist_squared > 0.0 {
        Some(center + offset * (radius / dist_squared.sqrt()))
    } else {
        None
    }
}
