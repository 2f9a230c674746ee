//! Zero location inside a punctured face.
//!
//! Both field components are interpolated linearly over a triangle, so their
//! zero-level sets are two lines in the barycentric parameter plane and the
//! singular point is the intersection, found in closed form. Polygonal faces
//! are fan-triangulated from vertex 0.

use crate::geometry::metrics::{add, scale, sub};
use crate::mesh::{FaceSamples, FieldSample};

/// Slack on the barycentric bounds, so zeros on a shared edge are found from
/// either triangle.
const BARY_TOL: f64 = 1e-9;

/// Relative size below which the 2×2 system is treated as singular.
const SINGULAR_TOL: f64 = 1e-14;

/// Locate the common zero of the linear interpolants of `u` and `v` on the
/// triangle `(a, b, c)`.
///
/// Returns `None` when the system is singular or the zero lies outside the
/// triangle.
pub fn find_zero_triangle(a: &FieldSample, b: &FieldSample, c: &FieldSample) -> Option<[f64; 3]> {
    let (du1, du2) = (b.u - a.u, c.u - a.u);
    let (dv1, dv2) = (b.v - a.v, c.v - a.v);
    let det = du1 * dv2 - du2 * dv1;
    let scale_sq = [du1, du2, dv1, dv2]
        .iter()
        .fold(0.0f64, |m, x| m.max(x.abs()))
        .powi(2);
    if !det.is_finite() || scale_sq == 0.0 || det.abs() <= SINGULAR_TOL * scale_sq {
        return None;
    }

    // Cramer's rule on [du1 du2; dv1 dv2] (s, t) = -(u0, v0)
    let s = (a.v * du2 - a.u * dv2) / det;
    let t = (a.u * dv1 - a.v * du1) / det;
    if s < -BARY_TOL || t < -BARY_TOL || s + t > 1.0 + BARY_TOL {
        return None;
    }

    let e1 = sub(b.pos, a.pos);
    let e2 = sub(c.pos, a.pos);
    Some(add(a.pos, add(scale(e1, s), scale(e2, t))))
}

/// Locate the zero crossing of a face of any vertex count.
pub fn find_zero(face: &FaceSamples) -> Option<[f64; 3]> {
    let v = face.vertices();
    (1..v.len().saturating_sub(1))
        .find_map(|k| find_zero_triangle(&v[0], &v[k], &v[k + 1]))
}
