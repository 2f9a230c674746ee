#![allow(dead_code)]
use vortex_sieve::mesh::InMemoryMesh;
use vortex_sieve::mesh::meshgen::{StructuredCellType, structured_box_3d};

/// Unit box with a straight `+1` vortex along z through `(x0, y0)` loaded at `timestep`.
pub fn vortex_box(
    cell_type: StructuredCellType,
    n: usize,
    (x0, y0): (f64, f64),
    timestep: i32,
) -> InMemoryMesh {
    let mut mesh = structured_box_3d(n, n, n, [0.0; 3], [1.0; 3], cell_type).unwrap();
    mesh.load_timestep_with(timestep, straight_vortex(x0, y0));
    mesh
}

/// `u + iv = (x - x0) + i(y - y0)`: winds once counterclockwise around +z.
pub fn straight_vortex(x0: f64, y0: f64) -> impl Fn([f64; 3]) -> (f64, f64) {
    move |x| (x[0] - x0, x[1] - y0)
}

/// Largest distance of any point from the vertical axis through `(x0, y0)`.
pub fn max_axis_offset(points: &[[f64; 3]], (x0, y0): (f64, f64)) -> f64 {
    points
        .iter()
        .map(|p| ((p[0] - x0).powi(2) + (p[1] - y0).powi(2)).sqrt())
        .fold(0.0, f64::max)
}
