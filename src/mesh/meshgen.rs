//! Basic generators for structured box meshes.
//!
//! These are the synthetic meshes the extraction core is exercised on: a box
//! `[min, max]` split into `nx`×`ny`×`nz` cells, each cell either kept as a
//! hexahedron or cut into six tetrahedra around its main diagonal (Kuhn
//! split, conforming across neighboring cells).

use crate::mesh::cell::ElemKind;
use crate::mesh::in_memory::InMemoryMesh;
use crate::vortex_error::VortexError;

/// Cell-type choices for structured meshes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StructuredCellType {
    Tetrahedron,
    Hexahedron,
}

fn invalid_geometry(message: impl Into<String>) -> VortexError {
    VortexError::InvalidGeometry(message.into())
}

// Axis orders of the six monotone paths from the low to the high cell corner.
const KUHN_PATHS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// Generate a structured 3D box mesh over `[min, max]` with `nx`×`ny`×`nz` cells.
pub fn structured_box_3d(
    nx: usize,
    ny: usize,
    nz: usize,
    min: [f64; 3],
    max: [f64; 3],
    cell_type: StructuredCellType,
) -> Result<InMemoryMesh, VortexError> {
    if nx == 0 || ny == 0 || nz == 0 {
        return Err(invalid_geometry("nx, ny, and nz must be positive"));
    }
    if (0..3).any(|d| max[d] <= min[d]) {
        return Err(invalid_geometry("box max must exceed min on every axis"));
    }

    let dx = (max[0] - min[0]) / nx as f64;
    let dy = (max[1] - min[1]) / ny as f64;
    let dz = (max[2] - min[2]) / nz as f64;
    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
    for k in 0..=nz {
        let z = min[2] + dz * k as f64;
        for j in 0..=ny {
            let y = min[1] + dy * j as f64;
            for i in 0..=nx {
                let x = min[0] + dx * i as f64;
                vertices.push([x, y, z]);
            }
        }
    }

    let row_stride = nx + 1;
    let slab_stride = row_stride * (ny + 1);
    let strides = [1, row_stride, slab_stride];
    let per_cell = match cell_type {
        StructuredCellType::Tetrahedron => 6,
        StructuredCellType::Hexahedron => 1,
    };
    let mut cells = Vec::with_capacity(nx * ny * nz * per_cell);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let base = k * slab_stride + j * row_stride + i;
                match cell_type {
                    StructuredCellType::Hexahedron => {
                        let v0 = base;
                        let v1 = base + 1;
                        let v3 = base + row_stride;
                        let v2 = v3 + 1;
                        let v4 = base + slab_stride;
                        let v5 = v4 + 1;
                        let v7 = v4 + row_stride;
                        let v6 = v7 + 1;
                        cells.push(vec![v0, v1, v2, v3, v4, v5, v6, v7]);
                    }
                    StructuredCellType::Tetrahedron => {
                        // walk from the low corner to the high corner one axis at a time
                        for path in KUHN_PATHS {
                            let mut tet = Vec::with_capacity(4);
                            let mut v = base;
                            tet.push(v);
                            for axis in path {
                                v += strides[axis];
                                tet.push(v);
                            }
                            cells.push(tet);
                        }
                    }
                }
            }
        }
    }

    let kind = match cell_type {
        StructuredCellType::Tetrahedron => ElemKind::Tetrahedron,
        StructuredCellType::Hexahedron => ElemKind::Hexahedron,
    };
    InMemoryMesh::new(kind, vertices, &cells)
}
