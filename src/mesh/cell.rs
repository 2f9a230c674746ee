//! Element kinds and their outward-oriented local face tables.
//!
//! Reference vertex ordering follows the usual finite-element convention:
//! - Tetrahedron: `[v0, v1, v2, v3]`, right-handed (`v1-v0, v2-v0, v3-v0`).
//! - Hexahedron: `[v0 .. v7]`, bottom quad `v0 v1 v2 v3` counter-clockwise
//!   seen from above, top quad `v4 .. v7` stacked on it.
//!
//! For a positively oriented element every face in the tables below is
//! listed counter-clockwise when seen from outside, so a winding computed
//! along a face boundary is signed with respect to the outward normal. Two
//! elements sharing a side traverse it in opposite directions, which is what
//! makes the chirality of a vortex crossing `+n` on one side and `-n` on the
//! other.

use serde::{Deserialize, Serialize};

use crate::geometry::metrics::signed_volume;

/// Largest face count of any supported element.
pub const MAX_FACES: usize = 6;

/// Supported element shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElemKind {
    Tetrahedron,
    Hexahedron,
}

const TET_FACE_0: [usize; 3] = [1, 2, 3];
const TET_FACE_1: [usize; 3] = [0, 3, 2];
const TET_FACE_2: [usize; 3] = [0, 1, 3];
const TET_FACE_3: [usize; 3] = [0, 2, 1];
const HEX_FACE_0: [usize; 4] = [0, 3, 2, 1];
const HEX_FACE_1: [usize; 4] = [4, 5, 6, 7];
const HEX_FACE_2: [usize; 4] = [0, 1, 5, 4];
const HEX_FACE_3: [usize; 4] = [1, 2, 6, 5];
const HEX_FACE_4: [usize; 4] = [2, 3, 7, 6];
const HEX_FACE_5: [usize; 4] = [3, 0, 4, 7];

const TET_FACES: [&[usize]; 4] = [&TET_FACE_0, &TET_FACE_1, &TET_FACE_2, &TET_FACE_3];
const HEX_FACES: [&[usize]; 6] = [
    &HEX_FACE_0,
    &HEX_FACE_1,
    &HEX_FACE_2,
    &HEX_FACE_3,
    &HEX_FACE_4,
    &HEX_FACE_5,
];

// Vertex permutations that mirror an element, turning a left-handed
// connectivity into a right-handed one.
const TET_MIRROR: [usize; 4] = [0, 2, 1, 3];
const HEX_MIRROR: [usize; 8] = [0, 3, 2, 1, 4, 7, 6, 5];

impl ElemKind {
    #[inline]
    pub const fn n_vertices(self) -> usize {
        match self {
            ElemKind::Tetrahedron => 4,
            ElemKind::Hexahedron => 8,
        }
    }

    #[inline]
    pub const fn n_faces(self) -> usize {
        match self {
            ElemKind::Tetrahedron => 4,
            ElemKind::Hexahedron => 6,
        }
    }

    /// Local vertex indices of every face, outward counter-clockwise.
    #[inline]
    pub fn faces(self) -> &'static [&'static [usize]] {
        match self {
            ElemKind::Tetrahedron => &TET_FACES,
            ElemKind::Hexahedron => &HEX_FACES,
        }
    }

    /// Orientation measure: positive for a right-handed element.
    ///
    /// For hexahedra this is the volume of the corner tetrahedron at `v0`,
    /// which has the sign of the whole cell for any non-inverted hex.
    pub fn orientation(self, x: &[[f64; 3]]) -> f64 {
        match self {
            ElemKind::Tetrahedron => signed_volume(x[0], x[1], x[2], x[3]),
            ElemKind::Hexahedron => signed_volume(x[0], x[1], x[3], x[4]),
        }
    }

    /// Permutation that mirrors the element's vertex ordering.
    pub(crate) fn mirror(self) -> &'static [usize] {
        match self {
            ElemKind::Tetrahedron => &TET_MIRROR,
            ElemKind::Hexahedron => &HEX_MIRROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::metrics::{centroid, dot, polygon_normal, sub};

    fn unit_tet() -> Vec<[f64; 3]> {
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ]
    }

    fn unit_hex() -> Vec<[f64; 3]> {
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ]
    }

    fn assert_outward(kind: ElemKind, x: &[[f64; 3]]) {
        let c = centroid(x).unwrap();
        for face in kind.faces() {
            let pts: Vec<[f64; 3]> = face.iter().map(|&i| x[i]).collect();
            let n = polygon_normal(&pts);
            let fc = centroid(&pts).unwrap();
            let outward = dot(n, sub(fc, c));
            assert!(outward > 0.0, "{kind:?} face {face:?} points inward");
        }
    }

    #[test]
    fn faces_point_outward() {
        assert_outward(ElemKind::Tetrahedron, &unit_tet());
        assert_outward(ElemKind::Hexahedron, &unit_hex());
    }

    #[test]
    fn every_vertex_is_used_by_the_face_table() {
        for kind in [ElemKind::Tetrahedron, ElemKind::Hexahedron] {
            assert_eq!(kind.faces().len(), kind.n_faces());
            assert!(kind.n_faces() <= MAX_FACES);
            let mut used = vec![false; kind.n_vertices()];
            for face in kind.faces() {
                for &v in face.iter() {
                    used[v] = true;
                }
            }
            assert!(used.into_iter().all(|u| u));
        }
    }

    #[test]
    fn mirror_flips_orientation() {
        for (kind, x) in [
            (ElemKind::Tetrahedron, unit_tet()),
            (ElemKind::Hexahedron, unit_hex()),
        ] {
            assert!(kind.orientation(&x) > 0.0);
            let mirrored: Vec<[f64; 3]> = kind.mirror().iter().map(|&i| x[i]).collect();
            assert!(kind.orientation(&mirrored) < 0.0);
        }
    }
}
