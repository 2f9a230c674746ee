//! In-memory mesh provider with a single loaded field snapshot.
//!
//! `InMemoryMesh` stores node coordinates, fixed-kind element connectivity,
//! the derived element-to-element face adjacency, and the `(u, v)` nodal values
//! of the currently loaded time step. Adjacency is derived once at
//! construction by matching the sorted vertex sets of element sides: the first
//! element to present a side owns it, the second becomes its neighbor.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::geometry::metrics::EPS;
use crate::mesh::cell::ElemKind;
use crate::mesh::ids::ElemId;
use crate::mesh::{FaceAdjacency, FaceSamples, FieldMesh, FieldSample};
use crate::vortex_error::VortexError;

/// Sorted vertex set of a side, padded with `usize::MAX` for triangles.
type SideKey = [usize; 4];

fn side_key(face: &[usize], conn: &[usize]) -> SideKey {
    let mut key = [usize::MAX; 4];
    for (slot, &local) in key.iter_mut().zip(face) {
        *slot = conn[local];
    }
    key.sort_unstable();
    key
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InMemoryMesh {
    kind: ElemKind,
    nodes: Vec<[f64; 3]>,
    /// Flat connectivity, `kind.n_vertices()` entries per element.
    conn: Vec<usize>,
    /// Flat neighbor table, `kind.n_faces()` entries per element.
    neighbors: Vec<Option<(ElemId, u8)>>,
    timestep: i32,
    u: Vec<f64>,
    v: Vec<f64>,
}

impl InMemoryMesh {
    /// Build a mesh from node coordinates and per-element node lists.
    ///
    /// Left-handed elements are mirrored so every face table is outward.
    /// Degenerate (zero-volume) elements, out-of-range node indices and sides
    /// shared by more than two elements are rejected.
    pub fn new(
        kind: ElemKind,
        nodes: Vec<[f64; 3]>,
        elems: &[Vec<usize>],
    ) -> Result<Self, VortexError> {
        let nv = kind.n_vertices();
        let nf = kind.n_faces();
        if u32::try_from(elems.len()).is_err() {
            return Err(VortexError::InvalidGeometry(format!(
                "{} elements exceed the element id range",
                elems.len()
            )));
        }

        let mut conn = Vec::with_capacity(elems.len() * nv);
        let mut mirrored = 0usize;
        for (e, verts) in elems.iter().enumerate() {
            if verts.len() != nv {
                return Err(VortexError::InvalidGeometry(format!(
                    "element {e}: expected {nv} vertices for {kind:?}, got {}",
                    verts.len()
                )));
            }
            if let Some(&bad) = verts.iter().find(|&&n| n >= nodes.len()) {
                return Err(VortexError::InvalidGeometry(format!(
                    "element {e} references missing node {bad}"
                )));
            }
            let x: Vec<[f64; 3]> = verts.iter().map(|&n| nodes[n]).collect();
            let orient = kind.orientation(&x);
            if orient.abs() < EPS {
                return Err(VortexError::InvalidGeometry(format!(
                    "element {e} is degenerate"
                )));
            }
            if orient < 0.0 {
                mirrored += 1;
                conn.extend(kind.mirror().iter().map(|&i| verts[i]));
            } else {
                conn.extend_from_slice(verts);
            }
        }
        if mirrored > 0 {
            log::debug!("reoriented {mirrored} left-handed {kind:?} elements");
        }

        let n_elems = elems.len();
        let mut neighbors = vec![None; n_elems * nf];
        let mut first_owner: HashMap<SideKey, (usize, usize)> =
            HashMap::with_capacity(n_elems * nf);
        for e in 0..n_elems {
            let c = &conn[e * nv..(e + 1) * nv];
            for (f, face) in kind.faces().iter().enumerate() {
                let key = side_key(face, c);
                match first_owner.get(&key).copied() {
                    Some((oe, of)) => {
                        if neighbors[oe * nf + of].is_some() {
                            return Err(VortexError::InvalidGeometry(format!(
                                "side {key:?} is shared by more than two elements"
                            )));
                        }
                        neighbors[oe * nf + of] = Some((ElemId::new(e as u32), f as u8));
                        neighbors[e * nf + f] = Some((ElemId::new(oe as u32), of as u8));
                    }
                    None => {
                        first_owner.insert(key, (e, f));
                    }
                }
            }
        }

        Ok(Self {
            kind,
            nodes,
            conn,
            neighbors,
            timestep: -1,
            u: Vec::new(),
            v: Vec::new(),
        })
    }

    #[inline]
    pub fn kind(&self) -> ElemKind {
        self.kind
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn nodes(&self) -> &[[f64; 3]] {
        &self.nodes
    }

    /// Node indices of `elem` after reorientation.
    pub fn elem_nodes(&self, elem: ElemId) -> Result<&[usize], VortexError> {
        let nv = self.kind.n_vertices();
        let e = elem.index();
        if e >= self.n_elems() {
            return Err(VortexError::MissingElement(elem));
        }
        Ok(&self.conn[e * nv..(e + 1) * nv])
    }

    /// Install the nodal field of one time step.
    pub fn load_timestep(
        &mut self,
        timestep: i32,
        u: Vec<f64>,
        v: Vec<f64>,
    ) -> Result<(), VortexError> {
        for found in [u.len(), v.len()] {
            if found != self.nodes.len() {
                return Err(VortexError::FieldLength {
                    expected: self.nodes.len(),
                    found,
                });
            }
        }
        self.timestep = timestep;
        self.u = u;
        self.v = v;
        Ok(())
    }

    /// Install a field sampled from a closure of the node position.
    pub fn load_timestep_with<F>(&mut self, timestep: i32, field: F)
    where
        F: Fn([f64; 3]) -> (f64, f64),
    {
        let (u, v) = self.nodes.iter().map(|&x| field(x)).unzip();
        self.timestep = timestep;
        self.u = u;
        self.v = v;
    }

    fn check_face(&self, elem: ElemId, face: usize) -> Result<(), VortexError> {
        if elem.index() >= self.n_elems() {
            return Err(VortexError::MissingElement(elem));
        }
        let n_faces = self.kind.n_faces();
        if face >= n_faces {
            return Err(VortexError::FaceOutOfRange {
                elem,
                face,
                n_faces,
            });
        }
        Ok(())
    }
}

impl FaceAdjacency for InMemoryMesh {
    fn neighbor(&self, elem: ElemId, face: usize) -> Option<(ElemId, usize)> {
        let nf = self.kind.n_faces();
        if face >= nf {
            return None;
        }
        self.neighbors
            .get(elem.index() * nf + face)
            .copied()
            .flatten()
            .map(|(e, f)| (e, f as usize))
    }
}

impl FieldMesh for InMemoryMesh {
    fn timestep(&self) -> i32 {
        self.timestep
    }

    fn n_elems(&self) -> usize {
        self.conn.len() / self.kind.n_vertices()
    }

    fn local_elems<'a>(&'a self) -> Box<dyn Iterator<Item = ElemId> + 'a> {
        Box::new((0..self.n_elems() as u32).map(ElemId::new))
    }

    fn n_faces(&self, elem: ElemId) -> Result<usize, VortexError> {
        if elem.index() >= self.n_elems() {
            return Err(VortexError::MissingElement(elem));
        }
        Ok(self.kind.n_faces())
    }

    fn face_samples(&self, elem: ElemId, face: usize) -> Result<FaceSamples, VortexError> {
        self.check_face(elem, face)?;
        if self.u.len() != self.nodes.len() {
            return Err(VortexError::FieldLength {
                expected: self.nodes.len(),
                found: self.u.len(),
            });
        }
        let conn = self.elem_nodes(elem)?;
        let vertices = self.kind.faces()[face]
            .iter()
            .map(|&local| {
                let n = conn[local];
                FieldSample::new(self.nodes[n], self.u[n], self.v[n])
            })
            .collect();
        FaceSamples::new(vertices).ok_or_else(|| VortexError::MalformedFace {
            elem,
            reason: "fewer than three vertices".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two tetrahedra glued on the triangle (1, 2, 3); the second is given
    /// left-handed on purpose.
    fn two_tets() -> InMemoryMesh {
        let nodes = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
        ];
        InMemoryMesh::new(
            ElemKind::Tetrahedron,
            nodes,
            &[vec![0, 1, 2, 3], vec![2, 1, 3, 4]],
        )
        .unwrap()
    }

    #[test]
    fn shared_side_links_both_ways() {
        let mesh = two_tets();
        let e0 = ElemId::new(0);
        let e1 = ElemId::new(1);
        // face 0 of e0 is (1, 2, 3)
        let (n, nf) = mesh.neighbor(e0, 0).unwrap();
        assert_eq!(n, e1);
        assert_eq!(mesh.neighbor(e1, nf), Some((e0, 0)));
        for f in 1..4 {
            assert_eq!(mesh.neighbor(e0, f), None);
        }
        assert_eq!(mesh.neighbor(e0, 9), None);
    }

    #[test]
    fn left_handed_elements_are_mirrored() {
        let mesh = two_tets();
        for e in mesh.local_elems() {
            let x: Vec<[f64; 3]> = mesh
                .elem_nodes(e)
                .unwrap()
                .iter()
                .map(|&n| mesh.nodes()[n])
                .collect();
            assert!(mesh.kind().orientation(&x) > 0.0);
        }
    }

    #[test]
    fn shared_side_is_traversed_in_opposite_directions() {
        let mut mesh = two_tets();
        mesh.load_timestep_with(0, |x| (x[0], x[1]));
        let e0 = ElemId::new(0);
        let (e1, f1) = mesh.neighbor(e0, 0).unwrap();
        let corners = |e: ElemId, f: usize| -> Vec<[f64; 3]> {
            let face = mesh.face_samples(e, f).unwrap();
            face.vertices().iter().map(|s| s.pos).collect()
        };
        let a = corners(e0, 0);
        let mut b = corners(e1, f1);
        b.reverse();
        // same cycle, reversed: rotate b until it lines up with a
        let start = b.iter().position(|p| *p == a[0]).unwrap();
        b.rotate_left(start);
        assert_eq!(a, b);
    }

    #[test]
    fn field_must_be_loaded_before_sampling() {
        let mut mesh = two_tets();
        let err = mesh.face_samples(ElemId::new(0), 0).unwrap_err();
        assert_eq!(
            err,
            VortexError::FieldLength {
                expected: 5,
                found: 0,
            }
        );
        let short = vec![0.0; 4];
        let err = mesh.load_timestep(3, short, vec![0.0; 5]).unwrap_err();
        assert_eq!(
            err,
            VortexError::FieldLength {
                expected: 5,
                found: 4,
            }
        );
        mesh.load_timestep(3, vec![0.0; 5], vec![1.0; 5]).unwrap();
        assert_eq!(mesh.timestep(), 3);
        assert_eq!(mesh.face_samples(ElemId::new(0), 0).unwrap().len(), 3);
    }

    #[test]
    fn out_of_range_access_is_an_error() {
        let mut mesh = two_tets();
        mesh.load_timestep_with(0, |_| (1.0, 0.0));
        assert_eq!(
            mesh.face_samples(ElemId::new(7), 0).unwrap_err(),
            VortexError::MissingElement(ElemId::new(7))
        );
        assert!(matches!(
            mesh.face_samples(ElemId::new(0), 4).unwrap_err(),
            VortexError::FaceOutOfRange { face: 4, n_faces: 4, .. }
        ));
        assert_eq!(mesh.n_element_faces().unwrap(), 8);
    }

    #[test]
    fn rejects_bad_connectivity() {
        let tet = |nodes: Vec<[f64; 3]>, conn: Vec<usize>| {
            InMemoryMesh::new(ElemKind::Tetrahedron, nodes, &[conn])
        };
        let nodes = vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        assert!(tet(nodes.clone(), vec![0, 1, 2]).is_err());
        assert!(tet(nodes.clone(), vec![0, 1, 2, 9]).is_err());
        let flat = vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]];
        assert!(tet(flat, vec![0, 1, 2, 3]).is_err());
    }
}
