//! Geometry/field access for the extraction core.
//!
//! The core never owns a mesh. It reads one through two capability traits:
//!
//! - [`FaceAdjacency`]: element-to-element neighbor lookup across a side,
//!   which is all the space tracer needs;
//! - [`FieldMesh`]: per-face vertex positions and `(u, v)` samples for the
//!   loaded time step, plus element/face counts for the local partition.
//!
//! Whether the provider is partitioned, in memory, or backed by persisted
//! storage is invisible to the algorithms. A missing neighbor (mesh boundary
//! or an unloaded partition) is reported as `None`, never as an error.

pub mod cell;
pub mod ids;
pub mod in_memory;
pub mod meshgen;

use serde::{Deserialize, Serialize};

use crate::mesh::ids::ElemId;
use crate::vortex_error::VortexError;

pub use cell::ElemKind;
pub use in_memory::InMemoryMesh;

/// Field value and position at one face vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSample {
    pub pos: [f64; 3],
    pub u: f64,
    pub v: f64,
}

impl FieldSample {
    #[inline]
    pub fn new(pos: [f64; 3], u: f64, v: f64) -> Self {
        Self { pos, u, v }
    }

    /// Build a sample from polar form `rho * e^{i phi}`.
    #[inline]
    pub fn from_polar(pos: [f64; 3], rho: f64, phi: f64) -> Self {
        Self {
            pos,
            u: rho * phi.cos(),
            v: rho * phi.sin(),
        }
    }

    #[inline]
    pub fn magnitude(&self) -> f64 {
        self.u.hypot(self.v)
    }

    #[inline]
    pub fn phase(&self) -> f64 {
        self.v.atan2(self.u)
    }
}

/// Vertex samples of one face, ordered along the face boundary in the owning
/// element's outward orientation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceSamples {
    vertices: Vec<FieldSample>,
}

impl FaceSamples {
    /// Wrap the samples of a face. A face needs at least three vertices.
    pub fn new(vertices: Vec<FieldSample>) -> Option<Self> {
        (vertices.len() >= 3).then_some(Self { vertices })
    }

    pub fn triangle(a: FieldSample, b: FieldSample, c: FieldSample) -> Self {
        Self {
            vertices: vec![a, b, c],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn vertices(&self) -> &[FieldSample] {
        &self.vertices
    }

    #[inline]
    pub fn vertices_mut(&mut self) -> &mut [FieldSample] {
        &mut self.vertices
    }
}

/// Neighbor lookup across element sides.
pub trait FaceAdjacency {
    /// The element on the other side of `face` of `elem`, together with the
    /// local index of the shared side in that element. `None` at a boundary.
    fn neighbor(&self, elem: ElemId, face: usize) -> Option<(ElemId, usize)>;
}

/// Read access to a mesh and the field loaded for one time step.
pub trait FieldMesh: FaceAdjacency {
    /// The time step whose field values are currently loaded.
    fn timestep(&self) -> i32;

    /// Total number of elements in the local partition.
    fn n_elems(&self) -> usize;

    /// Locally owned elements, in ascending id order.
    fn local_elems<'a>(&'a self) -> Box<dyn Iterator<Item = ElemId> + 'a>;

    /// Number of sides of `elem`.
    fn n_faces(&self, elem: ElemId) -> Result<usize, VortexError>;

    /// Positions and field samples of the vertices of one side.
    fn face_samples(&self, elem: ElemId, face: usize) -> Result<FaceSamples, VortexError>;

    /// Total number of element sides in the local partition.
    fn n_element_faces(&self) -> Result<usize, VortexError> {
        self.local_elems().map(|e| self.n_faces(e)).sum()
    }
}

impl<T: FaceAdjacency + ?Sized> FaceAdjacency for &T {
    fn neighbor(&self, elem: ElemId, face: usize) -> Option<(ElemId, usize)> {
        (**self).neighbor(elem, face)
    }
}
