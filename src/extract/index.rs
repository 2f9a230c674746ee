//! Punctured-element index of one time step.
//!
//! Maps element ids to their [`PuncturedElem`] records. Only records with at
//! least one punctured side are admitted. Iteration is in ascending element
//! order, which keeps everything derived from the index (point cloud, traces)
//! reproducible.

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::debug_invariants::DebugInvariants;
use crate::extract::punctured_elem::PuncturedElem;
use crate::io::point_cloud::PointCloud;
use crate::mesh::FaceAdjacency;
use crate::mesh::ids::{ElemId, FaceKey};
use crate::vortex_error::VortexError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PuncturedIndex {
    timestep: i32,
    elems: BTreeMap<ElemId, PuncturedElem>,
}

impl PuncturedIndex {
    pub fn new(timestep: i32) -> Self {
        Self {
            timestep,
            elems: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn timestep(&self) -> i32 {
        self.timestep
    }

    /// Insert a record; records without a punctured side are discarded.
    ///
    /// Returns whether the record was stored. A later record for the same
    /// element replaces the earlier one.
    pub fn insert(&mut self, record: PuncturedElem) -> bool {
        if !record.valid() {
            return false;
        }
        self.elems.insert(record.elem(), record);
        true
    }

    #[inline]
    pub fn get(&self, elem: ElemId) -> Option<&PuncturedElem> {
        self.elems.get(&elem)
    }

    #[inline]
    pub fn contains(&self, elem: ElemId) -> bool {
        self.elems.contains_key(&elem)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Records in ascending element order.
    pub fn iter(&self) -> impl Iterator<Item = &PuncturedElem> + '_ {
        self.elems.values()
    }

    /// Every punctured side, ascending.
    pub fn face_keys(&self) -> impl Iterator<Item = FaceKey> + '_ {
        self.iter().flat_map(PuncturedElem::face_keys)
    }

    pub fn n_punctured_faces(&self) -> usize {
        self.iter().map(|pe| pe.punctured_faces().count()).sum()
    }

    /// Punctured sides whose zero could not be located.
    pub fn unlocated(&self) -> impl Iterator<Item = FaceKey> + '_ {
        self.face_keys().filter(move |k| {
            self.get(k.elem)
                .is_some_and(|pe| pe.point(k.face()).is_none())
        })
    }

    /// Distinct chirality values present, ascending.
    pub fn chiralities(&self) -> Vec<i32> {
        self.iter()
            .flat_map(PuncturedElem::chiralities)
            .sorted_unstable()
            .dedup()
            .collect()
    }

    /// The record across side `face` of `elem`, with the shared side's local
    /// index in it. `None` at a boundary or when the neighbor is not punctured.
    pub fn across<A: FaceAdjacency + ?Sized>(
        &self,
        adjacency: &A,
        elem: ElemId,
        face: usize,
    ) -> Option<(&PuncturedElem, usize)> {
        let (next, next_face) = adjacency.neighbor(elem, face)?;
        self.get(next).map(|pe| (pe, next_face))
    }

    /// Located zero crossings in element, then side order.
    pub fn point_cloud(&self) -> PointCloud {
        self.iter()
            .flat_map(|pe| pe.punctured_faces().filter_map(move |f| pe.point(f)))
            .collect()
    }
}

impl DebugInvariants for PuncturedIndex {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "PuncturedIndex");
    }

    fn validate_invariants(&self) -> Result<(), VortexError> {
        for (&elem, record) in &self.elems {
            if record.elem() != elem || !record.valid() {
                return Err(VortexError::MalformedFace {
                    elem,
                    reason: "index holds a record without punctured sides or under a foreign key"
                        .into(),
                });
            }
            record.validate_invariants()?;
        }
        Ok(())
    }
}
