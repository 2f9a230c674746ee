//! Per-element puncture record.
//!
//! A `PuncturedElem` carries one slot per element side, up to
//! [`MAX_FACES`]. A slot's chirality and zero position are meaningful only
//! when its `valid` flag is set. A punctured side whose zero could not be
//! located is valid with `point == None`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::debug_invariants::DebugInvariants;
use crate::mesh::cell::MAX_FACES;
use crate::mesh::ids::{ElemId, FaceKey};
use crate::vortex_error::VortexError;

/// Puncture state of one element side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FacePuncture {
    pub valid: bool,
    pub chirality: i32,
    pub point: Option<[f64; 3]>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PuncturedElem {
    elem: ElemId,
    n_faces: u8,
    slots: [FacePuncture; MAX_FACES],
}

impl PuncturedElem {
    /// An empty record for an element with `n_faces` sides.
    pub fn new(elem: ElemId, n_faces: usize) -> Result<Self, VortexError> {
        if n_faces == 0 || n_faces > MAX_FACES {
            return Err(VortexError::MalformedFace {
                elem,
                reason: format!("{n_faces} sides, supported range is 1..={MAX_FACES}"),
            });
        }
        Ok(Self {
            elem,
            n_faces: n_faces as u8,
            slots: [FacePuncture::default(); MAX_FACES],
        })
    }

    #[inline]
    pub fn elem(&self) -> ElemId {
        self.elem
    }

    #[inline]
    pub fn n_faces(&self) -> usize {
        self.n_faces as usize
    }

    /// Mark `face` punctured with a nonzero `chirality` and optional zero position.
    pub fn set_punctured(
        &mut self,
        face: usize,
        chirality: i32,
        point: Option<[f64; 3]>,
    ) -> Result<(), VortexError> {
        if face >= self.n_faces() {
            return Err(VortexError::FaceOutOfRange {
                elem: self.elem,
                face,
                n_faces: self.n_faces(),
            });
        }
        debug_assert!(chirality != 0, "a punctured side has nonzero chirality");
        self.slots[face] = FacePuncture {
            valid: true,
            chirality,
            point,
        };
        Ok(())
    }

    /// Slot of `face`, or `None` when out of range.
    #[inline]
    pub fn slot(&self, face: usize) -> Option<&FacePuncture> {
        self.slots[..self.n_faces()].get(face)
    }

    #[inline]
    pub fn is_punctured(&self, face: usize) -> bool {
        self.slot(face).is_some_and(|s| s.valid)
    }

    /// Chirality of a punctured side.
    #[inline]
    pub fn chirality(&self, face: usize) -> Option<i32> {
        self.slot(face).filter(|s| s.valid).map(|s| s.chirality)
    }

    /// Zero position of a punctured side, when it was located.
    #[inline]
    pub fn point(&self, face: usize) -> Option<[f64; 3]> {
        self.slot(face).filter(|s| s.valid).and_then(|s| s.point)
    }

    /// At least one side is punctured.
    pub fn valid(&self) -> bool {
        self.slots[..self.n_faces()].iter().any(|s| s.valid)
    }

    /// Punctured-side bit pattern, bit `f` for side `f`.
    pub fn bits(&self) -> u8 {
        self.slots[..self.n_faces()]
            .iter()
            .enumerate()
            .filter(|(_, s)| s.valid)
            .fold(0u8, |acc, (f, _)| acc | (1 << f))
    }

    /// Local indices of the punctured sides, ascending.
    pub fn punctured_faces(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.n_faces()).filter(move |&f| self.slots[f].valid)
    }

    /// Punctured sides whose chirality equals `chirality`, ascending.
    /// Chirality of each punctured side, in side order.
    pub fn chiralities(&self) -> impl Iterator<Item = i32> + '_ {
        self.punctured_faces().map(move |f| self.slots[f].chirality)
    }

    pub fn faces_with_chirality(&self, chirality: i32) -> impl Iterator<Item = usize> + '_ {
        self.punctured_faces()
            .filter(move |&f| self.slots[f].chirality == chirality)
    }

    pub fn face_keys(&self) -> impl Iterator<Item = FaceKey> + '_ {
        self.punctured_faces()
            .map(move |f| FaceKey::new(self.elem, f))
    }

    /// Net winding through the element's closed surface.
    pub fn chirality_sum(&self) -> i32 {
        self.punctured_faces().map(|f| self.slots[f].chirality).sum()
    }
}

/// Bitset-style rendering, highest side first (`0101` for sides 0 and 2 of a tet).
impl fmt::Display for PuncturedElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for face in (0..self.n_faces()).rev() {
            f.write_str(if self.slots[face].valid { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl DebugInvariants for PuncturedElem {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "PuncturedElem");
    }

    fn validate_invariants(&self) -> Result<(), VortexError> {
        for (face, slot) in self.slots.iter().enumerate() {
            let in_range = face < self.n_faces();
            let ok = match (in_range, slot.valid) {
                (true, true) => slot.chirality != 0,
                (_, false) => slot.chirality == 0 && slot.point.is_none(),
                (false, true) => false,
            };
            if !ok {
                return Err(VortexError::MalformedFace {
                    elem: self.elem,
                    reason: format!("inconsistent puncture slot {face}: {slot:?}"),
                });
            }
        }
        Ok(())
    }
}
