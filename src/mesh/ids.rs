//! `ElemId` and `FaceKey`: stable, zero-cost handles for mesh elements and sides
//!
//! The extraction and tracing passes key every record by element identity.
//! Instead of borrowing element objects from the mesh provider, an element is
//! named by a dense integer id (its index in the provider's element array), so
//! the punctured-element index has no lifetime coupling to the mesh.
//!
//! This module provides:
//! - A transparent `ElemId` newtype around `u32`.
//! - `FaceKey`, the identity of one element side: `(element, local face)`.
//! - Implementations of common traits (`Debug`, `Display`, ordering,
//!   hashing) so both can be used in maps, sets, and printed easily.

use std::fmt;

/// Dense element identifier.
///
/// # Memory layout
/// This type is `repr(transparent)`, meaning it has the same ABI and
/// alignment as its single field (`u32`).
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct ElemId(u32);

impl ElemId {
    /// Creates an `ElemId` from a raw index.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use vortex_sieve::mesh::ids::ElemId;
    /// let e = ElemId::new(3);
    /// assert_eq!(e.index(), 3);
    /// ```
    #[inline]
    pub const fn new(raw: u32) -> Self {
        ElemId(raw)
    }

    /// Returns the raw `u32` value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the id as an index into the provider's element array.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<usize> for ElemId {
    type Error = std::num::TryFromIntError;

    fn try_from(idx: usize) -> Result<Self, Self::Error> {
        u32::try_from(idx).map(ElemId)
    }
}

/// Custom `Debug` implementation to display as `ElemId(raw_value)`.
impl fmt::Debug for ElemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ElemId").field(&self.get()).finish()
    }
}

/// Prints only the raw integer.
impl fmt::Display for ElemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Identity of one element side.
///
/// Orders by element first, then local face, which is the order every pass
/// in this crate visits faces in.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct FaceKey {
    pub elem: ElemId,
    pub face: u8,
}

impl FaceKey {
    #[inline]
    pub fn new(elem: ElemId, face: usize) -> Self {
        debug_assert!(face <= u8::MAX as usize);
        FaceKey {
            elem,
            face: face as u8,
        }
    }

    #[inline]
    pub fn face(self) -> usize {
        self.face as usize
    }
}

impl fmt::Display for FaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.elem, self.face)
    }
}
