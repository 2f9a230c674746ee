//! A traced vortex filament within one time step.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::geometry::metrics::{centroid, distance};
use crate::mesh::ids::ElemId;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VortexLine {
    /// Chirality the line was traced with.
    pub chirality: i32,
    /// Zero crossings in traversal order; crossings that were not located are skipped.
    pub points: Vec<[f64; 3]>,
    /// Elements in traversal order.
    pub elems: Vec<ElemId>,
    /// The trace returned to its starting side.
    pub closed: bool,
}

impl VortexLine {
    /// Number of elements traversed.
    #[inline]
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Polyline length through the located crossings (closing segment included
    /// for cyclic lines).
    pub fn arc_length(&self) -> f64 {
        let open: f64 = self
            .points
            .iter()
            .tuple_windows()
            .map(|(&a, &b)| distance(a, b))
            .sum();
        match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(&first), Some(&last)) if self.points.len() > 2 => {
                open + distance(last, first)
            }
            _ => open,
        }
    }

    pub fn centroid(&self) -> Option<[f64; 3]> {
        centroid(&self.points)
    }

    /// Smallest point-to-point distance to `other`; infinite when either line
    /// has no located crossing.
    pub fn min_distance(&self, other: &VortexLine) -> f64 {
        self.points
            .iter()
            .cartesian_product(other.points.iter())
            .map(|(&a, &b)| distance(a, b))
            .fold(f64::INFINITY, f64::min)
    }
}
