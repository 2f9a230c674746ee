//! Spatial tracing of vortex filaments within one time step.
//!
//! With outward-oriented sides, a filament crossing the side shared by two
//! elements has chirality `+n` in one of them (the *exit*, seen along the
//! traversal direction `n`) and `-n` in the other (the *entry*). A trace
//! starts at some element, walks forward exit → neighbor → exit, then walks
//! backward entry → neighbor → entry from the start, and joins both halves
//! into one [`VortexLine`].
//!
//! The walk is an explicit loop over a visited set of element sides, so long
//! filaments do not grow the stack and a filament closing on itself ends
//! where it began. Every punctured side is visited at most once per tracer,
//! which bounds the whole pass by the number of punctured sides. A boundary
//! side, or a neighbor with no punctured side, ends a walk.

use hashbrown::HashSet;
use itertools::Itertools;

use crate::extract::index::PuncturedIndex;
use crate::mesh::FaceAdjacency;
use crate::mesh::ids::{ElemId, FaceKey};
use crate::trace::line::VortexLine;

/// Traces filaments over one step's punctured-element index.
///
/// The visited set is shared by every call on the same tracer: after
/// `trace(n)` the sides of chirality `±n` are consumed. Use a fresh tracer to
/// trace the same sides again in the opposite direction.
pub struct SpaceTracer<'a, A: FaceAdjacency + ?Sized> {
    index: &'a PuncturedIndex,
    adjacency: &'a A,
    visited: HashSet<FaceKey>,
}

impl<'a, A: FaceAdjacency + ?Sized> SpaceTracer<'a, A> {
    pub fn new(index: &'a PuncturedIndex, adjacency: &'a A) -> Self {
        Self {
            index,
            adjacency,
            visited: HashSet::with_capacity(index.n_punctured_faces()),
        }
    }

    #[inline]
    pub fn is_visited(&self, key: FaceKey) -> bool {
        self.visited.contains(&key)
    }

    /// Element sides consumed so far.
    pub fn visited(&self) -> &HashSet<FaceKey> {
        &self.visited
    }

    /// Assemble every filament of chirality `direction` not yet traced.
    ///
    /// Seeds are taken in ascending side order, so the output is
    /// deterministic for a given index.
    pub fn trace(&mut self, direction: i32) -> Vec<VortexLine> {
        if direction == 0 {
            log::warn!("trace requested with direction 0; nothing to follow");
            return Vec::new();
        }
        let want = direction.abs();
        let seeds: Vec<FaceKey> = self
            .index
            .iter()
            .flat_map(|pe| {
                pe.punctured_faces()
                    .filter(move |&f| pe.chirality(f).is_some_and(|c| c.abs() == want))
                    .map(move |f| FaceKey::new(pe.elem(), f))
            })
            .collect();

        let mut lines = Vec::new();
        for seed in seeds {
            if self.visited.contains(&seed) {
                continue;
            }
            let line = self.trace_from(seed.elem, direction);
            log::trace!(
                "traced line from {seed}: {} elems, {} points, closed={}",
                line.len(),
                line.points.len(),
                line.closed
            );
            lines.push(line);
        }
        lines
    }

    /// Trace every chirality magnitude present in the index, smallest first.
    pub fn trace_all(&mut self) -> Vec<VortexLine> {
        let magnitudes: Vec<i32> = self
            .index
            .chiralities()
            .into_iter()
            .map(i32::abs)
            .sorted_unstable()
            .dedup()
            .collect();
        magnitudes.into_iter().flat_map(|n| self.trace(n)).collect()
    }

    fn first_unvisited(&self, elem: ElemId, chirality: i32) -> Option<usize> {
        let pe = self.index.get(elem)?;
        pe.faces_with_chirality(chirality)
            .find(|&f| !self.visited.contains(&FaceKey::new(elem, f)))
    }

    fn trace_from(&mut self, start: ElemId, direction: i32) -> VortexLine {
        let mut elems = vec![start];
        let mut points = Vec::new();
        let mut closed = false;

        // forward: leave through exits
        let mut cursor = self.first_unvisited(start, direction).map(|f| (start, f));
        while let Some((elem, exit)) = cursor.take() {
            self.visited.insert(FaceKey::new(elem, exit));
            if let Some(p) = self.index.get(elem).and_then(|pe| pe.point(exit)) {
                points.push(p);
            }
            let Some((next, entry)) = self.index.across(self.adjacency, elem, exit) else {
                break;
            };
            let next_elem = next.elem();
            if next.chirality(entry) != Some(-direction)
                || !self.visited.insert(FaceKey::new(next_elem, entry))
            {
                break;
            }
            match self.first_unvisited(next_elem, direction) {
                Some(f) => {
                    elems.push(next_elem);
                    cursor = Some((next_elem, f));
                }
                None if next_elem == start => closed = true,
                None => elems.push(next_elem),
            }
        }

        if closed {
            return VortexLine {
                chirality: direction,
                points,
                elems,
                closed,
            };
        }

        // backward: arrive through entries
        let mut back_elems = Vec::new();
        let mut back_points = Vec::new();
        let mut current = start;
        while let Some(entry) = self.first_unvisited(current, -direction) {
            self.visited.insert(FaceKey::new(current, entry));
            if let Some(p) = self.index.get(current).and_then(|pe| pe.point(entry)) {
                back_points.push(p);
            }
            let Some((prev, exit)) = self.index.across(self.adjacency, current, entry) else {
                break;
            };
            let prev_elem = prev.elem();
            if prev.chirality(exit) != Some(direction)
                || !self.visited.insert(FaceKey::new(prev_elem, exit))
            {
                break;
            }
            back_elems.push(prev_elem);
            current = prev_elem;
        }

        back_elems.reverse();
        back_elems.extend(elems);
        back_points.reverse();
        back_points.extend(points);
        VortexLine {
            chirality: direction,
            points: back_points,
            elems: back_elems,
            closed,
        }
    }
}

/// Trace all filaments of one step.
pub fn trace_over_space<A: FaceAdjacency + ?Sized>(
    index: &PuncturedIndex,
    adjacency: &A,
) -> Vec<VortexLine> {
    SpaceTracer::new(index, adjacency).trace_all()
}
