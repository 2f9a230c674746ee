//! Correspondence of vortex lines between two consecutive time steps.
//!
//! Two lines are *candidates* when their closest located crossings are within
//! [`RelateConfig::distance_threshold`] (inclusive). The candidate pairs form a
//! bipartite graph between the lines of step `t` and step `t + 1`; each
//! connected component of that graph is one [`Correspondence`], classified by
//! how many lines it holds on either side. Every line of both steps lands in
//! exactly one correspondence.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::RelateConfig;
use crate::trace::line::VortexLine;

/// Lifecycle event a correspondence stands for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    Birth,
    Death,
    Continuation,
    Split,
    Merge,
    Recombination,
}

impl EventKind {
    /// Classify a component with `n_prev` lines at `t` and `n_next` at `t + 1`.
    pub fn classify(n_prev: usize, n_next: usize) -> Option<EventKind> {
        match (n_prev, n_next) {
            (0, 0) => None,
            (0, _) => Some(EventKind::Birth),
            (_, 0) => Some(EventKind::Death),
            (1, 1) => Some(EventKind::Continuation),
            (1, _) => Some(EventKind::Split),
            (_, 1) => Some(EventKind::Merge),
            _ => Some(EventKind::Recombination),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Birth => "birth",
            EventKind::Death => "death",
            EventKind::Continuation => "continuation",
            EventKind::Split => "split",
            EventKind::Merge => "merge",
            EventKind::Recombination => "recombination",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate pair: line `prev` at `t` and line `next` at `t + 1`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub prev: usize,
    pub next: usize,
    pub distance: f64,
}

/// One connected component of the candidate graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correspondence {
    pub kind: EventKind,
    /// Line indices at `t`, ascending.
    pub prev: Vec<usize>,
    /// Line indices at `t + 1`, ascending.
    pub next: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeRelation {
    n_prev: usize,
    n_next: usize,
    candidates: Vec<Candidate>,
    correspondences: Vec<Correspondence>,
}

impl TimeRelation {
    /// Build a relation from explicit candidate pairs.
    ///
    /// Pairs referring to lines outside `0..n_prev` / `0..n_next` are ignored
    /// with a warning. Correspondences are ordered by their smallest `t` line;
    /// births follow, ordered by their `t + 1` line.
    pub fn from_candidates(n_prev: usize, n_next: usize, candidates: Vec<Candidate>) -> Self {
        let mut candidates: Vec<Candidate> = candidates
            .into_iter()
            .filter(|c| {
                let ok = c.prev < n_prev && c.next < n_next;
                if !ok {
                    log::warn!(
                        "dropping candidate {} -> {} outside {n_prev} x {n_next} lines",
                        c.prev,
                        c.next
                    );
                }
                ok
            })
            .collect();
        candidates.sort_by_key(|c| (c.prev, c.next));
        candidates.dedup_by_key(|c| (c.prev, c.next));

        // bipartite graph: prev lines are nodes 0..n_prev, next lines follow
        let n = n_prev + n_next;
        let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
        for c in &candidates {
            adj[c.prev].push(n_prev + c.next);
            adj[n_prev + c.next].push(c.prev);
        }

        let mut seen = vec![false; n];
        let mut correspondences = Vec::new();
        let mut q: VecDeque<usize> = VecDeque::new();
        for root in 0..n {
            if seen[root] {
                continue;
            }
            seen[root] = true;
            q.push_back(root);
            let mut prev = Vec::new();
            let mut next = Vec::new();
            while let Some(i) = q.pop_front() {
                if i < n_prev {
                    prev.push(i);
                } else {
                    next.push(i - n_prev);
                }
                for &j in &adj[i] {
                    if !seen[j] {
                        seen[j] = true;
                        q.push_back(j);
                    }
                }
            }
            prev.sort_unstable();
            next.sort_unstable();
            if let Some(kind) = EventKind::classify(prev.len(), next.len()) {
                correspondences.push(Correspondence { kind, prev, next });
            }
        }

        Self {
            n_prev,
            n_next,
            candidates,
            correspondences,
        }
    }

    /// Every line at `t + 1` is born; there is nothing before it.
    pub fn births(n_next: usize) -> Self {
        Self::from_candidates(0, n_next, Vec::new())
    }

    #[inline]
    pub fn n_prev(&self) -> usize {
        self.n_prev
    }

    #[inline]
    pub fn n_next(&self) -> usize {
        self.n_next
    }

    /// Candidate pairs ordered by `(prev, next)`.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn correspondences(&self) -> &[Correspondence] {
        &self.correspondences
    }

    /// Closest candidate at `t + 1` for line `prev`, lowest index on ties.
    pub fn nearest_next(&self, prev: usize) -> Option<(usize, f64)> {
        self.candidates
            .iter()
            .filter(|c| c.prev == prev)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .map(|c| (c.next, c.distance))
    }

    /// Closest candidate at `t` for line `next`, lowest index on ties.
    pub fn nearest_prev(&self, next: usize) -> Option<(usize, f64)> {
        self.candidates
            .iter()
            .filter(|c| c.next == next)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .map(|c| (c.prev, c.distance))
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.correspondences
            .iter()
            .filter(|c| c.kind == kind)
            .count()
    }
}

fn candidates_of(
    i: usize,
    line: &VortexLine,
    next: &[VortexLine],
    threshold: f64,
) -> Vec<Candidate> {
    next.iter()
        .enumerate()
        .filter_map(|(j, other)| {
            let distance = line.min_distance(other);
            (distance <= threshold).then_some(Candidate {
                prev: i,
                next: j,
                distance,
            })
        })
        .collect()
}

/// Relate the lines of step `t` to those of step `t + 1`.
///
/// With the `rayon` feature the pairwise distance search runs on the thread
/// pool; the result does not depend on it.
pub fn relate(prev: &[VortexLine], next: &[VortexLine], config: &RelateConfig) -> TimeRelation {
    let threshold = config.distance_threshold;

    #[cfg(feature = "rayon")]
    let per_line: Vec<Vec<Candidate>> = {
        use rayon::prelude::*;
        prev.par_iter()
            .enumerate()
            .map(|(i, line)| candidates_of(i, line, next, threshold))
            .collect()
    };
    #[cfg(not(feature = "rayon"))]
    let per_line: Vec<Vec<Candidate>> = prev
        .iter()
        .enumerate()
        .map(|(i, line)| candidates_of(i, line, next, threshold))
        .collect();

    let relation = TimeRelation::from_candidates(
        prev.len(),
        next.len(),
        per_line.into_iter().flatten().collect(),
    );
    log::debug!(
        "related {} -> {} lines: {} candidates, {} correspondences",
        prev.len(),
        next.len(),
        relation.candidates().len(),
        relation.correspondences().len()
    );
    relation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::ids::ElemId;

    fn line_at(x: f64) -> VortexLine {
        VortexLine {
            chirality: 1,
            points: vec![[x, 0.0, 0.0], [x, 0.0, 1.0]],
            elems: vec![ElemId::new(0), ElemId::new(1)],
            closed: false,
        }
    }

    fn cfg(d: f64) -> RelateConfig {
        RelateConfig {
            distance_threshold: d,
        }
    }

    #[test]
    fn classification_table() {
        assert_eq!(EventKind::classify(0, 0), None);
        assert_eq!(EventKind::classify(1, 1), Some(EventKind::Continuation));
        assert_eq!(EventKind::classify(1, 0), Some(EventKind::Death));
        assert_eq!(EventKind::classify(0, 1), Some(EventKind::Birth));
        assert_eq!(EventKind::classify(1, 3), Some(EventKind::Split));
        assert_eq!(EventKind::classify(2, 1), Some(EventKind::Merge));
        assert_eq!(EventKind::classify(2, 2), Some(EventKind::Recombination));
    }

    #[test]
    fn small_displacement_continues() {
        let rel = relate(&[line_at(0.0)], &[line_at(0.3)], &cfg(0.5));
        assert_eq!(rel.correspondences().len(), 1);
        assert_eq!(rel.correspondences()[0].kind, EventKind::Continuation);
        let (j, d) = rel.nearest_next(0).unwrap();
        assert_eq!(j, 0);
        assert!((d - 0.3).abs() < 1e-12);
    }

    #[test]
    fn large_displacement_is_death_then_birth() {
        let rel = relate(&[line_at(0.0)], &[line_at(2.0)], &cfg(0.5));
        let kinds: Vec<_> = rel.correspondences().iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![EventKind::Death, EventKind::Birth]);
        assert!(rel.candidates().is_empty());
        assert_eq!(rel.nearest_next(0), None);
    }

    #[test]
    fn threshold_is_inclusive() {
        let rel = relate(&[line_at(0.0)], &[line_at(0.5)], &cfg(0.5));
        assert_eq!(rel.count(EventKind::Continuation), 1);
    }

    #[test]
    fn split_merge_and_recombination() {
        let split = relate(&[line_at(0.0)], &[line_at(-0.2), line_at(0.2)], &cfg(0.5));
        assert_eq!(
            split.correspondences(),
            &[Correspondence {
                kind: EventKind::Split,
                prev: vec![0],
                next: vec![0, 1],
            }]
        );

        let merge = relate(&[line_at(-0.2), line_at(0.2)], &[line_at(0.0)], &cfg(0.5));
        assert_eq!(merge.count(EventKind::Merge), 1);
        assert_eq!(merge.nearest_prev(0).map(|(i, _)| i), Some(0));

        // a chain 0-0-1-1 is one component with two lines on each side
        let recomb = relate(
            &[line_at(0.0), line_at(0.8)],
            &[line_at(0.4), line_at(1.2)],
            &cfg(0.45),
        );
        assert_eq!(recomb.correspondences().len(), 1);
        assert_eq!(recomb.correspondences()[0].kind, EventKind::Recombination);
    }

    #[test]
    fn lines_without_points_never_match() {
        let rel = relate(&[VortexLine::default()], &[line_at(0.0)], &cfg(f64::MAX));
        assert_eq!(rel.count(EventKind::Death), 1);
        assert_eq!(rel.count(EventKind::Birth), 1);
    }

    #[test]
    fn every_line_lands_in_one_correspondence() {
        let prev: Vec<_> = [0.0, 0.1, 5.0, 9.0].into_iter().map(line_at).collect();
        let next: Vec<_> = [0.05, 5.2, 5.3, 20.0].into_iter().map(line_at).collect();
        let rel = relate(&prev, &next, &cfg(0.5));
        let comps = rel.correspondences();
        let mut p: Vec<usize> = comps.iter().flat_map(|c| c.prev.clone()).collect();
        let mut n: Vec<usize> = comps.iter().flat_map(|c| c.next.clone()).collect();
        p.sort_unstable();
        n.sort_unstable();
        assert_eq!(p, vec![0, 1, 2, 3]);
        assert_eq!(n, vec![0, 1, 2, 3]);
        let kinds: Vec<_> = rel.correspondences().iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Merge,
                EventKind::Split,
                EventKind::Death,
                EventKind::Birth
            ]
        );
    }

    #[test]
    fn out_of_range_candidates_are_dropped() {
        let rel = TimeRelation::from_candidates(
            1,
            1,
            vec![
                Candidate {
                    prev: 0,
                    next: 3,
                    distance: 0.0,
                },
                Candidate {
                    prev: 0,
                    next: 0,
                    distance: 0.1,
                },
            ],
        );
        assert_eq!(rel.candidates().len(), 1);
        assert_eq!(rel.count(EventKind::Continuation), 1);
    }

    #[test]
    fn relation_serializes() {
        let rel = relate(&[line_at(0.0)], &[line_at(0.1)], &cfg(1.0));
        let json = serde_json::to_string(&rel).unwrap();
        let back: TimeRelation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rel);
    }
}
