//! Persistent vortex identities across time steps.
//!
//! [`VortexTransition`] folds each step's lines and the [`TimeRelation`] to the
//! previous step into long-lived [`VortexObject`]s. Every object runs a small
//! state machine:
//!
//! ```text
//! Born ──continuation──▶ Live ──continuation──▶ Live
//!   │                      │
//!   └──death / merge / split / recombination──▶ Dead | Merged | Split  (terminal)
//! ```
//!
//! A split closes the parent and gives birth to one child per line at the
//! next step; a merge closes every parent and gives birth to a single child.
//! In a recombination every parent is closed as `Merged` and every line at the
//! next step becomes a child of all of them.

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::debug_invariants::DebugInvariants;
use crate::trace::line::VortexLine;
use crate::trace::time::{EventKind, TimeRelation};
use crate::vortex_error::VortexError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VortexState {
    Born,
    Live,
    Merged,
    Split,
    Dead,
}

impl VortexState {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            VortexState::Merged | VortexState::Split | VortexState::Dead
        )
    }

    /// State of an object on the `t` side of `event`, or `None` when the
    /// event is not allowed from this state.
    pub fn after(self, event: EventKind) -> Option<VortexState> {
        if self.is_terminal() {
            return None;
        }
        match event {
            EventKind::Continuation => Some(VortexState::Live),
            EventKind::Death => Some(VortexState::Dead),
            EventKind::Split => Some(VortexState::Split),
            EventKind::Merge | EventKind::Recombination => Some(VortexState::Merged),
            // births have no `t` side
            EventKind::Birth => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VortexState::Born => "born",
            VortexState::Live => "live",
            VortexState::Merged => "merged",
            VortexState::Split => "split",
            VortexState::Dead => "dead",
        }
    }
}

impl fmt::Display for VortexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VortexObject {
    id: usize,
    state: VortexState,
    birth: i32,
    end: Option<i32>,
    parents: Vec<usize>,
    children: Vec<usize>,
    lines: BTreeMap<i32, Vec<VortexLine>>,
}

impl VortexObject {
    fn born(id: usize, timestep: i32, line: VortexLine, parents: Vec<usize>) -> Self {
        Self {
            id,
            state: VortexState::Born,
            birth: timestep,
            end: None,
            parents,
            children: Vec::new(),
            lines: BTreeMap::from([(timestep, vec![line])]),
        }
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn state(&self) -> VortexState {
        self.state
    }

    /// Step the object first appeared in.
    #[inline]
    pub fn birth(&self) -> i32 {
        self.birth
    }

    /// Last step the object existed in, once it is closed.
    #[inline]
    pub fn end(&self) -> Option<i32> {
        self.end
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.state.is_terminal()
    }

    pub fn parents(&self) -> &[usize] {
        &self.parents
    }

    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Lines per step, ascending.
    pub fn lines(&self) -> &BTreeMap<i32, Vec<VortexLine>> {
        &self.lines
    }

    pub fn lines_at(&self, timestep: i32) -> &[VortexLine] {
        self.lines.get(&timestep).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of steps the object has lines in.
    pub fn lifetime(&self) -> usize {
        self.lines.len()
    }
}

/// One lifecycle event. `parents` are the objects on the `t` side, `children`
/// the objects on the `t + 1` side; a continuation lists the same object on
/// both.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VortexEvent {
    pub timestep: i32,
    pub kind: EventKind,
    pub parents: Vec<usize>,
    pub children: Vec<usize>,
}

impl fmt::Display for VortexEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={} {}: [{}] -> [{}]",
            self.timestep,
            self.kind,
            self.parents.iter().join(", "),
            self.children.iter().join(", ")
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VortexTransition {
    objects: Vec<VortexObject>,
    events: Vec<VortexEvent>,
    /// Object of each line of the latest step.
    current: Vec<usize>,
    last_timestep: Option<i32>,
}

impl VortexTransition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the run: every line becomes a born object.
    pub fn add_initial_step(
        &mut self,
        timestep: i32,
        lines: Vec<VortexLine>,
    ) -> Result<(), VortexError> {
        let relation = TimeRelation::births(lines.len());
        self.add_step(timestep, lines, &relation)
    }

    /// Fold in the lines of `timestep`, related to the latest step by
    /// `relation`.
    ///
    /// `relation` must have been built against the latest step's lines (its
    /// `n_prev`) and `lines` (its `n_next`); steps must strictly increase.
    /// On error nothing is modified.
    pub fn add_step(
        &mut self,
        timestep: i32,
        lines: Vec<VortexLine>,
        relation: &TimeRelation,
    ) -> Result<(), VortexError> {
        if let Some(last) = self.last_timestep {
            if timestep <= last {
                return Err(VortexError::StepOrder {
                    last,
                    found: timestep,
                });
            }
        }
        if relation.n_prev() != self.current.len() {
            return Err(VortexError::RelationMismatch {
                timestep: self.last_timestep.unwrap_or(timestep),
                expected: relation.n_prev(),
                found: self.current.len(),
            });
        }
        if relation.n_next() != lines.len() {
            return Err(VortexError::RelationMismatch {
                timestep,
                expected: relation.n_next(),
                found: lines.len(),
            });
        }
        self.check_correspondences(timestep, relation)?;
        // check every `t` side transition before touching anything
        for c in relation.correspondences() {
            for &p in &c.prev {
                let id = self.current[p];
                let state = self.object(id)?.state;
                if state.after(c.kind).is_none() {
                    return Err(VortexError::IllegalTransition {
                        object: id,
                        from: state.as_str(),
                        event: c.kind.as_str(),
                    });
                }
            }
        }

        let last = self.last_timestep;
        let mut slots: Vec<Option<VortexLine>> = lines.into_iter().map(Some).collect();
        let mut next_current = vec![usize::MAX; slots.len()];

        for c in relation.correspondences() {
            let parents: Vec<usize> = c.prev.iter().map(|&p| self.current[p]).collect();
            let children: Vec<usize> = if c.kind == EventKind::Continuation {
                let id = parents[0];
                let line = slots[c.next[0]].take().unwrap_or_default();
                let obj = &mut self.objects[id];
                obj.state = VortexState::Live;
                obj.lines.entry(timestep).or_default().push(line);
                next_current[c.next[0]] = id;
                vec![id]
            } else {
                for &id in &parents {
                    let obj = &mut self.objects[id];
                    // legality was checked above
                    obj.state = obj.state.after(c.kind).unwrap_or(VortexState::Dead);
                    obj.end = last;
                }
                c.next
                    .iter()
                    .map(|&n| {
                        let id = self.objects.len();
                        let line = slots[n].take().unwrap_or_default();
                        self.objects
                            .push(VortexObject::born(id, timestep, line, parents.clone()));
                        next_current[n] = id;
                        id
                    })
                    .collect()
            };
            if c.kind != EventKind::Continuation {
                for &id in &parents {
                    self.objects[id].children.extend_from_slice(&children);
                }
            }
            let event = VortexEvent {
                timestep,
                kind: c.kind,
                parents,
                children,
            };
            log::debug!("{event}");
            self.events.push(event);
        }

        self.current = next_current;
        self.last_timestep = Some(timestep);
        self.debug_assert_invariants();
        Ok(())
    }

    /// Every line of both steps in at most one correspondence, and each kind
    /// matching its line counts. Relations read back from storage are not
    /// trusted to come from [`TimeRelation::from_candidates`].
    fn check_correspondences(
        &self,
        timestep: i32,
        relation: &TimeRelation,
    ) -> Result<(), VortexError> {
        let malformed = |reason: String| VortexError::MalformedRelation { timestep, reason };
        let mut seen_prev = vec![false; relation.n_prev()];
        let mut seen_next = vec![false; relation.n_next()];
        for c in relation.correspondences() {
            if EventKind::classify(c.prev.len(), c.next.len()) != Some(c.kind) {
                return Err(malformed(format!(
                    "{} with {} -> {} lines",
                    c.kind,
                    c.prev.len(),
                    c.next.len()
                )));
            }
            for (side, indices, seen) in [
                ("previous", &c.prev, &mut seen_prev),
                ("next", &c.next, &mut seen_next),
            ] {
                let len = seen.len();
                for &i in indices {
                    match seen.get_mut(i) {
                        None => {
                            return Err(malformed(format!(
                                "{side} line {i} out of range ({len} lines)"
                            )));
                        }
                        Some(true) => {
                            return Err(malformed(format!("{side} line {i} used twice")));
                        }
                        Some(s) => *s = true,
                    }
                }
            }
        }
        Ok(())
    }

    pub fn objects(&self) -> &[VortexObject] {
        &self.objects
    }

    pub fn object(&self, id: usize) -> Result<&VortexObject, VortexError> {
        self.objects.get(id).ok_or(VortexError::UnknownObject(id))
    }

    /// Objects not yet closed, ascending by id.
    pub fn live_objects(&self) -> impl Iterator<Item = &VortexObject> + '_ {
        self.objects.iter().filter(|o| o.is_alive())
    }

    /// Object of each line of the latest step.
    pub fn current(&self) -> &[usize] {
        &self.current
    }

    #[inline]
    pub fn last_timestep(&self) -> Option<i32> {
        self.last_timestep
    }

    /// All events in the order they happened.
    pub fn events(&self) -> &[VortexEvent] {
        &self.events
    }
}

impl fmt::Display for VortexTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "{event}")?;
        }
        Ok(())
    }
}

impl DebugInvariants for VortexTransition {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "VortexTransition");
    }

    fn validate_invariants(&self) -> Result<(), VortexError> {
        for (i, obj) in self.objects.iter().enumerate() {
            if obj.id != i {
                return Err(VortexError::UnknownObject(obj.id));
            }
            if let Some(&bad) = obj
                .parents
                .iter()
                .chain(&obj.children)
                .find(|&&j| j >= self.objects.len())
            {
                return Err(VortexError::UnknownObject(bad));
            }
            // terminal iff closed at some step
            if obj.state.is_terminal() != obj.end.is_some() {
                return Err(VortexError::IllegalTransition {
                    object: obj.id,
                    from: obj.state.as_str(),
                    event: "close",
                });
            }
        }
        for &id in &self.current {
            let obj = self.object(id)?;
            if !obj.is_alive() {
                return Err(VortexError::IllegalTransition {
                    object: id,
                    from: obj.state.as_str(),
                    event: EventKind::Continuation.as_str(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelateConfig;
    use crate::mesh::ids::ElemId;
    use crate::trace::time::{Candidate, Correspondence, relate};

    fn line_at(x: f64) -> VortexLine {
        VortexLine {
            chirality: 1,
            points: vec![[x, 0.0, 0.0], [x, 0.0, 1.0]],
            elems: vec![ElemId::new(0)],
            closed: false,
        }
    }

    fn lines(xs: &[f64]) -> Vec<VortexLine> {
        xs.iter().copied().map(line_at).collect()
    }

    fn step(tr: &mut VortexTransition, t: i32, prev: &[f64], next: &[f64], d: f64) {
        let cfg = RelateConfig {
            distance_threshold: d,
        };
        let rel = relate(&lines(prev), &lines(next), &cfg);
        tr.add_step(t, lines(next), &rel).unwrap();
    }

    #[test]
    fn continuing_vortex_keeps_its_identity() {
        let mut tr = VortexTransition::new();
        tr.add_initial_step(0, lines(&[0.0])).unwrap();
        step(&mut tr, 1, &[0.0], &[0.2], 0.5);
        step(&mut tr, 2, &[0.2], &[0.4], 0.5);
        assert_eq!(tr.objects().len(), 1);
        let obj = tr.object(0).unwrap();
        assert_eq!(obj.state(), VortexState::Live);
        assert_eq!(obj.birth(), 0);
        assert_eq!(obj.end(), None);
        assert_eq!(obj.lifetime(), 3);
        assert_eq!(obj.lines_at(2)[0].points[0][0], 0.4);
        assert_eq!(tr.current(), &[0]);
    }

    #[test]
    fn jump_beyond_threshold_is_death_and_birth() {
        let mut tr = VortexTransition::new();
        tr.add_initial_step(3, lines(&[0.0])).unwrap();
        step(&mut tr, 4, &[0.0], &[5.0], 0.5);
        assert_eq!(tr.objects().len(), 2);
        assert_eq!(tr.object(0).unwrap().state(), VortexState::Dead);
        assert_eq!(tr.object(0).unwrap().end(), Some(3));
        assert_eq!(tr.object(1).unwrap().state(), VortexState::Born);
        assert_eq!(tr.object(1).unwrap().birth(), 4);
        let kinds: Vec<_> = tr.events().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::Birth, EventKind::Death, EventKind::Birth]
        );
    }

    #[test]
    fn split_then_merge() {
        let mut tr = VortexTransition::new();
        tr.add_initial_step(0, lines(&[0.0])).unwrap();
        step(&mut tr, 1, &[0.0], &[-0.3, 0.3], 0.5);
        assert_eq!(tr.object(0).unwrap().state(), VortexState::Split);
        assert_eq!(tr.object(0).unwrap().children(), &[1, 2]);
        assert_eq!(tr.object(2).unwrap().parents(), &[0]);

        step(&mut tr, 2, &[-0.3, 0.3], &[0.0], 0.5);
        assert_eq!(tr.object(1).unwrap().state(), VortexState::Merged);
        assert_eq!(tr.object(2).unwrap().state(), VortexState::Merged);
        let child = tr.object(3).unwrap();
        assert_eq!(child.parents(), &[1, 2]);
        let live: Vec<usize> = tr.live_objects().map(VortexObject::id).collect();
        assert_eq!(live, vec![3]);

        let printed = tr.to_string();
        assert_eq!(
            printed,
            "t=0 birth: [] -> [0]\n\
             t=1 split: [0] -> [1, 2]\n\
             t=2 merge: [1, 2] -> [3]\n"
        );
        tr.validate_invariants().unwrap();
    }

    #[test]
    fn recombination_links_every_parent_to_every_child() {
        let mut tr = VortexTransition::new();
        tr.add_initial_step(0, lines(&[0.0, 0.8])).unwrap();
        step(&mut tr, 1, &[0.0, 0.8], &[0.4, 1.2], 0.45);
        assert_eq!(tr.events().last().unwrap().kind, EventKind::Recombination);
        for id in [0, 1] {
            let obj = tr.object(id).unwrap();
            assert_eq!(obj.state(), VortexState::Merged);
            assert_eq!(obj.children(), &[2, 3]);
        }
        assert_eq!(tr.object(3).unwrap().parents(), &[0, 1]);
    }

    #[test]
    fn mismatched_relation_is_rejected_untouched() {
        let mut tr = VortexTransition::new();
        tr.add_initial_step(0, lines(&[0.0])).unwrap();
        let before = tr.clone();
        let rel = TimeRelation::from_candidates(2, 1, vec![]);
        assert!(matches!(
            tr.add_step(1, lines(&[0.0]), &rel),
            Err(VortexError::RelationMismatch { expected: 2, found: 1, .. })
        ));
        let rel = TimeRelation::from_candidates(
            1,
            1,
            vec![Candidate {
                prev: 0,
                next: 0,
                distance: 0.0,
            }],
        );
        assert!(matches!(
            tr.add_step(1, lines(&[0.0, 1.0]), &rel),
            Err(VortexError::RelationMismatch { expected: 1, found: 2, .. })
        ));
        assert!(matches!(
            tr.add_step(0, lines(&[0.0]), &rel),
            Err(VortexError::StepOrder { last: 0, found: 0 })
        ));
        assert_eq!(tr, before);
    }

    #[test]
    fn stored_relation_with_bad_indices_is_rejected_untouched() {
        let mut tr = VortexTransition::new();
        tr.add_initial_step(0, lines(&[0.0])).unwrap();
        let before = tr.clone();
        let stored = |comps: Vec<Correspondence>| -> TimeRelation {
            let json = serde_json::json!({
                "n_prev": 1,
                "n_next": 1,
                "candidates": [],
                "correspondences": comps,
            });
            serde_json::from_value(json).unwrap()
        };
        let comp = |kind, prev: &[usize], next: &[usize]| Correspondence {
            kind,
            prev: prev.to_vec(),
            next: next.to_vec(),
        };
        for bad in [
            vec![comp(EventKind::Continuation, &[3], &[0])],
            vec![comp(EventKind::Continuation, &[0], &[5])],
            vec![comp(EventKind::Continuation, &[], &[0])],
            vec![
                comp(EventKind::Death, &[0], &[]),
                comp(EventKind::Birth, &[], &[0]),
                comp(EventKind::Birth, &[], &[0]),
            ],
        ] {
            assert!(matches!(
                tr.add_step(1, lines(&[0.0]), &stored(bad)),
                Err(VortexError::MalformedRelation { timestep: 1, .. })
            ));
        }
        assert_eq!(tr, before);
    }

    #[test]
    fn terminal_states_admit_nothing() {
        for s in [VortexState::Dead, VortexState::Merged, VortexState::Split] {
            assert!(s.is_terminal());
            assert_eq!(s.after(EventKind::Continuation), None);
        }
        assert_eq!(
            VortexState::Born.after(EventKind::Continuation),
            Some(VortexState::Live)
        );
        assert_eq!(VortexState::Live.after(EventKind::Birth), None);
        assert!(matches!(
            VortexTransition::new().object(7),
            Err(VortexError::UnknownObject(7))
        ));
    }

    #[test]
    fn transition_roundtrips_through_json() {
        let mut tr = VortexTransition::new();
        tr.add_initial_step(0, lines(&[0.0, 3.0])).unwrap();
        step(&mut tr, 1, &[0.0, 3.0], &[0.1], 0.5);
        let json = serde_json::to_string(&tr).unwrap();
        let back: VortexTransition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tr);
    }
}
