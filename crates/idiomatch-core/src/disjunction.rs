//! # Disjunction
//!
//! Holds when at least one of several alternatives holds. Every alternative
//! is a [`Conjunction`] over the same slots, and the same alternative must
//! accept the values of all slots.
//!
//! Fixing a slot retires every alternative that rejects the value, until that
//! slot is retracted again. A later slot only considers the alternatives
//! still alive, so no binding mixes slots accepted by different alternatives.
//!
//! On an advance request the live alternatives propose in order: the first
//! one is drained before the next is asked, and a node already proposed for
//! the slot is not proposed again.

use crate::atoms::{Backend, SkipResult, Slot};
use crate::{Conjunction, NodeRef};
use std::collections::BTreeSet;

/// Enumeration state of one slot.
#[derive(Debug, Default)]
struct Branching {
    current: usize,
    proposed: BTreeSet<NodeRef>,
}

/// Per-slot disjunction of alternative conjunctions.
#[derive(Debug, Default)]
pub struct Disjunction<'a> {
    alternatives: Vec<Conjunction<'a>>,
    /// Slot whose fixation retired each alternative.
    retired_at: Vec<Option<usize>>,
    slots: Vec<Branching>,
}

impl<'a> Disjunction<'a> {
    /// Disjunction with `count` slots and no alternatives yet.
    #[must_use]
    pub fn with_slots(count: usize) -> Self {
        Self {
            alternatives: Vec::new(),
            retired_at: Vec::new(),
            slots: std::iter::repeat_with(Branching::default).take(count).collect(),
        }
    }

    /// Add an alternative. Earlier alternatives propose first.
    pub fn push(&mut self, alternative: Conjunction<'a>) {
        if self.slots.len() < alternative.slot_count() {
            self.slots.resize_with(alternative.slot_count(), Branching::default);
        }
        self.alternatives.push(alternative);
        self.retired_at.push(None);
    }

    #[must_use]
    pub fn alternative_count(&self) -> usize {
        self.alternatives.len()
    }

    /// Number of alternatives not retired by a fixed slot.
    #[must_use]
    pub fn live_alternatives(&self) -> usize {
        self.retired_at.iter().filter(|retired| retired.is_none()).count()
    }

    fn accepts(&mut self, alternative: usize, slot: Slot, value: NodeRef) -> bool {
        let mut offered = value;
        self.alternatives[alternative].skip_invalid(slot, &mut offered) == SkipResult::Pass
    }

    fn revive(&mut self, slot: Slot) {
        for retired in &mut self.retired_at {
            if *retired == Some(slot.index) {
                *retired = None;
            }
        }
    }
}

impl Backend for Disjunction<'_> {
    fn begin(&mut self, slot: Slot) {
        self.slots[slot.index] = Branching::default();
        for alternative in &mut self.alternatives {
            alternative.begin(slot);
        }
    }

    fn skip_invalid(&mut self, slot: Slot, candidate: &mut NodeRef) -> SkipResult {
        if !candidate.is_unbound() {
            let value = *candidate;
            let held = (0..self.alternatives.len())
                .any(|a| self.retired_at[a].is_none() && self.accepts(a, slot, value));
            return if held { SkipResult::Pass } else { SkipResult::Fail };
        }

        while self.slots[slot.index].current < self.alternatives.len() {
            let alternative = self.slots[slot.index].current;
            if self.retired_at[alternative].is_some() {
                self.slots[slot.index].current += 1;
                continue;
            }
            let mut proposal = NodeRef::UNBOUND;
            let result = self.alternatives[alternative].skip_invalid(slot, &mut proposal);
            if result == SkipResult::Fail || proposal.is_unbound() {
                self.slots[slot.index].current += 1;
                continue;
            }
            if self.slots[slot.index].proposed.insert(proposal) {
                *candidate = proposal;
                return match result {
                    SkipResult::Change => SkipResult::Change,
                    _ => SkipResult::ChangePass,
                };
            }
        }
        SkipResult::Fail
    }

    fn fixate(&mut self, slot: Slot, value: NodeRef) {
        for alternative in 0..self.alternatives.len() {
            if self.retired_at[alternative].is_none() && !self.accepts(alternative, slot, value) {
                self.retired_at[alternative] = Some(slot.index);
            }
            self.alternatives[alternative].fixate(slot, value);
        }
    }

    fn resume(&mut self, slot: Slot) {
        for alternative in &mut self.alternatives {
            alternative.resume(slot);
        }
        self.revive(slot);
    }

    fn cancel(&mut self, slot: Slot) {
        for alternative in &mut self.alternatives {
            alternative.cancel(slot);
        }
        self.revive(slot);
        self.slots[slot.index] = Branching::default();
    }
}
