//! # Conjunction
//!
//! Combines the constituent atoms of each slot into one atom. A candidate is
//! valid when every constituent accepts it.
//!
//! The first constituent of a slot leads: on an advance request it proposes
//! candidates, and the remaining constituents check each proposal. A proposal
//! rejected by a checker makes the lead move on rather than failing the slot,
//! so the slot enumerates exactly the candidates all constituents accept, in
//! the lead's order.
//!
//! A concrete candidate is shown to every constituent in turn: the first
//! `Fail` fails it, the first rewrite turns the result into `Change` for the
//! driver to revalidate, otherwise it passes.

use crate::atoms::{Atom, Backend, SkipResult, Slot};
use crate::{NodeRef, Selector};

/// Per-slot conjunction of selectors.
#[derive(Debug, Default)]
pub struct Conjunction<'a> {
    slots: Vec<Vec<Selector<'a>>>,
}

impl<'a> Conjunction<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Conjunction with `count` empty slots.
    #[must_use]
    pub fn with_slots(count: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(Vec::new).take(count).collect(),
        }
    }

    /// Add a constituent to `slot`, growing the slot list as needed.
    ///
    /// The first constituent added to a slot becomes its lead.
    pub fn push(&mut self, slot: usize, atom: Selector<'a>) {
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, Vec::new);
        }
        self.slots[slot].push(atom);
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of constituents of `slot`.
    #[must_use]
    pub fn constituents(&self, slot: usize) -> usize {
        self.slots.get(slot).map_or(0, Vec::len)
    }
}

/// Show a concrete candidate to every atom in turn.
///
/// The first `Fail` or rewrite decides the result.
fn check_all(atoms: &mut [Selector<'_>], candidate: &mut NodeRef) -> SkipResult {
    for atom in atoms {
        match atom.skip_invalid(candidate) {
            SkipResult::Pass => {}
            SkipResult::Fail => return SkipResult::Fail,
            SkipResult::Change | SkipResult::ChangePass if candidate.is_unbound() => {
                return SkipResult::Fail;
            }
            SkipResult::Change | SkipResult::ChangePass => return SkipResult::Change,
        }
    }
    SkipResult::Pass
}

impl Backend for Conjunction<'_> {
    fn begin(&mut self, slot: Slot) {
        for atom in &mut self.slots[slot.index] {
            atom.begin();
        }
    }

    fn skip_invalid(&mut self, slot: Slot, candidate: &mut NodeRef) -> SkipResult {
        let atoms = &mut self.slots[slot.index];
        if atoms.is_empty() {
            return SkipResult::Fail;
        }
        if !candidate.is_unbound() {
            return check_all(atoms, candidate);
        }

        let Some((lead, checkers)) = atoms.split_first_mut() else {
            return SkipResult::Fail;
        };
        loop {
            let mut proposal = NodeRef::UNBOUND;
            let verified = match lead.skip_invalid(&mut proposal) {
                SkipResult::Fail => return SkipResult::Fail,
                _ if proposal.is_unbound() => return SkipResult::Fail,
                SkipResult::Change => false,
                SkipResult::Pass | SkipResult::ChangePass => true,
            };
            match check_all(checkers, &mut proposal) {
                SkipResult::Fail => continue,
                SkipResult::Pass if verified => {
                    *candidate = proposal;
                    return SkipResult::ChangePass;
                }
                _ => {
                    *candidate = proposal;
                    return SkipResult::Change;
                }
            }
        }
    }

    fn fixate(&mut self, slot: Slot, value: NodeRef) {
        for atom in &mut self.slots[slot.index] {
            atom.fixate(value);
        }
    }

    fn resume(&mut self, slot: Slot) {
        for atom in &mut self.slots[slot.index] {
            atom.resume();
        }
    }

    fn cancel(&mut self, slot: Slot) {
        for atom in &mut self.slots[slot.index] {
            atom.cancel();
        }
    }
}
