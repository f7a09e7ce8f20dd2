//! # Atom Protocol
//!
//! Every constraint the solver understands speaks the same five-operation
//! protocol, either directly ([`Atom`], the per-variable view the search
//! driver uses) or addressed by slot ([`Backend`], the multi-slot view a
//! constraint exposes through its selectors).
//!
//! ## Candidate negotiation
//!
//! `skip_invalid` receives a candidate by mutable reference:
//! - `NodeRef::UNBOUND` asks the atom to propose its next candidate. Leaf atoms
//!   answer `ChangePass` with the proposal, or `Fail` when exhausted.
//! - A concrete value is checked: `Pass` if valid, `Fail` otherwise.
//!
//! `begin` resets the enumeration for the current bindings of the partner
//! slots, `resume` continues after a retracted value, `cancel` forgets the
//! enumeration entirely.

pub mod dominance;
pub mod edge;
pub mod ordering;
pub mod predicate;
pub mod same_set;

pub use dominance::{DominanceAtom, DominanceKind, Flow};
pub use edge::EdgeAtom;
pub use ordering::{Accepted, OrderingAtom};
pub use predicate::PredicateAtom;
pub use same_set::SameSetAtom;

use crate::NodeRef;

// =============================================================================
// PROTOCOL
// =============================================================================

/// Outcome of presenting a candidate to an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipResult {
    /// The candidate is valid and unchanged.
    Pass,
    /// The candidate was replaced by a value that still needs validation.
    Change,
    /// The candidate was replaced by a value the atom has validated.
    ChangePass,
    /// No acceptable candidate remains.
    Fail,
}

/// The per-variable protocol driven by the search loop.
pub trait Atom {
    /// Start enumerating values for this variable under the current bindings.
    fn begin(&mut self);

    /// Validate or propose a candidate (see the module docs).
    fn skip_invalid(&mut self, candidate: &mut NodeRef) -> SkipResult;

    /// Commit `value` as the variable's binding.
    fn fixate(&mut self, value: NodeRef);

    /// Retract the binding and continue the enumeration after it.
    fn resume(&mut self);

    /// Abandon the enumeration.
    fn cancel(&mut self);
}

impl<A: Atom + ?Sized> Atom for Box<A> {
    fn begin(&mut self) {
        (**self).begin();
    }

    fn skip_invalid(&mut self, candidate: &mut NodeRef) -> SkipResult {
        (**self).skip_invalid(candidate)
    }

    fn fixate(&mut self, value: NodeRef) {
        (**self).fixate(value);
    }

    fn resume(&mut self) {
        (**self).resume();
    }

    fn cancel(&mut self) {
        (**self).cancel();
    }
}

/// Address of one variable position inside a multi-slot constraint.
///
/// `index` selects the slot; `rank` selects a member inside grouped slots
/// (the dominance atom's origin, dominator and dominated groups). Scalar
/// slots always use rank 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot {
    pub index: usize,
    pub rank: usize,
}

impl Slot {
    #[must_use]
    pub const fn scalar(index: usize) -> Self {
        Self { index, rank: 0 }
    }

    #[must_use]
    pub const fn ranked(index: usize, rank: usize) -> Self {
        Self { index, rank }
    }
}

/// The slot-addressed protocol a constraint implements.
pub trait Backend {
    fn begin(&mut self, slot: Slot);
    fn skip_invalid(&mut self, slot: Slot, candidate: &mut NodeRef) -> SkipResult;
    fn fixate(&mut self, slot: Slot, value: NodeRef);
    fn resume(&mut self, slot: Slot);
    fn cancel(&mut self, slot: Slot);
}

// =============================================================================
// CANDIDATE CURSOR
// =============================================================================

/// Where a leaf atom draws its candidates from.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) enum Candidates<'a> {
    /// Nothing left to propose.
    #[default]
    Exhausted,
    /// An adjacency or predicate list, in list order.
    Listed(&'a [NodeRef]),
    /// Exactly one value.
    Single(NodeRef),
    /// Every node of a universe of this size, in index order.
    Universe(u32),
}

/// Enumeration state of one leaf slot.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Cursor<'a> {
    candidates: Candidates<'a>,
    position: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn over(candidates: Candidates<'a>) -> Self {
        Self {
            candidates,
            position: 0,
        }
    }

    fn advance(&mut self) -> Option<NodeRef> {
        let next = match self.candidates {
            Candidates::Exhausted => None,
            Candidates::Listed(list) => list.get(self.position).copied(),
            Candidates::Single(node) => (self.position == 0).then_some(node),
            Candidates::Universe(size) => {
                (self.position < size as usize).then(|| NodeRef::new(self.position as u32))
            }
        };
        if next.is_some() {
            self.position += 1;
        }
        next
    }

    /// Answer a `skip_invalid` request for a leaf slot.
    ///
    /// On an advance request, proposes the next candidate that `accepts`
    /// admits; on a concrete candidate, checks it without moving the cursor.
    pub(crate) fn negotiate(
        &mut self,
        candidate: &mut NodeRef,
        mut accepts: impl FnMut(NodeRef) -> bool,
    ) -> SkipResult {
        if !candidate.is_unbound() {
            return if accepts(*candidate) {
                SkipResult::Pass
            } else {
                SkipResult::Fail
            };
        }
        while let Some(next) = self.advance() {
            if accepts(next) {
                *candidate = next;
                return SkipResult::ChangePass;
            }
        }
        SkipResult::Fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(cursor: &mut Cursor<'_>, accepts: impl Fn(NodeRef) -> bool) -> Vec<NodeRef> {
        let mut seen = Vec::new();
        loop {
            let mut candidate = NodeRef::UNBOUND;
            let result = cursor.negotiate(&mut candidate, &accepts);
            if result != SkipResult::ChangePass {
                assert_eq!(result, SkipResult::Fail);
                return seen;
            }
            seen.push(candidate);
        }
    }

    #[test]
    fn listed_cursor_keeps_list_order() {
        let list = [NodeRef::new(9), NodeRef::new(3), NodeRef::new(7)];
        let mut cursor = Cursor::over(Candidates::Listed(&list));
        assert_eq!(drain(&mut cursor, |_| true), list.to_vec());
    }

    #[test]
    fn universe_cursor_filters() {
        let mut cursor = Cursor::over(Candidates::Universe(6));
        let odd = drain(&mut cursor, |node| node.0 % 2 == 1);
        assert_eq!(odd, vec![NodeRef::new(1), NodeRef::new(3), NodeRef::new(5)]);
    }

    #[test]
    fn single_cursor_yields_once() {
        let mut cursor = Cursor::over(Candidates::Single(NodeRef::ABSENT));
        assert_eq!(drain(&mut cursor, |_| true), vec![NodeRef::ABSENT]);
    }

    #[test]
    fn concrete_candidate_does_not_move_cursor() {
        let list = [NodeRef::new(1), NodeRef::new(2)];
        let mut cursor = Cursor::over(Candidates::Listed(&list));
        let mut concrete = NodeRef::new(2);
        assert_eq!(cursor.negotiate(&mut concrete, |_| true), SkipResult::Pass);
        assert_eq!(concrete, NodeRef::new(2));
        assert_eq!(drain(&mut cursor, |_| true), list.to_vec());
    }

    #[test]
    fn default_cursor_is_exhausted() {
        let mut cursor = Cursor::default();
        assert!(drain(&mut cursor, |_| true).is_empty());
    }
}
