//! # Same-Set Atom
//!
//! Two groups of slots must hold the same set of nodes. Slot index 0 is the
//! left group and 1 the right group, with the member selected by rank.
//! Multiplicity and member order do not matter, and `ABSENT` members
//! contribute nothing.
//!
//! Once the other group is fully bound, a candidate must be one of its nodes.
//! The complete comparison runs when the final member is offered.

use super::{Backend, Candidates, Cursor, SkipResult, Slot};
use crate::NodeRef;
use std::collections::BTreeSet;

pub const LEFT: usize = 0;
pub const RIGHT: usize = 1;

/// Set equality between two slot groups.
#[derive(Debug)]
pub struct SameSetAtom {
    universe: u32,
    members: [Vec<NodeRef>; 2],
    cursors: [Vec<Cursor<'static>>; 2],
}

impl SameSetAtom {
    /// `sizes` gives the number of members of the left and right groups.
    #[must_use]
    pub fn new(universe: usize, sizes: [usize; 2]) -> Self {
        Self {
            universe: universe as u32,
            members: sizes.map(|size| vec![NodeRef::UNBOUND; size]),
            cursors: sizes.map(|size| vec![Cursor::default(); size]),
        }
    }

    /// The bound nodes of `group` with `node` offered at `slot`, or `None`
    /// while a member is still unbound.
    fn bound_set(&self, group: usize, slot: Slot, node: NodeRef) -> Option<BTreeSet<NodeRef>> {
        let mut set = BTreeSet::new();
        for (rank, &value) in self.members[group].iter().enumerate() {
            let value = if (group, rank) == (slot.index, slot.rank) {
                node
            } else {
                value
            };
            if value.is_unbound() {
                return None;
            }
            if value.is_node() {
                set.insert(value);
            }
        }
        Some(set)
    }

    fn admits(&self, slot: Slot, node: NodeRef) -> bool {
        let own = self.bound_set(slot.index, slot, node);
        let other = self.bound_set(1 - slot.index, slot, node);
        match (own, other) {
            (Some(own), Some(other)) => own == other,
            (_, Some(other)) => !node.is_node() || other.contains(&node),
            _ => true,
        }
    }
}

impl Backend for SameSetAtom {
    fn begin(&mut self, slot: Slot) {
        self.members[slot.index][slot.rank] = NodeRef::UNBOUND;
        self.cursors[slot.index][slot.rank] = Cursor::over(Candidates::Universe(self.universe));
    }

    fn skip_invalid(&mut self, slot: Slot, candidate: &mut NodeRef) -> SkipResult {
        let mut cursor = std::mem::take(&mut self.cursors[slot.index][slot.rank]);
        let result = cursor.negotiate(candidate, |node| self.admits(slot, node));
        self.cursors[slot.index][slot.rank] = cursor;
        result
    }

    fn fixate(&mut self, slot: Slot, value: NodeRef) {
        self.members[slot.index][slot.rank] = value;
    }

    fn resume(&mut self, slot: Slot) {
        self.members[slot.index][slot.rank] = NodeRef::UNBOUND;
    }

    fn cancel(&mut self, slot: Slot) {
        self.members[slot.index][slot.rank] = NodeRef::UNBOUND;
        self.cursors[slot.index][slot.rank] = Cursor::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(index: u32) -> NodeRef {
        NodeRef::new(index)
    }

    fn bind(atom: &mut SameSetAtom, group: usize, values: &[u32]) {
        for (rank, &value) in values.iter().enumerate() {
            atom.fixate(Slot::ranked(group, rank), n(value));
        }
    }

    #[test]
    fn order_and_multiplicity_ignored() {
        let mut atom = SameSetAtom::new(6, [2, 3]);
        bind(&mut atom, LEFT, &[4, 1]);
        bind(&mut atom, RIGHT, &[1, 4]);
        let last = Slot::ranked(RIGHT, 2);
        atom.begin(last);
        let mut repeated = n(4);
        assert_eq!(atom.skip_invalid(last, &mut repeated), SkipResult::Pass);
        let mut extra = n(2);
        assert_eq!(atom.skip_invalid(last, &mut extra), SkipResult::Fail);
    }

    #[test]
    fn candidates_limited_to_bound_group() {
        let mut atom = SameSetAtom::new(6, [2, 2]);
        bind(&mut atom, LEFT, &[5, 2]);
        let first = Slot::ranked(RIGHT, 0);
        atom.begin(first);

        let mut seen = Vec::new();
        loop {
            let mut candidate = NodeRef::UNBOUND;
            if atom.skip_invalid(first, &mut candidate) != SkipResult::ChangePass {
                break;
            }
            seen.push(candidate);
        }
        assert_eq!(seen, vec![n(2), n(5)]);
    }

    #[test]
    fn absent_members_contribute_nothing() {
        let mut atom = SameSetAtom::new(4, [2, 1]);
        atom.fixate(Slot::ranked(LEFT, 0), n(3));
        atom.fixate(Slot::ranked(LEFT, 1), NodeRef::ABSENT);
        let only = Slot::ranked(RIGHT, 0);
        atom.begin(only);
        let mut candidate = n(3);
        assert_eq!(atom.skip_invalid(only, &mut candidate), SkipResult::Pass);
    }

    #[test]
    fn passes_while_other_group_unbound() {
        let mut atom = SameSetAtom::new(4, [1, 1]);
        let left = Slot::ranked(LEFT, 0);
        atom.begin(left);
        let mut candidate = n(0);
        assert_eq!(atom.skip_invalid(left, &mut candidate), SkipResult::Pass);
    }
}
