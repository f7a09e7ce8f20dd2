//! # Ordering Atom
//!
//! Binary constraint comparing the universe indices of two slots against an
//! accepted subset of {less, equal, greater}. `same` and `distinct` are the
//! equal-only and not-equal cases.
//!
//! Sentinels compare by their raw index, so two `ABSENT` bindings are the same.

use super::{Backend, Candidates, Cursor, SkipResult, Slot};
use crate::NodeRef;
use std::cmp::Ordering;

pub const LEFT: usize = 0;
pub const RIGHT: usize = 1;

/// Accepted outcomes of comparing the left slot with the right slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Accepted {
    pub less: bool,
    pub equal: bool,
    pub greater: bool,
}

impl Accepted {
    /// Both slots hold the same node.
    pub const SAME: Self = Self {
        less: false,
        equal: true,
        greater: false,
    };

    /// The slots hold different nodes.
    pub const DISTINCT: Self = Self {
        less: true,
        equal: false,
        greater: true,
    };

    /// Left precedes right in universe order.
    pub const LESS: Self = Self {
        less: true,
        equal: false,
        greater: false,
    };

    #[must_use]
    pub const fn admits(self, ordering: Ordering) -> bool {
        match ordering {
            Ordering::Less => self.less,
            Ordering::Equal => self.equal,
            Ordering::Greater => self.greater,
        }
    }
}

/// Comparison constraint between two slots.
#[derive(Debug)]
pub struct OrderingAtom {
    accepted: Accepted,
    universe: u32,
    values: [NodeRef; 2],
    cursors: [Cursor<'static>; 2],
}

impl OrderingAtom {
    /// Comparison over a universe of `universe` nodes.
    #[must_use]
    pub fn new(accepted: Accepted, universe: usize) -> Self {
        Self {
            accepted,
            universe: universe as u32,
            values: [NodeRef::UNBOUND; 2],
            cursors: [Cursor::default(); 2],
        }
    }

    fn candidates(&self, slot: usize) -> Candidates<'static> {
        let partner = self.values[partner(slot)];
        if !partner.is_unbound() && self.accepted == Accepted::SAME {
            Candidates::Single(partner)
        } else {
            Candidates::Universe(self.universe)
        }
    }
}

const fn partner(slot: usize) -> usize {
    if slot == LEFT { RIGHT } else { LEFT }
}

fn admits(accepted: Accepted, slot: usize, partner: NodeRef, node: NodeRef) -> bool {
    if partner.is_unbound() {
        return true;
    }
    let ordering = if slot == LEFT {
        node.cmp(&partner)
    } else {
        partner.cmp(&node)
    };
    accepted.admits(ordering)
}

impl Backend for OrderingAtom {
    fn begin(&mut self, slot: Slot) {
        self.values[slot.index] = NodeRef::UNBOUND;
        self.cursors[slot.index] = Cursor::over(self.candidates(slot.index));
    }

    fn skip_invalid(&mut self, slot: Slot, candidate: &mut NodeRef) -> SkipResult {
        let accepted = self.accepted;
        let partner = self.values[partner(slot.index)];
        self.cursors[slot.index].negotiate(candidate, |node| {
            admits(accepted, slot.index, partner, node)
        })
    }

    fn fixate(&mut self, slot: Slot, value: NodeRef) {
        self.values[slot.index] = value;
    }

    fn resume(&mut self, slot: Slot) {
        self.values[slot.index] = NodeRef::UNBOUND;
    }

    fn cancel(&mut self, slot: Slot) {
        self.values[slot.index] = NodeRef::UNBOUND;
        self.cursors[slot.index] = Cursor::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(atom: &mut OrderingAtom, slot: usize, value: u32) -> SkipResult {
        let mut candidate = NodeRef::new(value);
        atom.skip_invalid(Slot::scalar(slot), &mut candidate)
    }

    #[test]
    fn distinct_rejects_equal_nodes() {
        let mut atom = OrderingAtom::new(Accepted::DISTINCT, 16);
        atom.fixate(Slot::scalar(LEFT), NodeRef::new(4));
        atom.begin(Slot::scalar(RIGHT));
        assert_eq!(check(&mut atom, RIGHT, 4), SkipResult::Fail);
        assert_eq!(check(&mut atom, RIGHT, 9), SkipResult::Pass);
    }

    #[test]
    fn same_proposes_only_partner() {
        let mut atom = OrderingAtom::new(Accepted::SAME, 16);
        atom.fixate(Slot::scalar(RIGHT), NodeRef::new(6));
        atom.begin(Slot::scalar(LEFT));

        let mut candidate = NodeRef::UNBOUND;
        assert_eq!(
            atom.skip_invalid(Slot::scalar(LEFT), &mut candidate),
            SkipResult::ChangePass
        );
        assert_eq!(candidate, NodeRef::new(6));

        let mut next = NodeRef::UNBOUND;
        assert_eq!(atom.skip_invalid(Slot::scalar(LEFT), &mut next), SkipResult::Fail);
    }

    #[test]
    fn less_compares_left_to_right() {
        let mut atom = OrderingAtom::new(Accepted::LESS, 16);
        atom.fixate(Slot::scalar(LEFT), NodeRef::new(5));
        atom.begin(Slot::scalar(RIGHT));
        assert_eq!(check(&mut atom, RIGHT, 6), SkipResult::Pass);
        assert_eq!(check(&mut atom, RIGHT, 5), SkipResult::Fail);
        assert_eq!(check(&mut atom, RIGHT, 2), SkipResult::Fail);
    }

    #[test]
    fn unbound_partner_accepts_everything() {
        let mut atom = OrderingAtom::new(Accepted::DISTINCT, 3);
        atom.begin(Slot::scalar(LEFT));
        let mut count = 0;
        loop {
            let mut candidate = NodeRef::UNBOUND;
            if atom.skip_invalid(Slot::scalar(LEFT), &mut candidate) != SkipResult::ChangePass {
                break;
            }
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn absent_is_same_as_absent() {
        let mut atom = OrderingAtom::new(Accepted::SAME, 4);
        atom.fixate(Slot::scalar(LEFT), NodeRef::ABSENT);
        atom.begin(Slot::scalar(RIGHT));
        let mut candidate = NodeRef::ABSENT;
        assert_eq!(
            atom.skip_invalid(Slot::scalar(RIGHT), &mut candidate),
            SkipResult::Pass
        );
    }
}
