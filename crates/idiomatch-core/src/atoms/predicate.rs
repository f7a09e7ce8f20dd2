//! # Predicate Atom
//!
//! Unary constraint: the variable is a member of a precomputed node list.
//! Enumeration follows list order. The `unused` form admits only `ABSENT`.

use super::{Backend, Candidates, Cursor, SkipResult, Slot};
use crate::{NodeRef, PredicateSet};

const ABSENT_ONLY: &[NodeRef] = &[NodeRef::ABSENT];

/// Membership constraint over a predicate list.
#[derive(Debug)]
pub struct PredicateAtom<'a> {
    members: &'a [NodeRef],
    set: Option<&'a PredicateSet>,
    cursor: Cursor<'a>,
}

impl<'a> PredicateAtom<'a> {
    #[must_use]
    pub fn new(set: &'a PredicateSet) -> Self {
        Self {
            members: set.members(),
            set: Some(set),
            cursor: Cursor::default(),
        }
    }

    /// Marks a pattern slot as deliberately absent.
    #[must_use]
    pub fn unused() -> Self {
        Self {
            members: ABSENT_ONLY,
            set: None,
            cursor: Cursor::default(),
        }
    }
}

impl Backend for PredicateAtom<'_> {
    fn begin(&mut self, _slot: Slot) {
        self.cursor = Cursor::over(Candidates::Listed(self.members));
    }

    fn skip_invalid(&mut self, _slot: Slot, candidate: &mut NodeRef) -> SkipResult {
        let (members, set) = (self.members, self.set);
        self.cursor.negotiate(candidate, |node| match set {
            Some(set) => set.contains(node),
            None => members.contains(&node),
        })
    }

    fn fixate(&mut self, _slot: Slot, _value: NodeRef) {}

    fn resume(&mut self, _slot: Slot) {}

    fn cancel(&mut self, _slot: Slot) {
        self.cursor = Cursor::default();
    }
}
