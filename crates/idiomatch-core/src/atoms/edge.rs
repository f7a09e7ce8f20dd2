//! # Edge Atom
//!
//! Binary constraint: `source -> target` is an edge of a relation at a fixed
//! rank. Slot 0 is the source, slot 1 the target.
//!
//! With the partner bound, candidates come straight from its adjacency list
//! (successors for a target, predecessors for a source) in insertion order.
//! With the partner unbound, any node with a non-empty adjacency on the
//! relevant side is a candidate.

use super::{Backend, Candidates, Cursor, SkipResult, Slot};
use crate::{IdiomError, NodeRef, Relation};

pub const SOURCE: usize = 0;
pub const TARGET: usize = 1;

/// Edge constraint over one rank of a relation.
#[derive(Debug)]
pub struct EdgeAtom<'a> {
    relation: &'a Relation,
    rank: usize,
    values: [NodeRef; 2],
    cursors: [Cursor<'a>; 2],
}

impl<'a> EdgeAtom<'a> {
    /// Edge constraint over a simple relation (rank 0).
    pub fn new(relation: &'a Relation) -> Self {
        Self::at_rank_unchecked(relation, 0)
    }

    /// Edge constraint over one rank of a ranked relation.
    pub fn ranked(relation: &'a Relation, rank: usize) -> Result<Self, IdiomError> {
        if rank >= relation.rank_count() {
            return Err(IdiomError::RankOutOfRange {
                relation: relation.name().to_string(),
                rank,
                ranks: relation.rank_count(),
            });
        }
        Ok(Self::at_rank_unchecked(relation, rank))
    }

    fn at_rank_unchecked(relation: &'a Relation, rank: usize) -> Self {
        Self {
            relation,
            rank,
            values: [NodeRef::UNBOUND; 2],
            cursors: [Cursor::default(); 2],
        }
    }

    fn candidates(&self, slot: usize) -> Candidates<'a> {
        let partner = self.values[partner(slot)];
        if partner.is_unbound() {
            Candidates::Universe(self.relation.node_count() as u32)
        } else if slot == TARGET {
            Candidates::Listed(self.relation.successors(partner, self.rank))
        } else {
            Candidates::Listed(self.relation.predecessors(partner, self.rank))
        }
    }
}

const fn partner(slot: usize) -> usize {
    if slot == SOURCE { TARGET } else { SOURCE }
}

fn admits(relation: &Relation, rank: usize, slot: usize, partner: NodeRef, node: NodeRef) -> bool {
    match (partner.is_unbound(), slot == TARGET) {
        (true, true) => !relation.predecessors(node, rank).is_empty(),
        (true, false) => !relation.successors(node, rank).is_empty(),
        (false, true) => relation.successors(partner, rank).contains(&node),
        (false, false) => relation.successors(node, rank).contains(&partner),
    }
}

impl Backend for EdgeAtom<'_> {
    fn begin(&mut self, slot: Slot) {
        self.values[slot.index] = NodeRef::UNBOUND;
        self.cursors[slot.index] = Cursor::over(self.candidates(slot.index));
    }

    fn skip_invalid(&mut self, slot: Slot, candidate: &mut NodeRef) -> SkipResult {
        let (relation, rank) = (self.relation, self.rank);
        let partner = self.values[partner(slot.index)];
        self.cursors[slot.index].negotiate(candidate, |node| {
            admits(relation, rank, slot.index, partner, node)
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
