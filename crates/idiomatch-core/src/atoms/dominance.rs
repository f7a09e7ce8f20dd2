//! # Dominance Atom
//!
//! Multi-slot constraint over a flow relation. The slots are organised in
//! three groups addressed by slot index, with the member selected by rank:
//!
//! | index | group        | meaning                                   |
//! |-------|--------------|-------------------------------------------|
//! | 0     | `ORIGINS`    | additional starting points of the flow    |
//! | 1     | `DOMINATORS` | nodes every path has to pass through      |
//! | 2     | `DOMINATED`  | nodes that must not be reachable otherwise|
//!
//! The constraint holds when no path starting at a seed or at a bound origin
//! reaches a dominated node without first passing a dominator. Seeds are
//! synthetic nodes prepended to the index space, each with a single edge into
//! one entry point of the relation (its sources for `Flow::Forward`, its sinks
//! for `Flow::Backward`). A pattern with no seeds and explicit origins
//! expresses "every path from these origins to these targets is blocked".
//!
//! Until every member of every group is bound, all candidates pass; the check
//! runs when the final member is offered.

use super::{Backend, Candidates, Cursor, SkipResult, Slot};
use crate::{IdiomError, NodeRef, Relation};
use std::collections::VecDeque;

pub const ORIGINS: usize = 0;
pub const DOMINATORS: usize = 1;
pub const DOMINATED: usize = 2;

/// Direction in which paths are followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    /// Along forward adjacency, from entries: dominance.
    Forward,
    /// Along reverse adjacency, from exits: post-dominance.
    Backward,
}

/// Variant of the dominance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DominanceKind {
    pub flow: Flow,
    /// A dominated node that is also a dominator fails the check.
    pub strict: bool,
    /// Accept exactly the bindings the plain check rejects.
    pub negated: bool,
}

impl DominanceKind {
    pub const DOMINATE: Self = Self {
        flow: Flow::Forward,
        strict: false,
        negated: false,
    };

    pub const STRICTLY_DOMINATE: Self = Self {
        flow: Flow::Forward,
        strict: true,
        negated: false,
    };

    pub const POSTDOMINATE: Self = Self {
        flow: Flow::Backward,
        strict: false,
        negated: false,
    };

    pub const STRICTLY_POSTDOMINATE: Self = Self {
        flow: Flow::Backward,
        strict: true,
        negated: false,
    };

    /// The same check with its outcome inverted.
    #[must_use]
    pub const fn negate(self) -> Self {
        Self {
            negated: !self.negated,
            ..self
        }
    }
}

// =============================================================================
// FLOW GRAPH
// =============================================================================

/// The relation with synthetic seed nodes prepended to its index space.
///
/// Internal index `i < seeds.len()` is seed `i`; any other index is the real
/// node `i - seeds.len()`.
#[derive(Debug)]
struct FlowGraph<'a> {
    relation: &'a Relation,
    flow: Flow,
    seeds: Vec<NodeRef>,
}

impl FlowGraph<'_> {
    fn offset(&self) -> usize {
        self.seeds.len()
    }

    fn internal(&self, node: NodeRef) -> usize {
        node.index() + self.offset()
    }

    fn successors(&self, internal: usize, out: &mut Vec<usize>) {
        out.clear();
        let offset = self.offset();
        if let Some(&seed) = self.seeds.get(internal) {
            out.push(seed.index() + offset);
            return;
        }
        let node = NodeRef::new((internal - offset) as u32);
        match self.flow {
            Flow::Forward => out.extend(self.relation.all_successors(node).map(|n| n.index() + offset)),
            Flow::Backward => out.extend(self.relation.all_predecessors(node).map(|n| n.index() + offset)),
        }
    }

    /// Check that every path from the seeds and `origins` to a node of
    /// `dominated` passes through a node of `dominators`.
    fn blocks(&self, groups: &[Vec<NodeRef>; 3], scratch: &mut Scratch) -> bool {
        let [origins, dominators, dominated] = groups;
        scratch.reset(self.offset() + self.relation.node_count());
        for &node in dominators.iter().filter(|node| node.is_node()) {
            scratch.blocked[self.internal(node)] = true;
        }
        for &node in dominated.iter().filter(|node| node.is_node()) {
            scratch.target[self.internal(node)] = true;
        }

        let starts = (0..self.offset()).chain(
            origins
                .iter()
                .filter(|node| node.is_node())
                .map(|&node| self.internal(node)),
        );
        for start in starts {
            if scratch.blocked[start] || scratch.seen[start] {
                continue;
            }
            if scratch.target[start] {
                return false;
            }
            scratch.seen[start] = true;
            scratch.queue.push_back(start);
        }

        while let Some(current) = scratch.queue.pop_front() {
            self.successors(current, &mut scratch.next);
            for &succ in &scratch.next {
                if scratch.seen[succ] || scratch.blocked[succ] {
                    continue;
                }
                if scratch.target[succ] {
                    return false;
                }
                scratch.seen[succ] = true;
                scratch.queue.push_back(succ);
            }
        }
        true
    }
}

/// Buffers reused by every check of one atom.
#[derive(Debug, Default)]
struct Scratch {
    blocked: Vec<bool>,
    target: Vec<bool>,
    seen: Vec<bool>,
    queue: VecDeque<usize>,
    next: Vec<usize>,
}

impl Scratch {
    fn reset(&mut self, size: usize) {
        for marks in [&mut self.blocked, &mut self.target, &mut self.seen] {
            marks.clear();
            marks.resize(size, false);
        }
        self.queue.clear();
        self.next.clear();
    }
}

// =============================================================================
// DOMINANCE ATOM
// =============================================================================

/// Generalized dominance constraint over a flow relation.
#[derive(Debug)]
pub struct DominanceAtom<'a> {
    graph: FlowGraph<'a>,
    kind: DominanceKind,
    members: [Vec<NodeRef>; 3],
    cursors: [Vec<Cursor<'static>>; 3],
    groups: [Vec<NodeRef>; 3],
    scratch: Scratch,
}

impl<'a> DominanceAtom<'a> {
    /// Dominance check seeded at the relation's natural entry points.
    ///
    /// `sizes` gives the number of members of the origin, dominator and
    /// dominated groups.
    #[must_use]
    pub fn new(relation: &'a Relation, kind: DominanceKind, sizes: [usize; 3]) -> Self {
        let seeds = match kind.flow {
            Flow::Forward => relation.sources(),
            Flow::Backward => relation.sinks(),
        };
        Self::build(relation, kind, seeds, sizes)
    }

    /// Dominance check seeded at explicit entry nodes (possibly none).
    pub fn with_seeds(
        relation: &'a Relation,
        kind: DominanceKind,
        seeds: Vec<NodeRef>,
        sizes: [usize; 3],
    ) -> Result<Self, IdiomError> {
        if let Some(&node) = seeds
            .iter()
            .find(|node| !node.is_node() || node.index() >= relation.node_count())
        {
            return Err(IdiomError::NodeOutOfRange {
                context: relation.name().to_string(),
                node,
                size: relation.node_count(),
            });
        }
        Ok(Self::build(relation, kind, seeds, sizes))
    }

    fn build(relation: &'a Relation, kind: DominanceKind, seeds: Vec<NodeRef>, sizes: [usize; 3]) -> Self {
        tracing::trace!(
            relation = relation.name(),
            seeds = seeds.len(),
            origins = sizes[ORIGINS],
            dominators = sizes[DOMINATORS],
            dominated = sizes[DOMINATED],
            "dominance atom created"
        );
        Self {
            graph: FlowGraph {
                relation,
                flow: kind.flow,
                seeds,
            },
            kind,
            members: sizes.map(|size| vec![NodeRef::UNBOUND; size]),
            cursors: sizes.map(|size| vec![Cursor::default(); size]),
            groups: sizes.map(Vec::with_capacity),
            scratch: Scratch::default(),
        }
    }

    /// Evaluate the check with `node` offered at `slot`.
    fn admits(&mut self, slot: Slot, node: NodeRef) -> bool {
        for group in &mut self.groups {
            group.clear();
        }
        for (group, members) in self.members.iter().enumerate() {
            for (rank, &value) in members.iter().enumerate() {
                let value = if (group, rank) == (slot.index, slot.rank) {
                    node
                } else {
                    value
                };
                if value.is_unbound() {
                    return true;
                }
                self.groups[group].push(value);
            }
        }

        let [_, dominators, dominated] = &self.groups;
        let holds = !(self.kind.strict && dominated.iter().any(|node| dominators.contains(node)))
            && self.graph.blocks(&self.groups, &mut self.scratch);
        holds != self.kind.negated
    }
}

impl Backend for DominanceAtom<'_> {
    fn begin(&mut self, slot: Slot) {
        self.members[slot.index][slot.rank] = NodeRef::UNBOUND;
        let universe = self.graph.relation.node_count() as u32;
        self.cursors[slot.index][slot.rank] = Cursor::over(Candidates::Universe(universe));
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
