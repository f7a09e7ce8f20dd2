//! # Relation Store
//!
//! The read-only program representation the solver queries.
//!
//! A [`RelationStore`] owns a [`NodeUniverse`] (one entry per program element),
//! a set of named [`Relation`]s with explicit forward and reverse adjacency,
//! and a set of named [`PredicateSet`]s. Every structure is validated once on
//! insertion, after which atoms borrow adjacency slices for the lifetime of a
//! pattern without further checks.
//!
//! Adjacency lists keep insertion order; that order is the candidate order
//! the atoms enumerate, so it must be preserved verbatim.

use crate::{IdiomError, NodeRef, primitives};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Per-node adjacency lists of one rank.
pub type Adjacency = Vec<Vec<NodeRef>>;

// =============================================================================
// NODE UNIVERSE
// =============================================================================

/// Dense enumeration of every program element the solver may bind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeUniverse {
    labels: Vec<String>,
}

impl NodeUniverse {
    /// Universe of `size` unlabeled nodes.
    #[must_use]
    pub fn with_size(size: usize) -> Self {
        Self {
            labels: vec![String::new(); size],
        }
    }

    /// Universe whose nodes carry display labels, in index order.
    #[must_use]
    pub fn from_labels(labels: Vec<String>) -> Self {
        Self { labels }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Check whether `node` is a real entry of this universe.
    #[must_use]
    pub fn contains(&self, node: NodeRef) -> bool {
        node.is_node() && node.index() < self.labels.len()
    }

    /// Display label of a node, if one was given.
    #[must_use]
    pub fn label(&self, node: NodeRef) -> Option<&str> {
        if !self.contains(node) {
            return None;
        }
        self.labels
            .get(node.index())
            .map(String::as_str)
            .filter(|label| !label.is_empty())
    }

    /// All nodes in index order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef> + '_ {
        (0..self.labels.len()).map(|index| NodeRef::new(index as u32))
    }

    pub(crate) fn labels(&self) -> &[String] {
        &self.labels
    }
}

// =============================================================================
// RELATION
// =============================================================================

/// A named, possibly ranked, binary relation over the node universe.
///
/// `forward[rank][n]` lists the nodes reachable from `n` over edges of that
/// rank, `reverse[rank][n]` the nodes with such an edge into `n`. A simple
/// relation is a ranked relation with exactly one rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    name: String,
    forward: Vec<Adjacency>,
    reverse: Vec<Adjacency>,
}

impl Relation {
    /// Simple relation from explicit adjacency tables.
    ///
    /// Nothing is checked until the relation is inserted into a store.
    #[must_use]
    pub fn simple(name: impl Into<String>, forward: Adjacency, reverse: Adjacency) -> Self {
        Self {
            name: name.into(),
            forward: vec![forward],
            reverse: vec![reverse],
        }
    }

    /// Ranked relation from explicit adjacency tables, one table per rank.
    #[must_use]
    pub fn ranked(name: impl Into<String>, forward: Vec<Adjacency>, reverse: Vec<Adjacency>) -> Self {
        Self {
            name: name.into(),
            forward,
            reverse,
        }
    }

    /// Simple relation from an edge list; the reverse side is derived.
    ///
    /// Edges are appended in list order on both sides.
    pub fn from_edges(
        name: impl Into<String>,
        size: usize,
        edges: &[(u32, u32)],
    ) -> Result<Self, IdiomError> {
        let ranked: Vec<(usize, u32, u32)> =
            edges.iter().map(|&(from, to)| (0, from, to)).collect();
        Self::from_ranked_edges(name, size, 1, &ranked)
    }

    /// Ranked relation from `(rank, from, to)` triples; the reverse side is derived.
    pub fn from_ranked_edges(
        name: impl Into<String>,
        size: usize,
        ranks: usize,
        edges: &[(usize, u32, u32)],
    ) -> Result<Self, IdiomError> {
        let name = name.into();
        check_rank_count(&name, ranks)?;
        let mut forward = vec![vec![Vec::new(); size]; ranks];
        let mut reverse = vec![vec![Vec::new(); size]; ranks];
        for &(rank, from, to) in edges {
            if rank >= ranks {
                return Err(IdiomError::RankOutOfRange {
                    relation: name,
                    rank,
                    ranks,
                });
            }
            for node in [from, to] {
                if node as usize >= size {
                    return Err(IdiomError::NodeOutOfRange {
                        context: name,
                        node: NodeRef::new(node),
                        size,
                    });
                }
            }
            forward[rank][from as usize].push(NodeRef::new(to));
            reverse[rank][to as usize].push(NodeRef::new(from));
        }
        Ok(Self {
            name,
            forward,
            reverse,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn rank_count(&self) -> usize {
        self.forward.len()
    }

    /// Number of nodes covered by the adjacency tables.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.forward.first().map_or(0, Vec::len)
    }

    /// Forward adjacency of `node` at `rank`, in insertion order.
    ///
    /// Sentinels and out-of-range anchors have no successors.
    #[must_use]
    pub fn successors(&self, node: NodeRef, rank: usize) -> &[NodeRef] {
        lookup(&self.forward, node, rank)
    }

    /// Reverse adjacency of `node` at `rank`, in insertion order.
    #[must_use]
    pub fn predecessors(&self, node: NodeRef, rank: usize) -> &[NodeRef] {
        lookup(&self.reverse, node, rank)
    }

    /// Forward adjacency of `node` across all ranks, rank by rank.
    pub fn all_successors(&self, node: NodeRef) -> impl Iterator<Item = NodeRef> + '_ {
        (0..self.rank_count()).flat_map(move |rank| self.successors(node, rank).iter().copied())
    }

    /// Reverse adjacency of `node` across all ranks, rank by rank.
    pub fn all_predecessors(&self, node: NodeRef) -> impl Iterator<Item = NodeRef> + '_ {
        (0..self.rank_count()).flat_map(move |rank| self.predecessors(node, rank).iter().copied())
    }

    #[must_use]
    pub fn contains_edge(&self, from: NodeRef, to: NodeRef, rank: usize) -> bool {
        self.successors(from, rank).contains(&to)
    }

    /// Total number of edges over all ranks.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.forward.iter().flatten().map(Vec::len).sum()
    }

    /// Nodes without incoming edges of any rank, in index order.
    #[must_use]
    pub fn sources(&self) -> Vec<NodeRef> {
        (0..self.node_count() as u32)
            .map(NodeRef::new)
            .filter(|&node| self.all_predecessors(node).next().is_none())
            .collect()
    }

    /// Nodes without outgoing edges of any rank, in index order.
    #[must_use]
    pub fn sinks(&self) -> Vec<NodeRef> {
        (0..self.node_count() as u32)
            .map(NodeRef::new)
            .filter(|&node| self.all_successors(node).next().is_none())
            .collect()
    }

    pub(crate) fn forward_tables(&self) -> &[Adjacency] {
        &self.forward
    }

    pub(crate) fn reverse_tables(&self) -> &[Adjacency] {
        &self.reverse
    }

    /// Check the relation against a universe of `size` nodes.
    ///
    /// Rejects size mismatches, out-of-range or sentinel entries, and edges
    /// that are not mirrored between forward and reverse adjacency.
    pub fn validate(&self, size: usize) -> Result<(), IdiomError> {
        check_rank_count(&self.name, self.forward.len())?;
        if self.reverse.len() != self.forward.len() {
            return Err(IdiomError::SizeMismatch {
                relation: self.name.clone(),
                expected: self.forward.len(),
                found: self.reverse.len(),
            });
        }

        for (rank, (forward, reverse)) in self.forward.iter().zip(&self.reverse).enumerate() {
            for table in [forward, reverse] {
                if table.len() != size {
                    return Err(IdiomError::SizeMismatch {
                        relation: self.name.clone(),
                        expected: size,
                        found: table.len(),
                    });
                }
                if let Some(&node) = table
                    .iter()
                    .flatten()
                    .find(|node| !node.is_node() || node.index() >= size)
                {
                    return Err(IdiomError::NodeOutOfRange {
                        context: self.name.clone(),
                        node,
                        size,
                    });
                }
            }

            // +1 per forward edge, -1 per reverse edge; any residue is unmirrored.
            let mut balance: BTreeMap<(NodeRef, NodeRef), i64> = BTreeMap::new();
            for (from, targets) in forward.iter().enumerate() {
                for &to in targets {
                    *balance.entry((NodeRef::new(from as u32), to)).or_default() += 1;
                }
            }
            for (to, origins) in reverse.iter().enumerate() {
                for &from in origins {
                    *balance.entry((from, NodeRef::new(to as u32))).or_default() -= 1;
                }
            }
            if let Some((&(from, to), _)) = balance.iter().find(|(_, count)| **count != 0) {
                return Err(IdiomError::InconsistentAdjacency {
                    relation: self.name.clone(),
                    rank,
                    from,
                    to,
                });
            }
        }
        Ok(())
    }
}

fn lookup(tables: &[Adjacency], node: NodeRef, rank: usize) -> &[NodeRef] {
    if !node.is_node() {
        return &[];
    }
    tables
        .get(rank)
        .and_then(|table| table.get(node.index()))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn check_rank_count(name: &str, ranks: usize) -> Result<(), IdiomError> {
    if ranks == 0 || ranks > primitives::MAX_RANKS {
        return Err(IdiomError::InvalidRankCount {
            relation: name.to_string(),
            ranks,
            max: primitives::MAX_RANKS,
        });
    }
    Ok(())
}

// =============================================================================
// PREDICATE SET
// =============================================================================

/// A named list of nodes that satisfy a precomputed unary property.
///
/// The list order is the enumeration order; membership tests use a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateSet {
    name: String,
    members: Vec<NodeRef>,
    lookup: BTreeSet<NodeRef>,
}

impl PredicateSet {
    #[must_use]
    pub fn new(name: impl Into<String>, members: Vec<NodeRef>) -> Self {
        let lookup = members.iter().copied().collect();
        Self {
            name: name.into(),
            members,
            lookup,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members in enumeration order.
    #[must_use]
    pub fn members(&self) -> &[NodeRef] {
        &self.members
    }

    #[must_use]
    pub fn contains(&self, node: NodeRef) -> bool {
        self.lookup.contains(&node)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

// =============================================================================
// RELATION STORE
// =============================================================================

/// Validated collection of relations and predicates over one node universe.
#[derive(Debug, Clone, Default)]
pub struct RelationStore {
    universe: NodeUniverse,
    relations: BTreeMap<String, Relation>,
    predicates: BTreeMap<String, PredicateSet>,
}

impl RelationStore {
    /// Create an empty store over `universe`.
    pub fn new(universe: NodeUniverse) -> Result<Self, IdiomError> {
        if universe.len() > primitives::MAX_UNIVERSE_SIZE {
            return Err(IdiomError::UniverseTooLarge(universe.len()));
        }
        Ok(Self {
            universe,
            relations: BTreeMap::new(),
            predicates: BTreeMap::new(),
        })
    }

    #[must_use]
    pub fn universe(&self) -> &NodeUniverse {
        &self.universe
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.universe.len()
    }

    /// Validate and register a relation.
    pub fn insert_relation(&mut self, relation: Relation) -> Result<(), IdiomError> {
        if self.relations.contains_key(relation.name()) {
            return Err(IdiomError::DuplicateRelation(relation.name().to_string()));
        }
        relation.validate(self.universe.len())?;
        tracing::debug!(
            relation = relation.name(),
            ranks = relation.rank_count(),
            edges = relation.edge_count(),
            "relation registered"
        );
        self.relations.insert(relation.name().to_string(), relation);
        Ok(())
    }

    /// Validate and register a predicate.
    pub fn insert_predicate(&mut self, predicate: PredicateSet) -> Result<(), IdiomError> {
        if self.predicates.contains_key(predicate.name()) {
            return Err(IdiomError::DuplicatePredicate(predicate.name().to_string()));
        }
        if let Some(&node) = predicate
            .members()
            .iter()
            .find(|&&node| !self.universe.contains(node))
        {
            return Err(IdiomError::NodeOutOfRange {
                context: predicate.name().to_string(),
                node,
                size: self.universe.len(),
            });
        }
        tracing::debug!(
            predicate = predicate.name(),
            members = predicate.len(),
            "predicate registered"
        );
        self.predicates.insert(predicate.name().to_string(), predicate);
        Ok(())
    }

    pub fn relation(&self, name: &str) -> Result<&Relation, IdiomError> {
        self.relations
            .get(name)
            .ok_or_else(|| IdiomError::UnknownRelation(name.to_string()))
    }

    pub fn predicate(&self, name: &str) -> Result<&PredicateSet, IdiomError> {
        self.predicates
            .get(name)
            .ok_or_else(|| IdiomError::UnknownPredicate(name.to_string()))
    }

    /// Registered relations in name order.
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.values()
    }

    /// Registered predicates in name order.
    pub fn predicates(&self) -> impl Iterator<Item = &PredicateSet> {
        self.predicates.values()
    }
}

// =============================================================================
// SERIALIZABLE STORE
// =============================================================================

/// Serializable representation of a relation store.
///
/// Used both for the JSON interchange format and the packed binary format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableStore {
    /// Node labels in index order; an empty label means unlabeled.
    pub nodes: Vec<String>,
    #[serde(default)]
    pub relations: Vec<SerializableRelation>,
    #[serde(default)]
    pub predicates: BTreeMap<String, Vec<NodeRef>>,
}

/// Serializable representation of one relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableRelation {
    pub name: String,
    /// `forward[rank][node]`.
    pub forward: Vec<Adjacency>,
    /// Derived from `forward` when omitted.
    #[serde(default)]
    pub reverse: Option<Vec<Adjacency>>,
}

impl From<&RelationStore> for SerializableStore {
    fn from(store: &RelationStore) -> Self {
        Self {
            nodes: store.universe.labels().to_vec(),
            relations: store
                .relations()
                .map(|relation| SerializableRelation {
                    name: relation.name().to_string(),
                    forward: relation.forward_tables().to_vec(),
                    reverse: Some(relation.reverse_tables().to_vec()),
                })
                .collect(),
            predicates: store
                .predicates()
                .map(|predicate| (predicate.name().to_string(), predicate.members().to_vec()))
                .collect(),
        }
    }
}

impl TryFrom<SerializableStore> for RelationStore {
    type Error = IdiomError;

    fn try_from(serializable: SerializableStore) -> Result<Self, Self::Error> {
        let size = serializable.nodes.len();
        let mut store = Self::new(NodeUniverse::from_labels(serializable.nodes))?;

        for relation in serializable.relations {
            let relation = match relation.reverse {
                Some(reverse) => Relation::ranked(relation.name, relation.forward, reverse),
                None => derive_reverse(relation.name, size, relation.forward)?,
            };
            store.insert_relation(relation)?;
        }

        for (name, members) in serializable.predicates {
            store.insert_predicate(PredicateSet::new(name, members))?;
        }

        Ok(store)
    }
}

fn derive_reverse(name: String, size: usize, forward: Vec<Adjacency>) -> Result<Relation, IdiomError> {
    let ranks = forward.len();
    let mut edges = Vec::new();
    for (rank, table) in forward.iter().enumerate() {
        if table.len() != size {
            return Err(IdiomError::SizeMismatch {
                relation: name,
                expected: size,
                found: table.len(),
            });
        }
        for (from, targets) in table.iter().enumerate() {
            for &to in targets {
                if !to.is_node() {
                    return Err(IdiomError::NodeOutOfRange {
                        context: name,
                        node: to,
                        size,
                    });
                }
                edges.push((rank, from as u32, to.0));
            }
        }
    }
    Relation::from_ranked_edges(name, size, ranks, &edges)
}

// =============================================================================
// TESTS
// =============================================================================
