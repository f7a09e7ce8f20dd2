//! # Core Type Definitions
//!
//! This module contains the value types every other module exchanges:
//! - Node references into the node universe (`NodeRef`)
//! - Error types (`IdiomError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` so they can key `BTreeMap`/`BTreeSet`
//! - Carry no program semantics; classification lives in predicate sets

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// NODE REFERENCE
// =============================================================================

/// Reference to an entry of the node universe.
///
/// A dense index, plus two reserved sentinels at the top of the `u32` range:
/// [`NodeRef::UNBOUND`] (no value yet) and [`NodeRef::ABSENT`] (a pattern slot
/// that deliberately has no corresponding program element).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeRef(pub u32);

impl NodeRef {
    /// No value is bound. Handed to an atom, it asks for the next candidate.
    pub const UNBOUND: Self = Self(u32::MAX);

    /// The slot is deliberately absent from the program.
    pub const ABSENT: Self = Self(u32::MAX - 1);

    /// Create a reference to the node at `index`.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Position in the node universe.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn is_unbound(self) -> bool {
        self.0 == Self::UNBOUND.0
    }

    #[must_use]
    pub const fn is_absent(self) -> bool {
        self.0 == Self::ABSENT.0
    }

    /// True for real universe entries (neither sentinel).
    #[must_use]
    pub const fn is_node(self) -> bool {
        self.0 < Self::ABSENT.0
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbound() {
            f.write_str("unbound")
        } else if self.is_absent() {
            f.write_str("absent")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

impl From<u32> for NodeRef {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while building stores and patterns.
///
/// - No silent failures: malformed stores are rejected at construction
/// - Running a search never fails; zero solutions is a normal outcome
/// - Use `Result<T, IdiomError>` for fallible operations
#[derive(Debug, Error)]
pub enum IdiomError {
    /// The node universe exceeds the addressable index range.
    #[error("Node universe of {0} nodes exceeds the addressable range")]
    UniverseTooLarge(usize),

    /// A relation or predicate names a node outside the universe.
    #[error("Node {node} in '{context}' is out of range for a universe of {size} nodes")]
    NodeOutOfRange {
        context: String,
        node: NodeRef,
        size: usize,
    },

    /// A relation's adjacency tables do not cover the universe.
    #[error("Relation '{relation}' has {found} adjacency entries, expected {expected}")]
    SizeMismatch {
        relation: String,
        expected: usize,
        found: usize,
    },

    /// Forward and reverse adjacency disagree about an edge.
    #[error("Relation '{relation}' rank {rank}: edge {from} -> {to} is not mirrored in both directions")]
    InconsistentAdjacency {
        relation: String,
        rank: usize,
        from: NodeRef,
        to: NodeRef,
    },

    /// A rank outside the relation's rank count was requested.
    #[error("Relation '{relation}' has {ranks} ranks, rank {rank} requested")]
    RankOutOfRange {
        relation: String,
        rank: usize,
        ranks: usize,
    },

    /// A relation declares zero ranks or more ranks than supported.
    #[error("Relation '{relation}' declares {ranks} ranks (supported: 1..={max})")]
    InvalidRankCount {
        relation: String,
        ranks: usize,
        max: usize,
    },

    /// A relation with this name is already registered.
    #[error("Duplicate relation: {0}")]
    DuplicateRelation(String),

    /// A predicate with this name is already registered.
    #[error("Duplicate predicate: {0}")]
    DuplicatePredicate(String),

    /// The requested relation is not registered.
    #[error("Unknown relation: {0}")]
    UnknownRelation(String),

    /// The requested predicate is not registered.
    #[error("Unknown predicate: {0}")]
    UnknownPredicate(String),

    /// A pattern variable was declared twice.
    #[error("Duplicate pattern variable: {0}")]
    DuplicateVariable(String),

    /// A pattern refers to a variable it never declared.
    #[error("Unknown pattern variable: {0}")]
    UnknownVariable(String),

    /// A pattern variable is not restricted by any atom.
    #[error("Pattern variable '{0}' has no constraint to enumerate candidates")]
    UnconstrainedVariable(String),

    /// A disjunction has no alternative that constrains any variable.
    #[error("Disjunction has no alternative constraining a variable")]
    EmptyDisjunction,

    /// One alternative of a disjunction leaves a variable of another unconstrained.
    #[error("Alternative {alternative} of a disjunction does not constrain variable '{variable}'")]
    IncompleteAlternative { alternative: usize, variable: String },

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
