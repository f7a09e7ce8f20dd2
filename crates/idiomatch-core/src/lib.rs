//! # idiomatch-core
//!
//! The deterministic idiom-matching engine for idiomatch.
//!
//! A pattern is a list of named variables, each restricted by atoms: unary
//! predicates, edges of program relations, index comparisons, set equality
//! and dominance over flow relations, combined by conjunction and
//! disjunction. The solver enumerates every binding of the variables
//! to nodes of a [`RelationStore`] that satisfies all atoms, by depth-first
//! backtracking in the order the variables were declared.
//!
//! ## Architectural Constraints
//!
//! - The store is read-only during a search and is validated on construction
//! - Atoms are stateful and owned by exactly one pattern; searches are
//!   single-threaded
//! - Candidate order is adjacency and predicate list order, so solution order
//!   is reproducible across runs
//! - No async, no I/O (pure Rust); file handling lives in the app

// =============================================================================
// MODULES
// =============================================================================

pub mod atoms;
pub mod conjunction;
pub mod disjunction;
pub mod formats;
pub mod graph;
pub mod pattern;
pub mod primitives;
pub mod selector;
pub mod solution;
pub mod solver;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{IdiomError, NodeRef};

// =============================================================================
// RE-EXPORTS: Store, Atoms and Search
// =============================================================================

pub use atoms::{Accepted, Atom, Backend, DominanceKind, Flow, SkipResult, Slot};
pub use conjunction::Conjunction;
pub use disjunction::Disjunction;
pub use graph::{
    Adjacency, NodeUniverse, PredicateSet, Relation, RelationStore, SerializableRelation,
    SerializableStore,
};
pub use pattern::{Dominance, Pattern, PatternBuilder, Seeds, Variable};
pub use selector::{Constraint, Selector, SharedConstraint};
pub use solution::Solution;
pub use solver::{SearchStatistics, search, search_with_statistics};

// =============================================================================
// RE-EXPORTS: Formats
// =============================================================================

pub use formats::{
    PackedHeader, is_packed, store_from_bytes, store_from_json, store_to_bytes, store_to_json,
};
